#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! pdf2png - Conversor de PDF para PNG
//!
//! Aplicação desktop que converte todas as páginas de um PDF em imagens PNG

mod converter;
mod pdf_processor;
mod worker;

use converter::{convert_pdf_to_pngs, ConversionReporter};
use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use worker::ConversionWorker;

// Paleta de cores sobre o tema escuro padrão
struct AppColors;

impl AppColors {
    // Fundo Principal (Deep Blue/Black)
    const BG_MAIN: egui::Color32 = egui::Color32::from_rgb(13, 17, 23);

    // Cor primária (Electric Blue)
    const PRIMARY: egui::Color32 = egui::Color32::from_rgb(56, 189, 248);

    // Erro (Soft Red)
    const ERROR: egui::Color32 = egui::Color32::from_rgb(248, 113, 113);

    // Neutros
    const TEXT_PRIMARY: egui::Color32 = egui::Color32::from_rgb(241, 245, 249);
    const TEXT_SECONDARY: egui::Color32 = egui::Color32::from_rgb(148, 163, 184);
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([550.0, 300.0])
            .with_title("PDF to PNG Converter")
            .with_resizable(false),
        ..Default::default()
    };

    eframe::run_native(
        "PDF to PNG Converter",
        options,
        Box::new(|cc| {
            let mut style = (*cc.egui_ctx.style()).clone();

            style.visuals = egui::Visuals::dark();
            style.visuals.window_fill = AppColors::BG_MAIN;
            style.visuals.panel_fill = AppColors::BG_MAIN;
            style.visuals.widgets.noninteractive.fg_stroke.color = AppColors::TEXT_PRIMARY;

            style.spacing.item_spacing = egui::vec2(10.0, 10.0);
            style.spacing.button_padding = egui::vec2(16.0, 8.0);

            style.text_styles.insert(
                egui::TextStyle::Heading,
                egui::FontId::new(22.0, egui::FontFamily::Proportional),
            );
            style.text_styles.insert(
                egui::TextStyle::Body,
                egui::FontId::new(15.0, egui::FontFamily::Proportional),
            );
            style.text_styles.insert(
                egui::TextStyle::Button,
                egui::FontId::new(15.0, egui::FontFamily::Proportional),
            );

            cc.egui_ctx.set_style(style);

            Ok(Box::new(Pdf2PngApp::default()))
        }),
    )
}

/// Atualizações emitidas pela thread de conversão
///
/// A interface nunca é tocada pela thread de trabalho: os eventos ficam na
/// fila e são aplicados ao estado no início de cada quadro.
#[derive(Debug, Clone, PartialEq)]
enum ConverterEvent {
    Status(String),
    Progress { current: usize, total: usize },
    Finished { success: bool },
}

/// Encaminha os callbacks do conversor como eventos para a fila da interface
struct EventReporter {
    tx: Sender<ConverterEvent>,
    ctx: egui::Context,
}

impl EventReporter {
    fn send(&self, event: ConverterEvent) {
        // Se a janela já fechou, o evento é simplesmente descartado
        let _ = self.tx.send(event);
        self.ctx.request_repaint();
    }
}

impl ConversionReporter for EventReporter {
    fn status(&self, message: &str) {
        self.send(ConverterEvent::Status(message.to_owned()));
    }

    fn progress(&self, current_page: usize, total_pages: usize) {
        self.send(ConverterEvent::Progress {
            current: current_page,
            total: total_pages,
        });
    }

    fn finished(&self, success: bool) {
        self.send(ConverterEvent::Finished { success });
    }
}

struct Pdf2PngApp {
    pdf_path: Option<PathBuf>,
    is_converting: bool,
    progress: f32,
    status_line: String,
    show_error_dialog: bool,
    worker: ConversionWorker,
    event_tx: Sender<ConverterEvent>,
    events: Receiver<ConverterEvent>,
}

impl Default for Pdf2PngApp {
    fn default() -> Self {
        let (event_tx, events) = mpsc::channel();
        Self {
            pdf_path: None,
            is_converting: false,
            progress: 0.0,
            status_line: "Please select a PDF file to begin.".to_owned(),
            show_error_dialog: false,
            worker: ConversionWorker::new(),
            event_tx,
            events,
        }
    }
}

impl eframe::App for Pdf2PngApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(event) = self.events.try_recv() {
            self.apply_event(event);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(10.0);

                ui.label(
                    egui::RichText::new("Convert All PDF Pages to PNG")
                        .heading()
                        .strong()
                        .color(AppColors::PRIMARY),
                );
                ui.add_space(6.0);

                ui.horizontal(|ui| {
                    let select = egui::Button::new("Select PDF");
                    if ui.add_enabled(!self.is_converting, select).clicked() {
                        self.select_pdf();
                    }
                    ui.label(
                        egui::RichText::new(self.selected_file_label())
                            .color(AppColors::TEXT_SECONDARY),
                    );
                });

                let convert = egui::Button::new(egui::RichText::new("Convert to PNG").strong())
                    .min_size(egui::vec2(180.0, 36.0));
                if ui.add_enabled(self.convert_enabled(), convert).clicked() {
                    self.start_conversion(ctx);
                }

                ui.add(egui::ProgressBar::new(self.progress).desired_width(400.0));

                ui.label(&self.status_line);
            });
        });

        if self.show_error_dialog {
            self.error_dialog(ctx);
        }
    }
}

impl Pdf2PngApp {
    /// O botão de conversão exige arquivo escolhido e nenhuma conversão ativa
    fn convert_enabled(&self) -> bool {
        self.pdf_path.is_some() && !self.is_converting
    }

    fn selected_file_label(&self) -> String {
        match &self.pdf_path {
            Some(path) => display_path(path),
            None => "No PDF selected".to_owned(),
        }
    }

    fn apply_event(&mut self, event: ConverterEvent) {
        match event {
            ConverterEvent::Status(message) => self.status_line = message,
            ConverterEvent::Progress { current, total } => {
                self.progress = if total == 0 {
                    0.0
                } else {
                    current as f32 / total as f32
                };
            }
            ConverterEvent::Finished { success } => {
                self.is_converting = false;
                if !success {
                    self.progress = 0.0;
                    self.show_error_dialog = true;
                }
            }
        }
    }

    fn select_pdf(&mut self) {
        if self.is_converting {
            return;
        }

        let picked = rfd::FileDialog::new()
            .add_filter("PDF Files", &["pdf"])
            .pick_file();

        match picked {
            Some(path) => {
                self.pdf_path = Some(path);
                self.status_line = "PDF selected. Ready to convert.".to_owned();
                self.progress = 0.0;
            }
            None => {
                // Cancelar o seletor mantém a seleção anterior
                if self.pdf_path.is_none() {
                    self.status_line = "Please select a PDF file to begin.".to_owned();
                }
            }
        }
    }

    fn start_conversion(&mut self, ctx: &egui::Context) {
        let Some(pdf_path) = self.pdf_path.clone() else {
            return;
        };
        if self.is_converting {
            return;
        }

        let reporter = EventReporter {
            tx: self.event_tx.clone(),
            ctx: ctx.clone(),
        };
        let started = self
            .worker
            .try_spawn(move || convert_pdf_to_pngs(&pdf_path, &reporter));
        if !started {
            return;
        }

        self.is_converting = true;
        self.progress = 0.0;
        self.status_line = "Initializing...".to_owned();
    }

    fn error_dialog(&mut self, ctx: &egui::Context) {
        egui::Window::new("Conversion Failed")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(
                        "An error occurred during conversion. Check status message for details.",
                    )
                    .color(AppColors::ERROR),
                );
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        self.show_error_dialog = false;
                    }
                });
            });
    }
}

/// Encurta caminhos longos para exibição, preservando o final
fn display_path(path: &Path) -> String {
    let display = path.display().to_string();
    let total = display.chars().count();
    if total > 60 {
        let tail: String = display.chars().skip(total - 57).collect();
        format!("...{tail}")
    } else {
        display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn convert_is_disabled_without_a_file_or_while_converting() {
        let mut app = Pdf2PngApp::default();
        assert!(!app.convert_enabled());

        app.pdf_path = Some(PathBuf::from("/tmp/doc.pdf"));
        assert!(app.convert_enabled());

        app.is_converting = true;
        assert!(!app.convert_enabled());
    }

    #[test]
    fn failure_resets_progress_and_opens_the_dialog() {
        let mut app = Pdf2PngApp::default();
        app.pdf_path = Some(PathBuf::from("/tmp/doc.pdf"));
        app.is_converting = true;
        app.progress = 0.6;

        app.apply_event(ConverterEvent::Finished { success: false });

        assert!(!app.is_converting);
        assert_eq!(app.progress, 0.0);
        assert!(app.show_error_dialog);
        // Pronta para uma nova tentativa
        assert!(app.convert_enabled());
    }

    #[test]
    fn success_keeps_progress_and_skips_the_dialog() {
        let mut app = Pdf2PngApp::default();
        app.is_converting = true;
        app.progress = 1.0;

        app.apply_event(ConverterEvent::Finished { success: true });

        assert!(!app.is_converting);
        assert_eq!(app.progress, 1.0);
        assert!(!app.show_error_dialog);
    }

    #[test]
    fn progress_events_become_fractions() {
        let mut app = Pdf2PngApp::default();

        app.apply_event(ConverterEvent::Progress {
            current: 1,
            total: 4,
        });
        assert_eq!(app.progress, 0.25);

        app.apply_event(ConverterEvent::Progress {
            current: 4,
            total: 4,
        });
        assert_eq!(app.progress, 1.0);
    }

    #[test]
    fn status_events_replace_the_status_line() {
        let mut app = Pdf2PngApp::default();

        app.apply_event(ConverterEvent::Status("Converting page 2/3...".to_owned()));

        assert_eq!(app.status_line, "Converting page 2/3...");
    }

    #[test]
    fn reporter_forwards_callbacks_as_events() {
        let (tx, rx) = mpsc::channel();
        let reporter = EventReporter {
            tx,
            ctx: egui::Context::default(),
        };

        reporter.status("Starting conversion...");
        reporter.progress(1, 3);
        reporter.finished(true);

        assert_eq!(
            rx.try_recv().unwrap(),
            ConverterEvent::Status("Starting conversion...".to_owned())
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ConverterEvent::Progress {
                current: 1,
                total: 3
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ConverterEvent::Finished { success: true }
        );
    }

    #[test]
    fn failed_conversion_through_the_worker_unlocks_the_ui() {
        let mut app = Pdf2PngApp::default();
        app.pdf_path = Some(PathBuf::from("/nonexistent/ghost.pdf"));
        app.is_converting = true;
        app.progress = 0.4;

        let reporter = EventReporter {
            tx: app.event_tx.clone(),
            ctx: egui::Context::default(),
        };
        let pdf_path = app.pdf_path.clone().unwrap();
        assert!(app
            .worker
            .try_spawn(move || convert_pdf_to_pngs(&pdf_path, &reporter)));

        for _ in 0..200 {
            if !app.worker.is_busy() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!app.worker.is_busy());

        while let Ok(event) = app.events.try_recv() {
            app.apply_event(event);
        }

        assert!(!app.is_converting);
        assert_eq!(app.progress, 0.0);
        assert!(app.show_error_dialog);
        assert!(app.status_line.contains("Invalid PDF file path."));
    }

    #[test]
    fn long_paths_are_shortened_for_display() {
        let long = format!("/tmp/{}/doc.pdf", "x".repeat(80));
        let shown = display_path(Path::new(&long));

        assert!(shown.starts_with("..."));
        assert_eq!(shown.chars().count(), 60);
        assert!(shown.ends_with("doc.pdf"));

        let short = display_path(Path::new("/tmp/doc.pdf"));
        assert_eq!(short, "/tmp/doc.pdf");
    }
}
