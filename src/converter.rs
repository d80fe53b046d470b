//! Módulo de conversão de PDF para PNG
//! Valida o arquivo, percorre as páginas e grava um PNG numerado por página

use anyhow::{bail, Context, Result};
use image::{DynamicImage, ImageFormat};
use log::{debug, error, info};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pdf_processor::PdfProcessor;

/// Callbacks de acompanhamento invocados pelo procedimento de conversão
///
/// A thread de trabalho chama estes métodos; a implementação decide como
/// encaminhar cada atualização até a thread da interface.
pub trait ConversionReporter {
    /// Atualiza a linha de status visível ao usuário
    fn status(&self, message: &str);

    /// Informa a página atual e o total de páginas
    fn progress(&self, current_page: usize, total_pages: usize);

    /// Sinaliza o fim da conversão, com sucesso ou falha
    fn finished(&self, success: bool);
}

/// Documento aberto, capaz de contar e rasterizar páginas
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Renderiza a página de índice `index` (base 0) no fator de zoom fixo
    fn render_page(&self, index: usize) -> Result<DynamicImage>;
}

/// Converte todas as páginas do PDF em imagens PNG
///
/// Qualquer erro é capturado aqui: a mensagem é reportada via `status` e a
/// conversão termina com `finished(false)`. Nenhum erro escapa como pânico.
pub fn convert_pdf_to_pngs(pdf_path: &Path, reporter: &dyn ConversionReporter) {
    run_and_report(reporter, || run_conversion(pdf_path, reporter));
}

/// Executa a conversão e reporta exatamente uma conclusão
///
/// Pânicos que escapem da execução também terminam em `finished(false)`.
fn run_and_report(reporter: &dyn ConversionReporter, run: impl FnOnce() -> Result<usize>) {
    let mut completion = CompletionGuard {
        reporter,
        reported: false,
    };
    match run() {
        Ok(_) => reporter.finished(true),
        Err(e) => {
            let message = format!("Error: {e:#}");
            error!("Conversion failed: {message}");
            reporter.status(&message);
            reporter.finished(false);
        }
    }
    completion.reported = true;
}

/// Reporta a conclusão com falha se a execução nunca chegou a reportar
struct CompletionGuard<'a> {
    reporter: &'a dyn ConversionReporter,
    reported: bool,
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        if !self.reported {
            error!("Conversion stopped before reporting completion");
            self.reporter.status("Error: conversion stopped unexpectedly.");
            self.reporter.finished(false);
        }
    }
}

fn run_conversion(pdf_path: &Path, reporter: &dyn ConversionReporter) -> Result<usize> {
    reporter.status("Starting conversion...");

    if !pdf_path.exists() {
        bail!("Invalid PDF file path.");
    }
    if !has_pdf_extension(pdf_path) {
        bail!("Selected file is not a PDF.");
    }

    let output_dir = output_dir_for(pdf_path);
    fs::create_dir_all(&output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            output_dir.display()
        )
    })?;
    reporter.status(&format!("Outputting to: {}", output_dir.display()));

    let processor = PdfProcessor::new()?;
    let document = processor.open(pdf_path)?;
    // O handle do documento é liberado ao sair deste escopo, em qualquer saída
    let total_pages = export_pages(&document, &output_dir, reporter)?;
    info!(
        "Converted {} page(s) from {}",
        total_pages,
        pdf_path.display()
    );
    Ok(total_pages)
}

/// Grava um PNG por página dentro de `output_dir`
///
/// Os arquivos recebem o nome `page_<índice>.png`, com o índice (base 1)
/// preenchido com zeros até a quantidade de dígitos do total de páginas.
fn export_pages(
    document: &dyn PageSource,
    output_dir: &Path,
    reporter: &dyn ConversionReporter,
) -> Result<usize> {
    let total_pages = document.page_count();
    if total_pages == 0 {
        bail!("PDF file has no pages.");
    }
    reporter.status(&format!("Found {total_pages} page(s). Processing..."));

    // Largura de preenchimento calculada uma única vez, sobre o total
    let width = pad_width(total_pages);
    for page_index in 1..=total_pages {
        reporter.progress(page_index, total_pages);
        reporter.status(&format!("Converting page {page_index}/{total_pages}..."));

        let image = document.render_page(page_index - 1)?;
        let output_path = output_dir.join(format!("page_{page_index:0width$}.png"));
        image
            .save_with_format(&output_path, ImageFormat::Png)
            .with_context(|| format!("Failed to save {}", output_path.display()))?;
        debug!("Saved {}", output_path.display());
        // O raster da página é descartado aqui, antes de renderizar a próxima
    }

    reporter.status(&format!(
        "Success! {} pages converted to PNGs in:\n{}",
        total_pages,
        output_dir.display()
    ));
    Ok(total_pages)
}

/// Verifica a extensão `.pdf`, sem diferenciar maiúsculas de minúsculas
fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Diretório de saída `<stem>_pngs`, irmão do arquivo de entrada
fn output_dir_for(pdf_path: &Path) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("output");
    pdf_path.with_file_name(format!("{stem}_pngs"))
}

/// Quantidade de dígitos decimais do total de páginas
fn pad_width(total_pages: usize) -> usize {
    total_pages.to_string().len()
}
