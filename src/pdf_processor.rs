//! Módulo para processamento de PDFs
//! Usa pdfium-render para renderizar páginas como imagens

use anyhow::{Context, Result};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;

use crate::converter::PageSource;

/// Fator de ampliação sobre o tamanho base da página (72 dpi)
pub const ZOOM: f32 = 2.0;

/// Carrega a biblioteca PDFium e abre documentos para renderização
pub struct PdfProcessor {
    pdfium: Pdfium,
}

impl PdfProcessor {
    /// Cria uma nova instância do processador de PDF
    pub fn new() -> Result<Self> {
        // Tenta carregar a biblioteca pdfium de vários locais
        let pdfium = Pdfium::new(
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./lib/"))
                .or_else(|_| Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./")))
                .or_else(|_| Pdfium::bind_to_system_library())
                .context("Could not find the PDFium library. Place it in ./lib/, next to the executable, or install it system-wide.")?,
        );

        Ok(Self { pdfium })
    }

    /// Abre o documento para leitura página a página
    ///
    /// O handle do documento é liberado quando o valor retornado sai de escopo.
    pub fn open<'a>(&'a self, pdf_path: &Path) -> Result<LoadedDocument<'a>> {
        let document = self
            .pdfium
            .load_pdf_from_file(pdf_path, None)
            .context("Failed to open the PDF file")?;

        Ok(LoadedDocument { document })
    }
}

/// Documento aberto; renderiza uma página por vez para limitar o uso de memória
pub struct LoadedDocument<'a> {
    document: PdfDocument<'a>,
}

impl PageSource for LoadedDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(&self, index: usize) -> Result<DynamicImage> {
        let page = self
            .document
            .pages()
            .get(index as u16)
            .with_context(|| format!("Failed to load page {}", index + 1))?;

        // Duas vezes a largura em pontos (1/72") equivale a renderizar a 144 dpi
        let render_config = PdfRenderConfig::new()
            .set_target_width((page.width().value * ZOOM) as i32)
            .set_maximum_height((page.height().value * ZOOM) as i32);

        let bitmap = page
            .render_with_config(&render_config)
            .with_context(|| format!("Failed to render page {}", index + 1))?;

        Ok(bitmap.as_image())
    }
}
