use std::fmt::Display;

use mupdf::{Document as PdfDocument, Page as PdfPage, TextPageFlags};

use studyplan_core::backend::ensure_pdf;
use studyplan_core::{BackendError, Document, TextLayerBackend};

/// Bands at the top and bottom of a page whose text is ignored, as fractions
/// of the page height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginBands {
    pub header: f32,
    pub footer: f32,
}

impl MarginBands {
    /// Whether a block spanning `block_top..block_bottom` belongs to a margin
    /// of a page spanning `page_top..page_bottom`. A header block must lie
    /// entirely inside the band; a footer block only has to start in it.
    pub fn contains(&self, page_top: f32, page_bottom: f32, block_top: f32, block_bottom: f32) -> bool {
        let height = page_bottom - page_top;
        let in_header = self.header > 0.0 && block_bottom <= page_top + height * self.header;
        let in_footer = self.footer > 0.0 && block_top >= page_bottom - height * self.footer;
        in_header || in_footer
    }
}

/// MuPDF text-layer strategy.
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency so
/// that builds without the `mupdf` feature of `studyplan-ingest` do not
/// transitively depend on it.
///
/// Margins are kept by default. With [`with_margins`](Self::with_margins),
/// running heads and page numbers are dropped before the heading scan sees
/// them.
#[derive(Debug, Default)]
pub struct MupdfBackend {
    margins: Option<MarginBands>,
}

fn extraction_error(e: impl Display) -> BackendError {
    BackendError::ExtractionError(e.to_string())
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip text in the top `header` and bottom `footer` fractions of each
    /// page. Zero disables a band.
    pub fn with_margins(mut self, header: f32, footer: f32) -> Self {
        self.margins = (header > 0.0 || footer > 0.0).then_some(MarginBands { header, footer });
        self
    }

    pub fn margins(&self) -> Option<MarginBands> {
        self.margins
    }

    fn open(&self, document: &Document) -> Result<PdfDocument, BackendError> {
        ensure_pdf(document, self.name())?;
        PdfDocument::from_bytes(document.bytes(), document.kind().mime_type())
            .map_err(|e| BackendError::OpenError(e.to_string()))
    }

    /// Text of one page, block by block and line by line.
    fn page_text(&self, page: &PdfPage) -> Result<String, BackendError> {
        let text_page = page.to_text_page(TextPageFlags::empty()).map_err(extraction_error)?;
        let bounds = page.bounds().map_err(extraction_error)?;

        let mut text = String::new();
        for block in text_page.blocks() {
            let b = block.bounds();
            if let Some(margins) = self.margins
                && margins.contains(bounds.y0, bounds.y1, b.y0, b.y1)
            {
                continue;
            }
            for line in block.lines() {
                text.extend(line.chars().map(|c| c.char().unwrap_or('\u{FFFD}')));
                text.push('\n');
            }
        }
        Ok(text)
    }
}

impl TextLayerBackend for MupdfBackend {
    fn name(&self) -> &str {
        "mupdf"
    }

    fn page_count(&self, document: &Document) -> Result<usize, BackendError> {
        let count = self.open(document)?.page_count().map_err(extraction_error)?;
        Ok(count.max(0) as usize)
    }

    fn extract_pages(&self, document: &Document) -> Result<Vec<String>, BackendError> {
        let pdf = self.open(document)?;
        let mut pages = Vec::new();
        for page in pdf.pages().map_err(extraction_error)? {
            let page = page.map_err(extraction_error)?;
            pages.push(self.page_text(&page)?);
        }
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_bands() {
        let bands = MarginBands { header: 0.05, footer: 0.05 };
        // Page 0..1000: header band ends at 50, footer band starts at 950.
        assert!(bands.contains(0.0, 1000.0, 10.0, 40.0));
        assert!(!bands.contains(0.0, 1000.0, 10.0, 80.0));
        assert!(bands.contains(0.0, 1000.0, 960.0, 990.0));
        assert!(!bands.contains(0.0, 1000.0, 400.0, 600.0));
    }

    #[test]
    fn zero_band_is_disabled() {
        let bands = MarginBands { header: 0.0, footer: 0.1 };
        assert!(!bands.contains(0.0, 100.0, 0.0, 0.0));
        assert!(MupdfBackend::new().with_margins(0.0, 0.0).margins().is_none());
        assert_eq!(
            MupdfBackend::new().with_margins(0.04, 0.05).margins(),
            Some(MarginBands { header: 0.04, footer: 0.05 })
        );
    }

    #[test]
    fn images_are_unsupported() {
        let image = Document::from_bytes("scan", "scan.png", b"\x89PNG\r\n\x1a\n".to_vec());
        assert!(matches!(
            MupdfBackend::new().extract_pages(&image),
            Err(BackendError::Unsupported(_))
        ));
    }
}
