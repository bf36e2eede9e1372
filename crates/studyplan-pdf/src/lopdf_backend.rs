use lopdf::Document as PdfDocument;

use studyplan_core::backend::ensure_pdf;
use studyplan_core::{BackendError, Document, TextLayerBackend};

/// Per-page text extraction with `lopdf`.
///
/// A page whose content stream cannot be decoded yields an empty string
/// rather than failing the whole document. Line moves inside a text block
/// (`Td`, `T*`) produce no line break, so a heading and the line after it
/// can come out as one line.
#[derive(Debug, Default)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }

    fn load(&self, document: &Document) -> Result<PdfDocument, BackendError> {
        ensure_pdf(document, self.name())?;
        let pdf = PdfDocument::load_mem(document.bytes())
            .map_err(|e| BackendError::OpenError(e.to_string()))?;
        if pdf.is_encrypted() {
            return Err(BackendError::OpenError("document is encrypted".into()));
        }
        Ok(pdf)
    }
}

impl TextLayerBackend for LopdfBackend {
    fn name(&self) -> &str {
        "lopdf"
    }

    fn page_count(&self, document: &Document) -> Result<usize, BackendError> {
        Ok(self.load(document)?.get_pages().len())
    }

    fn extract_pages(&self, document: &Document) -> Result<Vec<String>, BackendError> {
        let pdf = self.load(document)?;
        let pages = pdf.get_pages();

        let mut texts = Vec::with_capacity(pages.len());
        for &page_number in pages.keys() {
            match pdf.extract_text(&[page_number]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    tracing::debug!(page = page_number, error = %e, "lopdf could not decode page");
                    texts.push(String::new());
                }
            }
        }
        Ok(texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_images() {
        let image = Document::from_bytes("scan", "scan.png", vec![0x89, b'P', b'N', b'G']);
        let err = LopdfBackend::new().extract_pages(&image).unwrap_err();
        assert!(matches!(err, BackendError::Unsupported(_)));
    }

    #[test]
    fn garbage_pdf_is_open_error() {
        let doc = Document::from_bytes("bad", "bad.pdf", b"%PDF-1.4 garbage".to_vec());
        let err = LopdfBackend::new().page_count(&doc).unwrap_err();
        assert!(matches!(err, BackendError::OpenError(_)));
    }
}
