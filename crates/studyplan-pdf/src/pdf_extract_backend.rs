use std::panic::{self, AssertUnwindSafe};

use studyplan_core::backend::ensure_pdf;
use studyplan_core::{BackendError, Document, TextLayerBackend};

/// Text extraction with the `pdf-extract` content-stream interpreter.
///
/// `pdf-extract` panics on some malformed fonts and encodings; panics are
/// caught and reported as extraction errors so the strategy chain can move on.
#[derive(Debug, Default)]
pub struct PdfExtractBackend;

impl PdfExtractBackend {
    pub fn new() -> Self {
        Self
    }
}

fn guarded<T>(
    f: impl FnOnce() -> Result<T, pdf_extract::OutputError>,
) -> Result<T, BackendError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result.map_err(|e| BackendError::ExtractionError(e.to_string())),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(BackendError::ExtractionError(format!(
                "pdf-extract panicked: {message}"
            )))
        }
    }
}

impl TextLayerBackend for PdfExtractBackend {
    fn name(&self) -> &str {
        "pdf-extract"
    }

    fn page_count(&self, document: &Document) -> Result<usize, BackendError> {
        ensure_pdf(document, self.name())?;
        let pdf = pdf_extract::Document::load_mem(document.bytes())
            .map_err(|e| BackendError::OpenError(e.to_string()))?;
        Ok(pdf.get_pages().len())
    }

    fn extract_pages(&self, document: &Document) -> Result<Vec<String>, BackendError> {
        ensure_pdf(document, self.name())?;
        let bytes = document.bytes();
        guarded(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
    }

    fn extract_text(&self, document: &Document) -> Result<String, BackendError> {
        ensure_pdf(document, self.name())?;
        let bytes = document.bytes();
        guarded(|| pdf_extract::extract_text_from_mem(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_pdf_is_an_error_not_a_panic() {
        let doc = Document::from_bytes("bad", "bad.pdf", b"%PDF-1.7 not really".to_vec());
        let backend = PdfExtractBackend::new();
        assert!(backend.extract_text(&doc).is_err());
        assert!(backend.extract_pages(&doc).is_err());
    }

    #[test]
    fn guarded_converts_panics() {
        let err = guarded::<()>(|| panic!("bad font")).unwrap_err();
        assert!(err.to_string().contains("bad font"));
    }
}
