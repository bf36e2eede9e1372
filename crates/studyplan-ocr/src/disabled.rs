use std::future::Future;
use std::pin::Pin;

use studyplan_core::{Document, OcrProvider};

/// Stand-in provider used when OCR is switched off or not configured.
/// Always recognizes nothing.
pub struct DisabledOcr {
    reason: String,
}

impl DisabledOcr {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl OcrProvider for DisabledOcr {
    fn name(&self) -> &str {
        "disabled"
    }

    fn ocr<'a>(&'a self, document: &'a Document) -> Pin<Box<dyn Future<Output = String> + Send + 'a>> {
        Box::pin(async move {
            tracing::error!(
                path = %document.path().display(),
                reason = %self.reason,
                "OCR unavailable, returning no text"
            );
            String::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_empty_text() {
        let ocr = DisabledOcr::new("Google Vision API key not configured");
        let doc = Document::from_bytes("scan", "scan.pdf", b"%PDF-1.4".to_vec());
        assert_eq!(ocr.ocr(&doc).await, "");
        assert_eq!(ocr.name(), "disabled");
    }
}
