use studyplan_core::{BackendError, Document, MIN_TEXT_CHARS, TextLayerBackend};

/// Characters in the native text layer, summed over every page. Backends
/// without page access are asked for the whole text instead.
fn text_layer_chars(backend: &dyn TextLayerBackend, document: &Document) -> Result<usize, BackendError> {
    match backend.extract_pages(document) {
        Ok(pages) => Ok(pages.iter().map(|p| p.chars().count()).sum()),
        Err(BackendError::Unsupported(_)) => backend.extract_text(document).map(|t| t.chars().count()),
        Err(e) => Err(e),
    }
}

/// Decide whether `document` needs OCR.
///
/// Below [`MIN_TEXT_CHARS`] characters of native text the document counts as
/// scanned. Any failure to open or read it also counts as scanned, so the
/// caller takes the OCR path instead of returning nothing.
pub fn is_scanned(backend: &dyn TextLayerBackend, document: &Document) -> bool {
    match text_layer_chars(backend, document) {
        Ok(chars) if chars < MIN_TEXT_CHARS => {
            tracing::info!(
                path = %document.path().display(),
                backend = backend.name(),
                chars,
                "no text layer detected, treating as scanned"
            );
            true
        }
        Ok(_) => false,
        Err(e) => {
            tracing::info!(
                path = %document.path().display(),
                backend = backend.name(),
                error = %e,
                "text layer unreadable, treating as scanned"
            );
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyplan_core::mock::{MockBackend, MockPages};

    fn doc() -> Document {
        Document::from_bytes("notes", "notes.pdf", b"%PDF-1.7".to_vec())
    }

    #[test]
    fn text_layer_counts_across_pages() {
        // 10 + 10 characters reaches the threshold only together.
        let backend = MockBackend::with_pages("m", &["0123456789", "abcdefghij"]);
        assert!(!is_scanned(&backend, &doc()));
    }

    #[test]
    fn short_text_layer_is_scanned() {
        let backend = MockBackend::with_pages("m", &["p. 1", "", "p. 3"]);
        assert!(is_scanned(&backend, &doc()));
        let backend = MockBackend::with_pages("m", &[]);
        assert!(is_scanned(&backend, &doc()));
    }

    #[test]
    fn read_failure_is_scanned() {
        assert!(is_scanned(&MockBackend::failing("m", "bad xref"), &doc()));
    }

    #[test]
    fn whole_text_backend_is_consulted() {
        let text_only = MockBackend::new("m", MockPages::TextOnly("x".repeat(100)));
        assert!(!is_scanned(&text_only, &doc()));
        let text_only = MockBackend::new("m", MockPages::TextOnly("tiny".into()));
        assert!(is_scanned(&text_only, &doc()));
    }

    #[test]
    fn image_documents_are_scanned() {
        let image = Document::from_bytes("scan", "scan.png", b"\x89PNG\r\n\x1a\n".to_vec());
        let lopdf = studyplan_pdf::LopdfBackend::new();
        assert!(is_scanned(&lopdf, &image));
    }
}
