use thiserror::Error;

use crate::document::Document;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("operation not supported: {0}")]
    Unsupported(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An embedded-text extraction strategy.
///
/// Implementors read a document's native text layer; no image analysis.
/// Strategies are interchangeable and tried in a fixed priority order by the
/// ingestion pipeline, which treats any error as "no output".
pub trait TextLayerBackend: Send + Sync {
    /// Short stable name used in configuration and logs (e.g. "lopdf").
    fn name(&self) -> &str;

    /// Number of pages in the document.
    fn page_count(&self, document: &Document) -> Result<usize, BackendError>;

    /// Text of each page, in page order. Strategies without page-level access
    /// return [`BackendError::Unsupported`].
    fn extract_pages(&self, document: &Document) -> Result<Vec<String>, BackendError>;

    /// Full text of the document.
    fn extract_text(&self, document: &Document) -> Result<String, BackendError> {
        Ok(self.extract_pages(document)?.join("\n"))
    }
}

/// Fail with `Unsupported` unless the document is a PDF.
pub fn ensure_pdf(document: &Document, backend: &str) -> Result<(), BackendError> {
    if document.kind().is_image() {
        return Err(BackendError::Unsupported(format!(
            "{backend} cannot read a text layer from {}",
            document.kind().mime_type()
        )));
    }
    Ok(())
}
