//! OCR capability consumed by the ingestion pipeline.

use std::future::Future;
use std::pin::Pin;

use crate::document::Document;

/// A remote or local OCR service.
///
/// Implementations never fail toward the caller: partial results are
/// returned as-is and a total failure yields an empty string. Any retry or
/// timeout policy is internal to the provider.
pub trait OcrProvider: Send + Sync {
    /// The canonical name of this provider (e.g., "Google Vision").
    fn name(&self) -> &str;

    /// Recognize the text of every page of `document`, in page order.
    fn ocr<'a>(&'a self, document: &'a Document) -> Pin<Box<dyn Future<Output = String> + Send + 'a>>;
}
