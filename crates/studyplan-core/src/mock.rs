//! Hand-rolled mocks of the backend and OCR traits for tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{BackendError, TextLayerBackend};
use crate::document::Document;
use crate::ocr::OcrProvider;

/// Scripted behaviour of a [`MockBackend`].
#[derive(Clone, Debug)]
pub enum MockPages {
    /// Return these page texts.
    Pages(Vec<String>),
    /// Fail every call with an extraction error.
    Error(String),
    /// Only whole-document text is available; page access is unsupported.
    TextOnly(String),
}

/// A mock implementing [`TextLayerBackend`].
///
/// Counts calls so tests can assert which strategies were attempted.
pub struct MockBackend {
    name: &'static str,
    response: MockPages,
    page_count: Option<usize>,
    calls: AtomicUsize,
}

impl MockBackend {
    pub fn new(name: &'static str, response: MockPages) -> Self {
        Self {
            name,
            response,
            page_count: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A backend whose pages are the given strings.
    pub fn with_pages(name: &'static str, pages: &[&str]) -> Self {
        Self::new(
            name,
            MockPages::Pages(pages.iter().map(|p| p.to_string()).collect()),
        )
    }

    /// A backend that fails every extraction.
    pub fn failing(name: &'static str, message: &str) -> Self {
        Self::new(name, MockPages::Error(message.to_string()))
    }

    /// Override the reported page count (default: number of scripted pages,
    /// or an error when the backend is failing).
    pub fn with_page_count(mut self, count: usize) -> Self {
        self.page_count = Some(count);
        self
    }

    /// How many extraction calls (`extract_pages` or `extract_text`) were made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextLayerBackend for MockBackend {
    fn name(&self) -> &str {
        self.name
    }

    fn page_count(&self, _document: &Document) -> Result<usize, BackendError> {
        if let Some(count) = self.page_count {
            return Ok(count);
        }
        match &self.response {
            MockPages::Pages(pages) => Ok(pages.len()),
            MockPages::Error(msg) => Err(BackendError::OpenError(msg.clone())),
            MockPages::TextOnly(_) => Err(BackendError::Unsupported(self.name.to_string())),
        }
    }

    fn extract_pages(&self, _document: &Document) -> Result<Vec<String>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            MockPages::Pages(pages) => Ok(pages.clone()),
            MockPages::Error(msg) => Err(BackendError::ExtractionError(msg.clone())),
            MockPages::TextOnly(_) => Err(BackendError::Unsupported(self.name.to_string())),
        }
    }

    fn extract_text(&self, document: &Document) -> Result<String, BackendError> {
        match &self.response {
            MockPages::TextOnly(text) => {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(text.clone())
            }
            _ => Ok(self.extract_pages(document)?.join("\n")),
        }
    }
}

/// A mock implementing [`OcrProvider`] that returns fixed text.
pub struct MockOcr {
    text: String,
    calls: AtomicUsize,
}

impl MockOcr {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// An OCR provider that recognizes nothing (total failure).
    pub fn empty() -> Self {
        Self::new("")
    }

    /// How many times `ocr()` has been called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrProvider for MockOcr {
    fn name(&self) -> &str {
        "Mock OCR"
    }

    fn ocr<'a>(&'a self, _document: &'a Document) -> Pin<Box<dyn Future<Output = String> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { self.text.clone() })
    }
}
