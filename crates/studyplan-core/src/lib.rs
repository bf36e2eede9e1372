use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config_file;
pub mod document;
pub mod mock;
pub mod ocr;
pub mod status;
pub mod text_utils;

// Re-export for convenience
pub use backend::{BackendError, TextLayerBackend};
pub use document::{ALLOWED_EXTENSIONS, Document, DocumentError, DocumentKind};
pub use ocr::OcrProvider;
pub use status::{PipelineStage, StatusStore};
pub use text_utils::{chunk_text, clean_text, preview};

/// Minimum number of trimmed characters for extracted text to count as real
/// output. Used both for scanned-document detection and strategy acceptance.
pub const MIN_TEXT_CHARS: usize = 20;

/// One page of a document, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page_number: usize,
    /// Extracted text, trimmed. May be empty.
    pub text: String,
    /// True when the text came from OCR pseudo-pagination rather than a text layer.
    #[serde(default)]
    pub ocr: bool,
}

impl Page {
    pub fn new(page_number: usize, text: &str, ocr: bool) -> Self {
        Self {
            page_number,
            text: text.trim().to_string(),
            ocr,
        }
    }
}

/// A line classified as a structural heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingEvent {
    /// Nesting level, 1 = top.
    pub level: usize,
    pub title: String,
    pub page: usize,
}

/// A node of the reconstructed outline.
///
/// `end_page` is always >= `start_page`; children start on or after their
/// parent's start page and appear in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    pub title: String,
    pub level: usize,
    pub start_page: usize,
    pub end_page: usize,
    /// Non-heading lines directly under this heading, each followed by `\n`.
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(OutlineNode::node_count).sum::<usize>()
    }
}

/// Total number of nodes in an outline forest.
pub fn outline_size(outline: &[OutlineNode]) -> usize {
    outline.iter().map(OutlineNode::node_count).sum()
}
