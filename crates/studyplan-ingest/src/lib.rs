//! The extraction pipeline: scanned-document detection, ordered text-layer
//! strategies with an OCR fallback, pseudo-pagination of OCR output, and
//! outline reconstruction.

use std::path::PathBuf;

use thiserror::Error;

pub mod detector;
pub mod engine;
pub mod pipeline;
pub mod segmenter;
pub mod strategies;

pub use detector::is_scanned;
pub use engine::TextExtractionEngine;
pub use pipeline::{Analysis, PREVIEW_CHARS, Pipeline};
pub use segmenter::split_into_pages;
pub use strategies::{IngestSettings, default_strategy_names, strategies_from_settings, strategy_by_name};

// Re-export domain types for convenience
pub use studyplan_core::{Document, DocumentError, OutlineNode, Page, PipelineStage, StatusStore};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("document error: {0}")]
    Document(#[from] DocumentError),
    #[error("failed to extract any text from {}", .0.display())]
    NoText(PathBuf),
    #[error("text cleaning produced an empty result")]
    EmptyAfterCleaning,
}
