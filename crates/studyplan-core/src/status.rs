//! Request-scoped pipeline status, keyed by document id.
//!
//! The store is injected into the pipeline by the surrounding service and
//! polled by whatever reports progress. Writers to the same key are expected
//! to be serialized by the caller (one pipeline run per document at a time).

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

/// Stage of a single ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "reason", rename_all = "snake_case")]
pub enum PipelineStage {
    Queued,
    Detecting,
    Extracting,
    Segmenting,
    Outlining,
    Done,
    Failed(String),
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Detecting => write!(f, "detecting text layer"),
            Self::Extracting => write!(f, "extracting text"),
            Self::Segmenting => write!(f, "splitting pages"),
            Self::Outlining => write!(f, "building outline"),
            Self::Done => write!(f, "done"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Cloneable handle to a shared status map.
#[derive(Debug, Clone, Default)]
pub struct StatusStore {
    inner: Arc<DashMap<String, PipelineStage>>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, document_id: &str, stage: PipelineStage) {
        tracing::debug!(document_id, %stage, "pipeline stage");
        self.inner.insert(document_id.to_string(), stage);
    }

    pub fn get(&self, document_id: &str) -> Option<PipelineStage> {
        self.inner.get(document_id).map(|entry| entry.value().clone())
    }

    /// Remove the entry for `document_id`, returning its last stage.
    pub fn clear(&self, document_id: &str) -> Option<PipelineStage> {
        self.inner.remove(document_id).map(|(_, stage)| stage)
    }

    /// Drop every entry that reached a terminal stage. Returns how many were removed.
    pub fn clear_finished(&self) -> usize {
        let before = self.inner.len();
        self.inner.retain(|_, stage| !stage.is_terminal());
        before - self.inner.len()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
