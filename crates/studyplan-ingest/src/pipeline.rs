use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use studyplan_core::text_utils::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use studyplan_core::{
    Document, OcrProvider, OutlineNode, Page, PipelineStage, StatusStore, TextLayerBackend,
    chunk_text, clean_text, preview,
};

use crate::IngestError;
use crate::engine::TextExtractionEngine;
use crate::segmenter::{pages_from_layer, split_into_pages};
use crate::strategies::{IngestSettings, strategies_from_settings};

/// Characters of the first chunk kept in [`Analysis::preview`].
pub const PREVIEW_CHARS: usize = 1000;

/// Summary of a document, as handed to the classification and planning
/// stages.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub document_id: String,
    /// Characters of cleaned text.
    pub total_length: usize,
    pub chunks_count: usize,
    pub avg_chunk_size: usize,
    pub page_count: usize,
    /// Start of the first chunk.
    pub preview: String,
    pub chunks: Vec<String>,
    pub outline: Vec<OutlineNode>,
}

/// Text, page and outline extraction for one configuration.
///
/// Holds no per-document state, so a single pipeline can serve concurrent
/// requests. Progress is reported to an optional [`StatusStore`].
pub struct Pipeline {
    engine: TextExtractionEngine,
    chunk_size: usize,
    chunk_overlap: usize,
    status: Option<StatusStore>,
}

impl Pipeline {
    pub fn new(engine: TextExtractionEngine) -> Self {
        Self {
            engine,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            status: None,
        }
    }

    /// Pipeline over explicit strategies.
    pub fn with_strategies(strategies: Vec<Arc<dyn TextLayerBackend>>, ocr: Arc<dyn OcrProvider>) -> Self {
        Self::new(TextExtractionEngine::new(strategies, ocr))
    }

    pub fn from_settings(settings: &IngestSettings, ocr: Arc<dyn OcrProvider>) -> Self {
        let engine = TextExtractionEngine::new(strategies_from_settings(settings), ocr)
            .with_min_text_chars(settings.min_text_chars);
        Self::new(engine).with_chunking(settings.chunk_size, settings.chunk_overlap)
    }

    pub fn with_chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
        self
    }

    pub fn with_status(mut self, status: StatusStore) -> Self {
        self.status = Some(status);
        self
    }

    pub fn engine(&self) -> &TextExtractionEngine {
        &self.engine
    }

    fn mark(&self, document: &Document, stage: PipelineStage) {
        if let Some(ref status) = self.status {
            status.set(document.id(), stage);
        }
    }

    /// Full text of the document; empty when nothing could be extracted.
    pub async fn extract_text(&self, document: &Document) -> String {
        let text = self.text(document).await;
        self.mark(document, PipelineStage::Done);
        text
    }

    /// Pages of the document in order, numbered from 1. Empty when the
    /// document needed OCR and OCR produced nothing.
    pub async fn extract_pages(&self, document: &Document) -> Vec<Page> {
        let pages = self.pages(document).await;
        self.mark(document, PipelineStage::Done);
        pages
    }

    /// Outline of the document, built from its pages.
    pub async fn extract_structure(&self, document: &Document) -> Vec<OutlineNode> {
        let pages = self.pages(document).await;
        self.mark(document, PipelineStage::Outlining);
        let outline = studyplan_outline::build_outline(&pages);
        self.mark(document, PipelineStage::Done);
        outline
    }

    /// Outline of already-extracted text. Form feeds separate pages.
    pub fn extract_structure_from_text(&self, text: &str) -> Vec<OutlineNode> {
        studyplan_outline::build_outline_from_text(text)
    }

    /// Pages, full text, cleaning, chunking and outline in one pass.
    ///
    /// Fails with [`IngestError::NoText`] when neither the text nor the pages
    /// carry anything, and with [`IngestError::EmptyAfterCleaning`] when
    /// cleaning removes everything.
    pub async fn analyze(&self, document: &Document) -> Result<Analysis, IngestError> {
        let result = self.analyze_inner(document).await;
        match result {
            Ok(ref analysis) => {
                tracing::info!(
                    document_id = document.id(),
                    length = analysis.total_length,
                    chunks = analysis.chunks_count,
                    pages = analysis.page_count,
                    sections = analysis.outline.len(),
                    "analysis completed"
                );
                self.mark(document, PipelineStage::Done);
            }
            Err(ref e) => {
                tracing::error!(document_id = document.id(), error = %e, "analysis failed");
                self.mark(document, PipelineStage::Failed(e.to_string()));
            }
        }
        result
    }

    /// Open the file at `path` and [`analyze`](Self::analyze) it.
    pub async fn analyze_path(&self, path: &Path) -> Result<Analysis, IngestError> {
        let document = Document::open(path)?;
        self.mark(&document, PipelineStage::Queued);
        self.analyze(&document).await
    }

    async fn analyze_inner(&self, document: &Document) -> Result<Analysis, IngestError> {
        let pages = self.pages(document).await;
        tracing::info!(document_id = document.id(), pages = pages.len(), "pages extracted");

        let mut raw = self.text(document).await;
        if raw.trim().is_empty() && !pages.is_empty() {
            tracing::warn!(document_id = document.id(), "full text empty, joining page texts");
            raw = pages
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
        }
        if raw.trim().is_empty() {
            return Err(IngestError::NoText(document.path().to_path_buf()));
        }

        let cleaned = clean_text(&raw);
        if cleaned.is_empty() {
            return Err(IngestError::EmptyAfterCleaning);
        }

        let chunks = chunk_text(&cleaned, self.chunk_size, self.chunk_overlap);
        let total_length = cleaned.chars().count();
        let chunks_count = chunks.len();
        let avg_chunk_size = if chunks_count == 0 { 0 } else { total_length / chunks_count };
        let first_chunk_preview = chunks
            .first()
            .map(|c| preview(c, PREVIEW_CHARS).to_string())
            .unwrap_or_default();

        self.mark(document, PipelineStage::Outlining);
        let outline = if pages.is_empty() {
            studyplan_outline::build_outline_from_text(&cleaned)
        } else {
            studyplan_outline::build_outline(&pages)
        };

        Ok(Analysis {
            document_id: document.id().to_string(),
            total_length,
            chunks_count,
            avg_chunk_size,
            page_count: pages.len(),
            preview: first_chunk_preview,
            chunks,
            outline,
        })
    }

    async fn text(&self, document: &Document) -> String {
        self.mark(document, PipelineStage::Detecting);
        let scanned = self.engine.is_scanned(document);
        self.mark(document, PipelineStage::Extracting);
        self.engine.extract_text_detected(document, scanned).await
    }

    async fn pages(&self, document: &Document) -> Vec<Page> {
        self.mark(document, PipelineStage::Detecting);
        if !self.engine.is_scanned(document) {
            self.mark(document, PipelineStage::Extracting);
            if let Some(texts) = self.engine.text_layer_pages(document) {
                return pages_from_layer(&texts);
            }
            tracing::warn!(path = %document.path().display(), "no strategy produced pages, falling back to OCR");
        } else {
            tracing::warn!(path = %document.path().display(), "scanned document, using OCR for pages");
            self.mark(document, PipelineStage::Extracting);
        }

        let text = self.engine.run_ocr(document).await;
        if text.trim().is_empty() {
            return Vec::new();
        }

        self.mark(document, PipelineStage::Segmenting);
        let page_count = self.engine.page_count(document);
        tracing::info!(page_count, chars = text.chars().count(), "splitting OCR text into pages");
        split_into_pages(&text, page_count)
    }
}
