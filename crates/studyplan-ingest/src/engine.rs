use std::sync::Arc;

use studyplan_core::{Document, MIN_TEXT_CHARS, OcrProvider, TextLayerBackend};

use crate::detector;

/// Ordered text-layer strategies with an OCR fallback.
///
/// Strategies are tried cheapest first and the first one producing at least
/// `min_text_chars` trimmed characters wins, even if a later strategy would
/// have produced more. A failing strategy is logged and skipped; nothing here
/// returns an error.
pub struct TextExtractionEngine {
    strategies: Vec<Arc<dyn TextLayerBackend>>,
    ocr: Arc<dyn OcrProvider>,
    min_text_chars: usize,
}

impl TextExtractionEngine {
    pub fn new(strategies: Vec<Arc<dyn TextLayerBackend>>, ocr: Arc<dyn OcrProvider>) -> Self {
        Self {
            strategies,
            ocr,
            min_text_chars: MIN_TEXT_CHARS,
        }
    }

    pub fn with_min_text_chars(mut self, min_text_chars: usize) -> Self {
        self.min_text_chars = min_text_chars;
        self
    }

    pub fn strategies(&self) -> &[Arc<dyn TextLayerBackend>] {
        &self.strategies
    }

    pub fn ocr_provider(&self) -> &dyn OcrProvider {
        self.ocr.as_ref()
    }

    fn is_sufficient(&self, text: &str) -> bool {
        text.trim().chars().count() >= self.min_text_chars
    }

    /// Scanned-document check against the primary strategy. With no
    /// strategies configured every document goes to OCR.
    pub fn is_scanned(&self, document: &Document) -> bool {
        match self.strategies.first() {
            Some(primary) => detector::is_scanned(primary.as_ref(), document),
            None => true,
        }
    }

    /// Full text of the document, or an empty string when every strategy and
    /// OCR came up empty.
    pub async fn extract_text(&self, document: &Document) -> String {
        let scanned = self.is_scanned(document);
        self.extract_text_detected(document, scanned).await
    }

    /// [`extract_text`](Self::extract_text) with the scanned check already
    /// done by the caller.
    pub async fn extract_text_detected(&self, document: &Document, scanned: bool) -> String {
        if scanned {
            tracing::warn!(path = %document.path().display(), provider = self.ocr.name(), "scanned document, using OCR");
            return self.run_ocr(document).await;
        }

        if let Some(text) = self.text_layer_text(document) {
            return text;
        }

        tracing::warn!(path = %document.path().display(), provider = self.ocr.name(), "no strategy produced text, falling back to OCR");
        self.run_ocr(document).await
    }

    /// Whole-document text from the first sufficient strategy.
    pub fn text_layer_text(&self, document: &Document) -> Option<String> {
        for strategy in &self.strategies {
            match strategy.extract_text(document) {
                Ok(text) if self.is_sufficient(&text) => {
                    tracing::info!(strategy = strategy.name(), chars = text.chars().count(), "text extraction OK");
                    return Some(text);
                }
                Ok(text) => {
                    tracing::debug!(strategy = strategy.name(), chars = text.trim().chars().count(), "text too short");
                }
                Err(e) => {
                    tracing::warn!(strategy = strategy.name(), error = %e, "text extraction failed");
                }
            }
        }
        None
    }

    /// Per-page texts from the first strategy that yields at least one
    /// non-empty page. The whole list is accepted, empty pages included.
    pub fn text_layer_pages(&self, document: &Document) -> Option<Vec<String>> {
        for strategy in &self.strategies {
            match strategy.extract_pages(document) {
                Ok(pages) if pages.iter().any(|p| !p.trim().is_empty()) => {
                    tracing::info!(strategy = strategy.name(), pages = pages.len(), "per-page extraction OK");
                    return Some(pages);
                }
                Ok(pages) => {
                    tracing::debug!(strategy = strategy.name(), pages = pages.len(), "every page empty");
                }
                Err(e) => {
                    tracing::warn!(strategy = strategy.name(), error = %e, "per-page extraction failed");
                }
            }
        }
        None
    }

    /// Page count from the first strategy able to open the document. Images,
    /// and documents nothing can open, count as one page.
    pub fn page_count(&self, document: &Document) -> usize {
        if document.kind().is_image() {
            return 1;
        }
        for strategy in &self.strategies {
            match strategy.page_count(document) {
                Ok(n) => return n.max(1),
                Err(e) => {
                    tracing::debug!(strategy = strategy.name(), error = %e, "page count unavailable");
                }
            }
        }
        tracing::warn!(path = %document.path().display(), "could not count pages, assuming 1");
        1
    }

    pub async fn run_ocr(&self, document: &Document) -> String {
        let text = self.ocr.ocr(document).await;
        if text.trim().is_empty() {
            tracing::error!(path = %document.path().display(), provider = self.ocr.name(), "OCR returned no text");
        } else {
            tracing::info!(provider = self.ocr.name(), chars = text.chars().count(), "OCR OK");
        }
        text
    }
}
