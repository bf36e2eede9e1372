use std::sync::Arc;

use studyplan_core::TextLayerBackend;
use studyplan_core::config_file::ConfigFile;
use studyplan_core::text_utils::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use studyplan_pdf::{LopdfBackend, PdfExtractBackend};

/// Strategy names in default priority order. `mupdf` is only present when
/// the backend is compiled in. `lopdf` goes last: it joins the lines of a
/// text block without breaks, which glues headings to the body after them.
pub fn default_strategy_names() -> Vec<String> {
    let mut names = Vec::new();
    if cfg!(feature = "mupdf") {
        names.push("mupdf".to_string());
    }
    names.push("pdf-extract".to_string());
    names.push("lopdf".to_string());
    names
}

#[cfg(feature = "mupdf")]
fn mupdf_backend(settings: &IngestSettings) -> studyplan_pdf_mupdf::MupdfBackend {
    studyplan_pdf_mupdf::MupdfBackend::new().with_margins(settings.header_margin, settings.footer_margin)
}

/// Look up a text-layer strategy by its configuration name. `settings`
/// carries the per-strategy options (MuPDF margins).
#[cfg_attr(not(feature = "mupdf"), allow(unused_variables))]
pub fn strategy_by_name(name: &str, settings: &IngestSettings) -> Option<Arc<dyn TextLayerBackend>> {
    match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
        #[cfg(feature = "mupdf")]
        "mupdf" => Some(Arc::new(mupdf_backend(settings))),
        "lopdf" => Some(Arc::new(LopdfBackend::new())),
        "pdf-extract" | "pdfextract" => Some(Arc::new(PdfExtractBackend::new())),
        _ => None,
    }
}

/// Build the strategies named in `settings`, in order. Unknown (or not
/// compiled in) names are logged and skipped.
pub fn strategies_from_settings(settings: &IngestSettings) -> Vec<Arc<dyn TextLayerBackend>> {
    settings
        .strategies
        .iter()
        .filter_map(|name| {
            let strategy = strategy_by_name(name, settings);
            if strategy.is_none() {
                tracing::warn!(strategy = %name, "unknown or unavailable extraction strategy, skipping");
            }
            strategy
        })
        .collect()
}

/// Pipeline knobs resolved from the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestSettings {
    pub strategies: Vec<String>,
    pub min_text_chars: usize,
    /// Top margin band dropped by the MuPDF strategy, as a fraction of the
    /// page height. Zero keeps everything.
    pub header_margin: f32,
    pub footer_margin: f32,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            strategies: default_strategy_names(),
            min_text_chars: studyplan_core::MIN_TEXT_CHARS,
            header_margin: 0.0,
            footer_margin: 0.0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// A margin must leave most of the page: `0.0 <= m < 0.5`.
fn valid_margin(name: &str, margin: f32) -> Option<f32> {
    if (0.0..0.5).contains(&margin) {
        Some(margin)
    } else {
        tracing::warn!(setting = name, margin, "margin outside 0.0..0.5, ignoring");
        None
    }
}

impl IngestSettings {
    pub fn from_config(config: &ConfigFile) -> Self {
        let mut settings = Self::default();
        if let Some(ref extraction) = config.extraction {
            if let Some(ref strategies) = extraction.strategies {
                settings.strategies = strategies.clone();
            }
            if let Some(min) = extraction.min_text_chars {
                settings.min_text_chars = min;
            }
            if let Some(m) = extraction.header_margin.and_then(|m| valid_margin("header_margin", m)) {
                settings.header_margin = m;
            }
            if let Some(m) = extraction.footer_margin.and_then(|m| valid_margin("footer_margin", m)) {
                settings.footer_margin = m;
            }
        }
        if let Some(ref text) = config.text {
            if let Some(size) = text.chunk_size.filter(|&s| s > 0) {
                settings.chunk_size = size;
            }
            if let Some(overlap) = text.chunk_overlap {
                settings.chunk_overlap = overlap;
            }
        }
        settings
    }
}
