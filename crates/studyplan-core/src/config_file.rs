use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub api_keys: Option<ApiKeysConfig>,
    pub ocr: Option<OcrConfig>,
    pub extraction: Option<ExtractionConfig>,
    pub text: Option<TextConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeysConfig {
    pub google_vision_key: Option<String>,
    pub ocr_space_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrConfig {
    /// "google", "ocr_space" or "none".
    pub provider: Option<String>,
    pub language: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub min_text_chars: Option<usize>,
    /// Text-layer strategies in priority order, by name.
    pub strategies: Option<Vec<String>>,
    /// Fraction of the page height at the top whose text the MuPDF strategy
    /// drops (running heads).
    pub header_margin: Option<f32>,
    /// Same for the bottom of the page (page numbers, footers).
    pub footer_margin: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextConfig {
    pub chunk_size: Option<usize>,
    pub chunk_overlap: Option<usize>,
}

/// Platform config directory path: `<config_dir>/studyplan/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("studyplan").join("config.toml"))
}

/// Load config by cascading CWD `.studyplan.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".studyplan.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        api_keys: Some(ApiKeysConfig {
            google_vision_key: overlay
                .api_keys
                .as_ref()
                .and_then(|a| a.google_vision_key.clone())
                .or_else(|| {
                    base.api_keys
                        .as_ref()
                        .and_then(|a| a.google_vision_key.clone())
                }),
            ocr_space_key: overlay
                .api_keys
                .as_ref()
                .and_then(|a| a.ocr_space_key.clone())
                .or_else(|| base.api_keys.as_ref().and_then(|a| a.ocr_space_key.clone())),
        }),
        ocr: Some(OcrConfig {
            provider: overlay
                .ocr
                .as_ref()
                .and_then(|o| o.provider.clone())
                .or_else(|| base.ocr.as_ref().and_then(|o| o.provider.clone())),
            language: overlay
                .ocr
                .as_ref()
                .and_then(|o| o.language.clone())
                .or_else(|| base.ocr.as_ref().and_then(|o| o.language.clone())),
            timeout_secs: overlay
                .ocr
                .as_ref()
                .and_then(|o| o.timeout_secs)
                .or_else(|| base.ocr.as_ref().and_then(|o| o.timeout_secs)),
        }),
        extraction: Some(ExtractionConfig {
            min_text_chars: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.min_text_chars)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.min_text_chars)),
            strategies: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.strategies.clone())
                .or_else(|| base.extraction.as_ref().and_then(|e| e.strategies.clone())),
            header_margin: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.header_margin)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.header_margin)),
            footer_margin: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.footer_margin)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.footer_margin)),
        }),
        text: Some(TextConfig {
            chunk_size: overlay
                .text
                .as_ref()
                .and_then(|t| t.chunk_size)
                .or_else(|| base.text.as_ref().and_then(|t| t.chunk_size)),
            chunk_overlap: overlay
                .text
                .as_ref()
                .and_then(|t| t.chunk_overlap)
                .or_else(|| base.text.as_ref().and_then(|t| t.chunk_overlap)),
        }),
    }
}

/// Save the current config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, String> {
    let path = config_path().ok_or_else(|| "Could not determine config directory".to_string())?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let content =
        toml::to_string_pretty(config).map_err(|e| format!("Failed to serialize config: {}", e))?;
    std::fs::write(&path, content).map_err(|e| format!("Failed to write config: {}", e))?;
    Ok(path)
}
