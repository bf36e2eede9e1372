//! OCR providers for documents without a usable text layer.
//!
//! Every provider implements [`OcrProvider`] and honours its contract: errors
//! are logged here and surface to the pipeline as empty (or partial) text.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

pub mod disabled;
pub mod google_vision;
pub mod ocr_space;

pub use disabled::DisabledOcr;
pub use google_vision::GoogleVisionOcr;
pub use ocr_space::OcrSpaceOcr;
pub use studyplan_core::OcrProvider;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("{0} API key not configured")]
    MissingApiKey(&'static str),
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("malformed response: {0}")]
    Payload(String),
}

/// Which OCR service to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OcrProviderKind {
    #[default]
    Google,
    OcrSpace,
    None,
}

impl FromStr for OcrProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "google" | "google_vision" => Ok(Self::Google),
            "ocr_space" | "ocrspace" => Ok(Self::OcrSpace),
            "none" | "off" => Ok(Self::None),
            other => Err(format!(
                "unknown OCR provider '{other}' (expected google, ocr_space or none)"
            )),
        }
    }
}

impl fmt::Display for OcrProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::OcrSpace => write!(f, "ocr_space"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Resolved OCR settings (CLI flags > env vars > config file > defaults).
#[derive(Clone, Default)]
pub struct OcrSettings {
    pub provider: OcrProviderKind,
    pub google_vision_key: Option<String>,
    pub ocr_space_key: Option<String>,
    /// OCR.space language code; defaults to "eng".
    pub language: Option<String>,
    /// Per-request timeout; each provider has its own default.
    pub timeout: Option<Duration>,
}

impl fmt::Debug for OcrSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrSettings")
            .field("provider", &self.provider)
            .field(
                "google_vision_key",
                &self.google_vision_key.as_ref().map(|_| "***"),
            )
            .field("ocr_space_key", &self.ocr_space_key.as_ref().map(|_| "***"))
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Build the configured provider.
///
/// A provider whose API key is missing degrades to [`DisabledOcr`], which logs
/// and returns empty text instead of failing.
pub fn build_provider(settings: &OcrSettings, client: reqwest::Client) -> Arc<dyn OcrProvider> {
    let key = |k: &Option<String>| k.as_ref().filter(|s| !s.trim().is_empty()).cloned();

    match settings.provider {
        OcrProviderKind::Google => match key(&settings.google_vision_key) {
            Some(api_key) => {
                let mut ocr = GoogleVisionOcr::new(api_key, client);
                if let Some(timeout) = settings.timeout {
                    ocr = ocr.with_timeout(timeout);
                }
                Arc::new(ocr)
            }
            None => Arc::new(DisabledOcr::new(OcrError::MissingApiKey("Google Vision").to_string())),
        },
        OcrProviderKind::OcrSpace => match key(&settings.ocr_space_key) {
            Some(api_key) => {
                let mut ocr = OcrSpaceOcr::new(api_key, client);
                if let Some(ref language) = settings.language {
                    ocr = ocr.with_language(language);
                }
                if let Some(timeout) = settings.timeout {
                    ocr = ocr.with_timeout(timeout);
                }
                Arc::new(ocr)
            }
            None => Arc::new(DisabledOcr::new(OcrError::MissingApiKey("OCR.space").to_string())),
        },
        OcrProviderKind::None => Arc::new(DisabledOcr::new("OCR disabled by configuration")),
    }
}
