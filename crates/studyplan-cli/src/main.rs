use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use studyplan_core::Document;
use studyplan_core::config_file::{self, ApiKeysConfig, ConfigFile, OcrConfig};
use studyplan_ingest::{IngestSettings, Pipeline};
use studyplan_ocr::{OcrProviderKind, OcrSettings};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod output;

use output::ColorMode;

/// Study material extractor - text, pages and chapter outline from PDFs and scans
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// OCR provider for scanned documents: google, ocr_space or none
    #[arg(long, global = true)]
    ocr_provider: Option<String>,

    /// Google Cloud Vision API key
    #[arg(long, global = true)]
    google_key: Option<String>,

    /// OCR.space API key
    #[arg(long, global = true)]
    ocr_space_key: Option<String>,

    /// Also write logs to a daily-rotated file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the full text of a document
    Text {
        /// Path to a .pdf, .png, .jpg or .jpeg file
        file_path: PathBuf,
    },

    /// Extract the text of each page
    Pages {
        /// Path to a .pdf, .png, .jpg or .jpeg file
        file_path: PathBuf,
    },

    /// Reconstruct the chapter/section outline
    Outline {
        /// Path to a document, or to a .txt file (form feeds separate pages)
        file_path: PathBuf,
    },

    /// Extract, clean, chunk and outline a document
    Analyze {
        /// Path to a .pdf, .png, .jpg or .jpeg file
        file_path: PathBuf,
    },

    /// Store the OCR provider and keys given as flags in the user config file
    SaveConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.log_dir.as_deref())?;

    let config = config_file::load_config();
    let mut writer = std::io::stdout().lock();

    let pipeline = build_pipeline(&cli, &config)?;
    let color = ColorMode(!cli.no_color && !cli.json);

    match cli.command {
        Command::Text { ref file_path } => {
            let document = open(file_path)?;
            let text = pipeline.extract_text(&document).await;
            if text.trim().is_empty() {
                tracing::warn!(path = %file_path.display(), "no text could be extracted");
            }
            if cli.json {
                writeln!(writer, "{}", serde_json::json!({ "text": text }))?;
            } else {
                writeln!(writer, "{}", text)?;
            }
        }
        Command::Pages { ref file_path } => {
            let document = open(file_path)?;
            let pages = pipeline.extract_pages(&document).await;
            if cli.json {
                writeln!(writer, "{}", serde_json::to_string_pretty(&pages)?)?;
            } else {
                output::print_pages(&mut writer, &pages, color)?;
            }
        }
        Command::Outline { ref file_path } => {
            let outline = if is_plain_text(file_path) {
                let text = std::fs::read_to_string(file_path)?;
                pipeline.extract_structure_from_text(&text)
            } else {
                pipeline.extract_structure(&open(file_path)?).await
            };
            if cli.json {
                writeln!(writer, "{}", serde_json::to_string_pretty(&outline)?)?;
            } else {
                output::print_outline(&mut writer, &outline, color)?;
            }
        }
        Command::Analyze { ref file_path } => {
            let analysis = pipeline.analyze(&open(file_path)?).await?;
            if cli.json {
                writeln!(writer, "{}", serde_json::to_string_pretty(&analysis)?)?;
            } else {
                output::print_analysis(&mut writer, &analysis, color)?;
            }
        }
        Command::SaveConfig => {
            let path = config_file::save_config(&config_with_flags(&cli, &config)?).map_err(|e| anyhow::anyhow!(e))?;
            tracing::info!(path = %path.display(), "config saved");
            writeln!(writer, "Saved config to {}", path.display())?;
        }
    }

    Ok(())
}

fn open(file_path: &Path) -> anyhow::Result<Document> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }
    Ok(Document::open(file_path)?)
}

fn is_plain_text(file_path: &Path) -> bool {
    file_path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

/// Stderr logging filtered by `RUST_LOG` (default `studyplan=info,warn`),
/// plus a daily log file when `log_dir` is set. The returned guard flushes
/// the file writer on drop.
fn init_logging(log_dir: Option<&Path>) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("studyplan=info,warn"));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, "studyplan.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(guard)
}

/// Resolve OCR settings: CLI flags > env vars > config file > defaults.
fn ocr_settings(cli: &Cli, config: &ConfigFile) -> anyhow::Result<OcrSettings> {
    let api_keys = config.api_keys.clone().unwrap_or_default();
    let ocr = config.ocr.clone().unwrap_or_default();

    let provider = match cli.ocr_provider.clone().or_else(|| std::env::var("OCR_PROVIDER").ok()).or(ocr.provider) {
        Some(name) => name.parse::<OcrProviderKind>().map_err(|e| anyhow::anyhow!(e))?,
        None => OcrProviderKind::default(),
    };

    Ok(OcrSettings {
        provider,
        google_vision_key: cli
            .google_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_OCR_API_KEY").ok())
            .or(api_keys.google_vision_key),
        ocr_space_key: cli
            .ocr_space_key
            .clone()
            .or_else(|| std::env::var("OCR_API_KEY").ok())
            .or(api_keys.ocr_space_key),
        language: ocr.language,
        timeout: ocr.timeout_secs.map(Duration::from_secs),
    })
}

/// The loaded config with the OCR flags laid over it. Flag values win.
fn config_with_flags(cli: &Cli, config: &ConfigFile) -> anyhow::Result<ConfigFile> {
    if let Some(ref name) = cli.ocr_provider {
        name.parse::<OcrProviderKind>().map_err(|e| anyhow::anyhow!(e))?;
    }
    let overlay = ConfigFile {
        api_keys: Some(ApiKeysConfig {
            google_vision_key: cli.google_key.clone(),
            ocr_space_key: cli.ocr_space_key.clone(),
        }),
        ocr: Some(OcrConfig {
            provider: cli.ocr_provider.clone(),
            ..Default::default()
        }),
        ..Default::default()
    };
    Ok(config_file::merge(config.clone(), overlay))
}

fn build_pipeline(cli: &Cli, config: &ConfigFile) -> anyhow::Result<Pipeline> {
    let settings = IngestSettings::from_config(config);
    let ocr_settings = ocr_settings(cli, config)?;
    tracing::debug!(?settings, ?ocr_settings, "resolved configuration");

    let client = reqwest::Client::builder()
        .user_agent(concat!("studyplan/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let ocr = studyplan_ocr::build_provider(&ocr_settings, client);
    let pipeline = Pipeline::from_settings(&settings, ocr);

    let engine = pipeline.engine();
    let strategies: Vec<&str> = engine.strategies().iter().map(|s| s.name()).collect();
    if strategies.is_empty() {
        tracing::warn!(configured = ?settings.strategies, "no usable text-layer strategy, every document goes to OCR");
    }
    tracing::info!(provider = engine.ocr_provider().name(), ?strategies, "pipeline ready");

    Ok(pipeline)
}
