use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use studyplan_core::{Document, DocumentKind, OcrProvider};

use crate::OcrError;

const ENDPOINT: &str = "https://api.ocr.space/parse/image";

/// OCR.space parse API. The whole file is uploaded in one request.
pub struct OcrSpaceOcr {
    api_key: String,
    language: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl OcrSpaceOcr {
    pub fn new(api_key: String, client: reqwest::Client) -> Self {
        Self {
            api_key,
            language: "eng".to_string(),
            client,
            timeout: Duration::from_secs(300),
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn recognize(&self, document: &Document) -> Result<String, OcrError> {
        let file = Part::bytes(document.bytes().to_vec())
            .file_name(document.file_name())
            .mime_str(document.kind().mime_type())?;

        let form = Form::new()
            .text("apikey", self.api_key.clone())
            .text("language", self.language.clone())
            .text("OCREngine", "2")
            .text("filetype", filetype(document.kind()))
            .part("file", file);

        let resp = self
            .client
            .post(ENDPOINT)
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(OcrError::Status(status));
        }
        let data: Value = resp.json().await?;
        parse_response(&data)
    }
}

impl OcrProvider for OcrSpaceOcr {
    fn name(&self) -> &str {
        "OCR.space"
    }

    fn ocr<'a>(&'a self, document: &'a Document) -> Pin<Box<dyn Future<Output = String> + Send + 'a>> {
        Box::pin(async move {
            match self.recognize(document).await {
                Ok(text) => {
                    tracing::info!(chars = text.chars().count(), "OCR.space OK");
                    text
                }
                Err(e) => {
                    tracing::error!(path = %document.path().display(), error = %e, "OCR.space failed");
                    String::new()
                }
            }
        })
    }
}

fn filetype(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Pdf => "PDF",
        DocumentKind::Png => "PNG",
        DocumentKind::Jpeg => "JPG",
    }
}

/// `ErrorMessage` is sometimes a list of strings, sometimes a single string.
fn error_message(data: &Value) -> String {
    match &data["ErrorMessage"] {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join("; "),
        Value::String(s) => s.clone(),
        _ => "Unknown OCR error".to_string(),
    }
}

/// Concatenate the parsed text of every result, separated by a blank line.
fn parse_response(data: &Value) -> Result<String, OcrError> {
    if data["IsErroredOnProcessing"].as_bool().unwrap_or(false) {
        let msg = error_message(data);
        // A multi-page file can fail on some pages and still carry results.
        let partial = collect_parsed_text(data);
        if partial.trim().is_empty() {
            return Err(OcrError::Provider(msg));
        }
        tracing::warn!(error = %msg, "OCR.space reported errors, keeping partial text");
        return Ok(partial);
    }

    if !data["ParsedResults"].is_array() {
        return Err(OcrError::Payload("missing ParsedResults".into()));
    }
    Ok(collect_parsed_text(data))
}

fn collect_parsed_text(data: &Value) -> String {
    data["ParsedResults"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .map(|r| r["ParsedText"].as_str().unwrap_or(""))
                .collect::<Vec<_>>()
                .join("\n\n")
        })
        .unwrap_or_default()
}
