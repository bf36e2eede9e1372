use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};

use studyplan_core::{Document, OcrProvider, TextLayerBackend};
use studyplan_pdf::LopdfBackend;

use crate::OcrError;

const FILES_ENDPOINT: &str = "https://vision.googleapis.com/v1/files:annotate";
const IMAGES_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Synchronous `files:annotate` accepts at most this many pages per request.
pub const MAX_PAGES_PER_REQUEST: usize = 5;

/// Google Cloud Vision `DOCUMENT_TEXT_DETECTION`.
///
/// PDFs are sent inline in batches of [`MAX_PAGES_PER_REQUEST`] pages; images
/// go through `images:annotate`. A failed batch is logged and skipped, so the
/// result holds whatever pages were recognized.
///
/// Pages are counted with lopdf. When lopdf cannot read the file, the
/// `totalPages` of the first response decides how many batches follow.
pub struct GoogleVisionOcr {
    api_key: String,
    client: reqwest::Client,
    timeout: Duration,
    page_counter: LopdfBackend,
}

/// Per-page texts of one `files:annotate` batch, plus the page count Vision
/// reports for the whole file.
#[derive(Debug, PartialEq)]
struct FileBatch {
    pages: Vec<String>,
    total_pages: Option<usize>,
}

impl GoogleVisionOcr {
    pub fn new(api_key: String, client: reqwest::Client) -> Self {
        Self {
            api_key,
            client,
            timeout: Duration::from_secs(60),
            page_counter: LopdfBackend::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn post(&self, endpoint: &str, body: &Value) -> Result<Value, OcrError> {
        let resp = self
            .client
            .post(endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(OcrError::Status(status));
        }
        Ok(resp.json().await?)
    }

    async fn recognize_image(&self, document: &Document) -> Result<String, OcrError> {
        let content = BASE64.encode(document.bytes());
        let data = self.post(IMAGES_ENDPOINT, &image_request(&content)).await?;
        parse_image_response(&data)
    }

    async fn recognize_pdf(&self, document: &Document) -> String {
        let mut total = match self.page_counter.page_count(document) {
            Ok(n) => Some(n.max(1)),
            Err(e) => {
                tracing::warn!(error = %e, "could not count pages, using the count Vision reports");
                None
            }
        };

        let content = BASE64.encode(document.bytes());
        let mut texts = Vec::new();
        let mut next = 1;

        while let Some(batch) = next_batch(next, total) {
            let (first, last) = (batch[0], batch[batch.len() - 1]);
            next = last + 1;
            let result = match self.post(FILES_ENDPOINT, &file_request(&content, &batch)).await {
                Ok(data) => parse_file_response(&data),
                Err(e) => Err(e),
            };
            match result {
                Ok(file) => {
                    if total.is_none() {
                        total = file.total_pages;
                    }
                    let chars: usize = file.pages.iter().map(|p| p.len()).sum();
                    tracing::info!(first, last, total, chars, "Google Vision batch OK");
                    texts.extend(file.pages);
                }
                Err(e) => {
                    tracing::error!(first, last, error = %e, "Google Vision batch failed");
                }
            }
        }

        if total.is_none() {
            tracing::warn!("page count unknown, only the first batch was recognized");
        }
        texts.join("\n\n")
    }
}

impl OcrProvider for GoogleVisionOcr {
    fn name(&self) -> &str {
        "Google Vision"
    }

    fn ocr<'a>(&'a self, document: &'a Document) -> Pin<Box<dyn Future<Output = String> + Send + 'a>> {
        Box::pin(async move {
            if document.kind().is_image() {
                match self.recognize_image(document).await {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!(path = %document.path().display(), error = %e, "Google Vision OCR failed");
                        String::new()
                    }
                }
            } else {
                self.recognize_pdf(document).await
            }
        })
    }
}

/// The batch starting at page `next`, or `None` once every page is covered.
/// With the page count still unknown only the first batch is planned.
fn next_batch(next: usize, total: Option<usize>) -> Option<Vec<usize>> {
    let last = match total {
        Some(total) => total.min(next + MAX_PAGES_PER_REQUEST - 1),
        None if next == 1 => MAX_PAGES_PER_REQUEST,
        None => return None,
    };
    (next <= last).then(|| (next..=last).collect())
}

fn file_request(content: &str, pages: &[usize]) -> Value {
    json!({
        "requests": [{
            "inputConfig": { "content": content, "mimeType": "application/pdf" },
            "features": [{ "type": "DOCUMENT_TEXT_DETECTION" }],
            "pages": pages,
        }]
    })
}

fn image_request(content: &str) -> Value {
    json!({
        "requests": [{
            "image": { "content": content },
            "features": [{ "type": "DOCUMENT_TEXT_DETECTION" }],
        }]
    })
}

fn check_error(item: &Value) -> Result<(), OcrError> {
    match item["error"]["message"].as_str() {
        Some(msg) => Err(OcrError::Provider(msg.to_string())),
        None => Ok(()),
    }
}

/// Per-page texts from a `files:annotate` response. A page without a
/// `fullTextAnnotation` (blank page) contributes an empty string.
fn parse_file_response(data: &Value) -> Result<FileBatch, OcrError> {
    let file = data["responses"]
        .get(0)
        .ok_or_else(|| OcrError::Payload("missing responses".into()))?;
    check_error(file)?;

    let pages = file["responses"]
        .as_array()
        .ok_or_else(|| OcrError::Payload("missing page responses".into()))?;

    let pages = pages
        .iter()
        .map(|page| {
            if let Err(e) = check_error(page) {
                tracing::warn!(error = %e, "Google Vision page error");
            }
            page["fullTextAnnotation"]["text"]
                .as_str()
                .unwrap_or("")
                .to_string()
        })
        .collect();

    Ok(FileBatch {
        pages,
        total_pages: file["totalPages"].as_u64().map(|n| n as usize),
    })
}

fn parse_image_response(data: &Value) -> Result<String, OcrError> {
    let item = data["responses"]
        .get(0)
        .ok_or_else(|| OcrError::Payload("missing responses".into()))?;
    check_error(item)?;
    Ok(item["fullTextAnnotation"]["text"]
        .as_str()
        .unwrap_or("")
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every batch requested for a file, where `reported` is the
    /// `totalPages` the first response carries.
    fn plan(mut total: Option<usize>, reported: Option<usize>) -> Vec<Vec<usize>> {
        let mut batches = Vec::new();
        let mut next = 1;
        while let Some(batch) = next_batch(next, total) {
            next = batch[batch.len() - 1] + 1;
            batches.push(batch);
            total = total.or(reported);
        }
        batches
    }

    #[test]
    fn batches_cover_every_page() {
        assert_eq!(plan(Some(1), None), vec![vec![1]]);
        let batches = plan(Some(12), None);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0], vec![1, 2, 3, 4, 5]);
        assert_eq!(batches[2], vec![11, 12]);
        assert_eq!(next_batch(1, Some(0)), None);
    }

    #[test]
    fn unknown_page_count_follows_reported_total() {
        let batches = plan(None, Some(40));
        assert_eq!(batches.len(), 8);
        assert_eq!(batches[0], vec![1, 2, 3, 4, 5]);
        assert_eq!(batches[7], vec![36, 37, 38, 39, 40]);

        assert_eq!(plan(None, Some(3)), vec![vec![1, 2, 3, 4, 5]]);
        assert_eq!(plan(None, None), vec![vec![1, 2, 3, 4, 5]]);
    }

    #[test]
    fn file_request_shape() {
        let body = file_request("QUJD", &[6, 7]);
        let req = &body["requests"][0];
        assert_eq!(req["inputConfig"]["mimeType"], "application/pdf");
        assert_eq!(req["features"][0]["type"], "DOCUMENT_TEXT_DETECTION");
        assert_eq!(req["pages"], json!([6, 7]));
    }

    #[test]
    fn parse_file_response_keeps_blank_pages() {
        let data = json!({
            "responses": [{
                "responses": [
                    { "fullTextAnnotation": { "text": "Chapter 1\nIntro" } },
                    {},
                    { "fullTextAnnotation": { "text": "More" } }
                ],
                "totalPages": 3
            }]
        });
        let file = parse_file_response(&data).unwrap();
        assert_eq!(file.pages, vec!["Chapter 1\nIntro", "", "More"]);
        assert_eq!(file.total_pages, Some(3));
    }

    #[test]
    fn parse_file_response_surfaces_errors() {
        let data = json!({ "responses": [{ "error": { "code": 3, "message": "Bad image data." } }] });
        let err = parse_file_response(&data).unwrap_err();
        assert!(matches!(err, OcrError::Provider(msg) if msg == "Bad image data."));

        assert!(matches!(
            parse_file_response(&json!({})),
            Err(OcrError::Payload(_))
        ));
    }

    #[test]
    fn parse_image_response_missing_annotation_is_empty() {
        let data = json!({ "responses": [{}] });
        assert_eq!(parse_image_response(&data).unwrap(), "");
        let data = json!({ "responses": [{ "fullTextAnnotation": { "text": "Scanned" } }] });
        assert_eq!(parse_image_response(&data).unwrap(), "Scanned");
    }
}
