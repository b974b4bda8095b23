//! Hosted OCR through an OCR.space-compatible HTTP API.
//!
//! The image is posted as multipart form data together with the API key and
//! language. The response carries one `ParsedText` per page and an error
//! flag; `ErrorMessage` may be a string or a list of strings.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use crate::error::OcrError;

use super::{normalize_text, OcrEngine, DEFAULT_OCR_LANGUAGE, DEFAULT_OCR_TIMEOUT};

/// Default OCR.space endpoint.
pub const DEFAULT_OCR_API_URL: &str = "https://api.ocr.space/parse/image";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParseResponse {
    #[serde(default)]
    parsed_results: Vec<ParsedResult>,

    #[serde(default)]
    is_errored_on_processing: bool,

    #[serde(default)]
    error_message: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: String,
}

/// Flatten `ErrorMessage`, which the API sends as a string or a list.
fn error_text(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .collect::<Vec<_>>()
            .join("; "),
        _ => "unknown error".to_string(),
    }
}

/// Remote OCR engine.
///
/// The API key is supplied by configuration; it never appears in `Debug`
/// output or logs.
#[derive(Clone)]
pub struct RemoteApi {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    language: String,
    timeout: Duration,
}

impl RemoteApi {
    /// Create a client for `endpoint` with the default 60 second timeout.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, OcrError> {
        Self::with_timeout(endpoint, api_key, DEFAULT_OCR_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OcrError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            language: DEFAULT_OCR_LANGUAGE.to_string(),
            timeout,
        })
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RemoteApi {
    fn transport_error(&self, err: reqwest::Error) -> OcrError {
        if err.is_timeout() {
            OcrError::Timeout(self.timeout)
        } else {
            OcrError::Network(err.to_string())
        }
    }
}

impl std::fmt::Debug for RemoteApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteApi")
            .field("endpoint", &self.endpoint)
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl OcrEngine for RemoteApi {
    fn name(&self) -> &'static str {
        "remote-api"
    }

    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError> {
        let format = image::guess_format(image).ok();
        let extension = format
            .and_then(|f| f.extensions_str().first().copied())
            .unwrap_or("png");
        let mime = format
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream");

        let part = Part::bytes(image.to_vec())
            .file_name(format!("upload.{}", extension))
            .mime_str(mime)
            .map_err(|e| OcrError::Engine(e.to_string()))?;

        let form = Form::new()
            .text("apikey", self.api_key.clone())
            .text("language", self.language.clone())
            .text("OCREngine", "2")
            .part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        // The client timeout also covers the body, so a stalled body is a timeout
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body);
            return Err(OcrError::Api(format!("service returned {}: {}", status, body.trim())));
        }

        let parsed: ParseResponse = serde_json::from_slice(&body)
            .map_err(|e| OcrError::MalformedResponse(e.to_string()))?;

        if parsed.is_errored_on_processing {
            return Err(OcrError::Api(error_text(parsed.error_message.as_ref())));
        }

        let raw = parsed
            .parsed_results
            .iter()
            .map(|r| r.parsed_text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let text = normalize_text(&raw);
        debug!(
            pages = parsed.parsed_results.len(),
            chars = text.len(),
            "Remote OCR finished"
        );
        Ok(text)
    }
}
