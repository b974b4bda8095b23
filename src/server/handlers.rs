//! HTTP request handlers for Image Splitter.
//!
//! # Endpoints
//!
//! - `GET /` - Upload forms
//! - `POST /split` - Split an image into a zip of tiles
//! - `POST /ocr` - Extract text from an image
//! - `POST /download_text` - Download text as a file
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{AppError, OcrError, TileError, ValidationError};
use crate::ocr::OcrService;
use crate::tile::{build_archive, GridSpec, SplitService, ARCHIVE_CONTENT_TYPE, ARCHIVE_FILE_NAME};
use crate::upload::{read_upload, UploadPolicy};

use super::pages;

/// Download name for `/download_text`.
pub const TEXT_FILE_NAME: &str = "extracted_text.txt";

/// Header naming the error kind on failed requests.
pub const ERROR_TYPE_HEADER: &str = "x-error-type";

/// Header carrying the number of tiles in a split archive.
pub const TILE_COUNT_HEADER: &str = "x-tile-count";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// This is passed to all handlers via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Grid partitioner
    pub split_service: SplitService,

    /// Configured OCR engine
    pub ocr: OcrService,

    /// Upload allow-list and size ceiling
    pub upload_policy: Arc<UploadPolicy>,
}

impl AppState {
    /// Create application state with the default upload policy.
    pub fn new(split_service: SplitService, ocr: OcrService) -> Self {
        Self {
            split_service,
            ocr,
            upload_policy: Arc::new(UploadPolicy::default()),
        }
    }

    /// Replace the upload policy.
    pub fn with_upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.upload_policy = Arc::new(policy);
        self
    }
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Form body of `/download_text`.
#[derive(Debug, Deserialize)]
pub struct DownloadTextForm {
    #[serde(default)]
    pub text: Option<String>,
}

/// Error details, rendered into the error page and logs.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "invalid_grid", "ocr_failed")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status: u16,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

impl AppError {
    /// HTTP status and error type identifier for this error.
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(err) => match err {
                ValidationError::MissingFile => (StatusCode::BAD_REQUEST, "missing_file"),
                ValidationError::EmptyFilename => (StatusCode::BAD_REQUEST, "empty_filename"),
                ValidationError::DisallowedExtension { .. } => {
                    (StatusCode::BAD_REQUEST, "invalid_file_type")
                }
                ValidationError::InvalidGridSpec { .. } => (StatusCode::BAD_REQUEST, "invalid_grid"),
                ValidationError::MissingField(_) => (StatusCode::BAD_REQUEST, "missing_field"),
                ValidationError::PayloadTooLarge { .. } => {
                    (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large")
                }
                ValidationError::Multipart(_) => (StatusCode::BAD_REQUEST, "invalid_upload"),
            },

            AppError::Tile(err) => match err {
                TileError::Decode { .. } => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "decode_error"),
                TileError::GridTooFine { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "grid_too_fine")
                }
                TileError::TooManyTiles { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "too_many_tiles")
                }
                TileError::Encode { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "encode_error"),
                TileError::Task(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            },

            AppError::Archive(_) => (StatusCode::INTERNAL_SERVER_ERROR, "archive_error"),

            AppError::Ocr(err) => match err {
                OcrError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "ocr_timeout"),
                OcrError::Scratch(_) => (StatusCode::INTERNAL_SERVER_ERROR, "scratch_error"),
                OcrError::Network(_)
                | OcrError::MalformedResponse(_)
                | OcrError::Api(_)
                | OcrError::Engine(_) => (StatusCode::BAD_GATEWAY, "ocr_failed"),
            },
        }
    }

    /// Error details for the response body.
    pub fn to_error_response(&self) -> ErrorResponse {
        let (status, error_type) = self.classify();
        ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            status: status.as_u16(),
        }
    }
}

/// Convert AppError to HTTP response.
///
/// This implementation logs errors appropriately based on their severity:
/// - 4xx errors are logged at WARN level (client errors)
/// - 5xx errors are logged at ERROR level (server errors)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let details = self.to_error_response();
        let status = StatusCode::from_u16(details.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(
                error_type = %details.error,
                status = details.status,
                "Server error: {}",
                details.message
            );
        } else {
            warn!(
                error_type = %details.error,
                status = details.status,
                "Client error: {}",
                details.message
            );
        }

        let mut response = (status, Html(pages::error_page(&details.message))).into_response();
        if let Ok(value) = HeaderValue::from_str(&details.error) {
            response.headers_mut().insert(ERROR_TYPE_HEADER, value);
        }
        response
    }
}

fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{}\"", file_name)
}

// =============================================================================
// Handlers
// =============================================================================

/// Render the upload forms.
///
/// # Endpoint
///
/// `GET /`
pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(pages::index_page(state.upload_policy.allowed_extensions()))
}

/// Split an uploaded image into a grid of PNG tiles.
///
/// # Endpoint
///
/// `POST /split` (multipart/form-data)
///
/// # Form Fields
///
/// - `file`: Image with an allowed extension
/// - `rows`: Positive integer
/// - `cols`: Positive integer
///
/// # Response
///
/// - `200 OK`: `application/zip` attachment `split_images.zip` with
///   `rows * cols` entries named `split_<row>_<col>.png`
/// - `400 Bad Request`: Missing file, bad extension or bad grid
/// - `413 Payload Too Large`: Upload above the ceiling
/// - `415 Unsupported Media Type`: File is not a decodable image
/// - `422 Unprocessable Entity`: Grid finer than the image, or too many tiles
/// - `500 Internal Server Error`: Encoding or archive failure
pub async fn split_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_upload(multipart, &state.upload_policy).await?;

    let spec = GridSpec::parse(form.require("rows")?, form.require("cols")?)?;
    debug!(filename = %form.image.filename, grid = %spec, "Split requested");

    let tiles = state
        .split_service
        .split(form.image.data.clone(), spec)
        .await?;
    let archive = build_archive(&tiles)?;

    info!(
        filename = %form.image.filename,
        grid = %spec,
        tiles = tiles.len(),
        bytes = archive.len(),
        "Split image"
    );

    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, ARCHIVE_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, attachment(ARCHIVE_FILE_NAME)),
        ],
        [(TILE_COUNT_HEADER, tiles.len().to_string())],
        archive,
    )
        .into_response();

    Ok(response)
}

/// Extract text from an uploaded image.
///
/// # Endpoint
///
/// `POST /ocr` (multipart/form-data)
///
/// # Response
///
/// - `200 OK`: HTML page with the text and a download form; an image with
///   no text renders a "No text detected" notice
/// - `400 Bad Request`: Missing file or bad extension
/// - `502 Bad Gateway`: OCR engine or service failure
/// - `504 Gateway Timeout`: OCR did not finish in time
pub async fn ocr_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let form = read_upload(multipart, &state.upload_policy).await?;

    let text = state.ocr.extract_text(&form.image.data).await?;

    info!(
        filename = %form.image.filename,
        engine = state.ocr.engine_name(),
        chars = text.len(),
        "Extracted text"
    );

    Ok(Html(pages::ocr_result_page(&text)))
}

/// Return the submitted text as a downloadable file.
///
/// # Endpoint
///
/// `POST /download_text` (application/x-www-form-urlencoded)
///
/// # Response
///
/// `200 OK` with `text/plain` attachment `extracted_text.txt` whose body is
/// exactly the UTF-8 bytes of the `text` field.
pub async fn download_text_handler(
    Form(form): Form<DownloadTextForm>,
) -> Result<Response, AppError> {
    let text = form.text.ok_or(ValidationError::MissingField("text"))?;

    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, attachment(TEXT_FILE_NAME)),
        ],
        text,
    )
        .into_response();

    Ok(response)
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
