//! Test utilities for integration tests.
//!
//! This module provides mock OCR engines, image fixtures and a small
//! multipart body builder for driving the router with `oneshot`.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::Router;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use image_splitter::error::OcrError;
use image_splitter::ocr::{OcrEngine, OcrService};
use image_splitter::server::{create_router, AppState, RouterConfig};
use image_splitter::tile::SplitService;
use image_splitter::upload::UploadPolicy;

// =============================================================================
// Mock OCR Engines
// =============================================================================

/// An OCR engine that returns a fixed result and counts its calls.
pub struct MockOcrEngine {
    result: Result<String, OcrError>,
    calls: Arc<AtomicUsize>,
}

impl MockOcrEngine {
    pub fn returning(text: impl Into<String>) -> Self {
        Self {
            result: Ok(text.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(error: OcrError) -> Self {
        Self {
            result: Err(error),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl OcrEngine for MockOcrEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn extract_text(&self, _image: &[u8]) -> Result<String, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Number of calls recorded by a counter from [`MockOcrEngine::call_counter`].
pub fn calls(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

// =============================================================================
// Router Construction
// =============================================================================

/// Build a router around the given OCR engine with default split settings.
pub fn test_router(engine: impl OcrEngine + 'static) -> Router {
    test_router_with(engine, SplitService::new(), UploadPolicy::default())
}

/// Build a router with explicit split service and upload policy.
pub fn test_router_with(
    engine: impl OcrEngine + 'static,
    split_service: SplitService,
    upload_policy: UploadPolicy,
) -> Router {
    let ocr = OcrService::new(Arc::new(engine));
    let state = AppState::new(split_service, ocr).with_upload_policy(upload_policy);
    create_router(state, RouterConfig::new().with_tracing(false))
}

/// Router whose OCR engine must never be reached.
pub fn split_router() -> Router {
    test_router(MockOcrEngine::failing(OcrError::Engine(
        "not expected in this test".to_string(),
    )))
}

// =============================================================================
// Image Fixtures
// =============================================================================

/// Create an RGB image where every pixel encodes its own coordinates.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

/// Encode an image in the given format.
pub fn encode_image(image: &RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut buf, format)
        .unwrap();
    buf.into_inner()
}

/// A PNG-encoded gradient of the given size.
pub fn create_png(width: u32, height: u32) -> Vec<u8> {
    encode_image(&gradient_image(width, height), ImageFormat::Png)
}

// =============================================================================
// Multipart Bodies
// =============================================================================

pub const BOUNDARY: &str = "----image-splitter-test-boundary";

/// Builder for `multipart/form-data` request bodies.
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plain text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    /// Append a file field.
    pub fn file(mut self, name: &str, filename: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// Build a multipart POST request.
pub fn multipart_request(uri: &str, body: MultipartBody) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body.finish()))
        .unwrap()
}

/// Build a `/split` request for a file and grid.
pub fn split_request(filename: &str, data: &[u8], rows: &str, cols: &str) -> Request<Body> {
    multipart_request(
        "/split",
        MultipartBody::new()
            .file("file", filename, data)
            .text("rows", rows)
            .text("cols", cols),
    )
}

/// Build an `/ocr` request for a file.
pub fn ocr_request(filename: &str, data: &[u8]) -> Request<Body> {
    multipart_request("/ocr", MultipartBody::new().file("file", filename, data))
}

// =============================================================================
// Archive Helpers
// =============================================================================

/// Read every entry of a zip archive as (name, bytes), in archive order.
pub fn read_zip_entries(data: &[u8]) -> Vec<(String, Vec<u8>)> {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).unwrap();
        entries.push((file.name().to_string(), contents));
    }
    entries
}

/// Count files left in a directory.
pub fn file_count(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
