//! OCR endpoint integration tests.
//!
//! Tests verify:
//! - Extracted text is rendered with a download form
//! - Engine failures and timeouts surface as user-visible errors
//! - Scratch files never outlive a request
//! - Uploads are validated before the engine runs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use http_body_util::BodyExt;
use tower::ServiceExt;

use image_splitter::error::OcrError;
use image_splitter::ocr::{LocalEngine, OcrEngine, OcrService};
use image_splitter::scratch::ScratchDir;
use image_splitter::server::{create_router, AppState, RouterConfig, ERROR_TYPE_HEADER};
use image_splitter::tile::SplitService;

use super::test_utils::{
    calls, create_png, file_count, multipart_request, ocr_request, test_router, MockOcrEngine,
    MultipartBody,
};

async fn body_text(response: axum::response::Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}

fn error_type(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(ERROR_TYPE_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
}

// =============================================================================
// Successful Extraction
// =============================================================================

#[tokio::test]
async fn test_ocr_renders_text_and_download_form() {
    let router = test_router(MockOcrEngine::returning("Hello\nWorld"));

    let response = router
        .oneshot(ocr_request("scan.png", &create_png(10, 10)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Hello\nWorld"));
    assert!(html.contains(r#"action="/download_text""#));
    assert!(html.contains(r#"name="text""#));
}

#[tokio::test]
async fn test_ocr_escapes_extracted_text() {
    let router = test_router(MockOcrEngine::returning("<b>bold</b> & more"));

    let response = router
        .oneshot(ocr_request("scan.png", &create_png(10, 10)))
        .await
        .unwrap();

    let html = body_text(response).await;
    assert!(html.contains("&lt;b&gt;bold&lt;/b&gt; &amp; more"));
    assert!(!html.contains("<b>bold</b>"));
}

#[tokio::test]
async fn test_ocr_empty_text_is_not_an_error() {
    let router = test_router(MockOcrEngine::returning(""));

    let response = router
        .oneshot(ocr_request("blank.png", &create_png(10, 10)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("No text detected"));
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_ocr_engine_failure_is_reported() {
    let router = test_router(MockOcrEngine::failing(OcrError::Api(
        "E101: quota exceeded".to_string(),
    )));

    let response = router
        .oneshot(ocr_request("scan.png", &create_png(10, 10)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(error_type(&response), "ocr_failed");

    let html = body_text(response).await;
    assert!(html.contains("quota exceeded"));
}

#[tokio::test]
async fn test_ocr_network_failure_is_reported() {
    let router = test_router(MockOcrEngine::failing(OcrError::Network(
        "connection refused".to_string(),
    )));

    let response = router
        .oneshot(ocr_request("scan.jpg", &create_png(10, 10)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let html = body_text(response).await;
    assert!(html.contains("unreachable"));
}

struct StalledEngine;

#[async_trait]
impl OcrEngine for StalledEngine {
    fn name(&self) -> &'static str {
        "stalled"
    }

    async fn extract_text(&self, _image: &[u8]) -> Result<String, OcrError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("too late".to_string())
    }
}

#[tokio::test]
async fn test_ocr_timeout() {
    let ocr = OcrService::new(Arc::new(StalledEngine)).with_timeout(Duration::from_millis(50));
    let state = AppState::new(SplitService::new(), ocr);
    let router = create_router(state, RouterConfig::new().with_tracing(false));

    let response = router
        .oneshot(ocr_request("scan.png", &create_png(10, 10)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(error_type(&response), "ocr_timeout");
}

#[tokio::test]
async fn test_ocr_local_engine_failure_leaves_no_scratch_files() {
    let dir = tempfile::tempdir().unwrap();
    let engine = LocalEngine::new(ScratchDir::new(dir.path()))
        .with_binary(dir.path().join("no-such-tesseract"));
    let state = AppState::new(SplitService::new(), OcrService::new(Arc::new(engine)));
    let router = create_router(state, RouterConfig::new().with_tracing(false));

    let response = router
        .oneshot(ocr_request("scan.png", &create_png(10, 10)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(error_type(&response), "ocr_failed");
    assert_eq!(file_count(dir.path()), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_ocr_local_engine_success_leaves_no_scratch_files() {
    let dir = tempfile::tempdir().unwrap();
    let scratch = dir.path().join("uploads");
    std::fs::create_dir(&scratch).unwrap();

    // `sh <scratch file> stdout -l eng` executes the upload as a script
    let engine = LocalEngine::new(ScratchDir::new(&scratch)).with_binary("sh");
    let state = AppState::new(SplitService::new(), OcrService::new(Arc::new(engine)));
    let router = create_router(state, RouterConfig::new().with_tracing(false));

    let response = router
        .oneshot(ocr_request("script.png", b"echo '  recognised text  '\n"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("recognised text"));
    assert_eq!(file_count(&scratch), 0);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_ocr_rejects_disallowed_extension_without_calling_engine() {
    let engine = MockOcrEngine::returning("never");
    let counter = engine.call_counter();
    let router = test_router(engine);

    let response = router
        .oneshot(ocr_request("document.pdf", b"%PDF-1.4"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_type(&response), "invalid_file_type");
    assert_eq!(calls(&counter), 0);
}

#[tokio::test]
async fn test_ocr_missing_file() {
    let engine = MockOcrEngine::returning("never");
    let counter = engine.call_counter();
    let router = test_router(engine);

    let response = router
        .oneshot(multipart_request("/ocr", MultipartBody::new().text("note", "x")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_type(&response), "missing_file");
    assert_eq!(calls(&counter), 0);

    let html = body_text(response).await;
    assert!(html.contains("No file uploaded."));
}
