//! API integration tests for the landing page, health check and routing.
//!
//! Tests verify:
//! - The landing page serves both upload forms
//! - Health check response shape
//! - CORS preflight handling
//! - Unknown routes and wrong methods

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use std::sync::Arc;

use image_splitter::ocr::OcrService;
use image_splitter::server::{create_router, AppState, RouterConfig};
use image_splitter::tile::SplitService;
use image_splitter::upload::UploadPolicy;

use super::test_utils::{split_router, test_router_with, MockOcrEngine};

fn cors_router(origins: Vec<String>) -> axum::Router {
    let ocr = OcrService::new(Arc::new(MockOcrEngine::returning("")));
    let state = AppState::new(SplitService::new(), ocr);
    create_router(
        state,
        RouterConfig::new()
            .with_cors_origins(origins)
            .with_tracing(false),
    )
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/split")
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_index_page() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = split_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains(r#"action="/split""#));
    assert!(html.contains(r#"action="/ocr""#));
    assert!(html.contains("png, jpg, jpeg, gif, bmp"));
}

#[tokio::test]
async fn test_index_page_lists_configured_extensions() {
    let router = test_router_with(
        MockOcrEngine::returning(""),
        SplitService::new(),
        UploadPolicy::new(vec!["PNG".to_string(), ".webp".to_string()], 1024),
    );
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = router.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();

    assert!(html.contains(r#"accept=".png,.webp""#));
}

#[tokio::test]
async fn test_health_check() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = split_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_cors_preflight() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/split")
        .header("origin", "https://example.com")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = split_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_restricted_origins() {
    let origins = vec!["https://allowed.example".to_string()];

    let response = cors_router(origins.clone())
        .oneshot(preflight("https://allowed.example"))
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "https://allowed.example"
    );

    let response = cors_router(origins)
        .oneshot(preflight("https://other.example"))
        .await
        .unwrap();
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}

#[tokio::test]
async fn test_cors_empty_origin_list_allows_none() {
    let response = cors_router(vec![])
        .oneshot(preflight("https://example.com"))
        .await
        .unwrap();

    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}

#[tokio::test]
async fn test_unknown_route() {
    let request = Request::builder()
        .uri("/tiles/0/0.png")
        .body(Body::empty())
        .unwrap();

    let response = split_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_split_requires_post() {
    let request = Request::builder()
        .uri("/split")
        .body(Body::empty())
        .unwrap();

    let response = split_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
