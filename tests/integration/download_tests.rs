//! Text download integration tests.
//!
//! Tests verify:
//! - The attachment body is exactly the submitted text
//! - Headers name `extracted_text.txt` as a plain-text attachment
//! - Missing fields are rejected

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use image_splitter::server::ERROR_TYPE_HEADER;

use super::test_utils::split_router;

fn form_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/download_text")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_download_text_exact_bytes() {
    let response = split_router()
        .oneshot(form_request("text=hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/plain; charset=utf-8"
    );
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("extracted_text.txt"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"hello");
}

#[tokio::test]
async fn test_download_text_preserves_newlines_and_unicode() {
    // "Grüße\nline two & more"
    let response = split_router()
        .oneshot(form_request(
            "text=Gr%C3%BC%C3%9Fe%0Aline+two+%26+more",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(
        String::from_utf8(body.to_vec()).unwrap(),
        "Grüße\nline two & more"
    );
}

#[tokio::test]
async fn test_download_text_empty_text() {
    let response = split_router().oneshot(form_request("text=")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_download_text_missing_field() {
    let response = split_router()
        .oneshot(form_request("other=value"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get(ERROR_TYPE_HEADER).unwrap(),
        "missing_field"
    );
}
