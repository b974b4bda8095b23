//! Router configuration for Image Splitter.
//!
//! This module defines the HTTP routes and applies middleware for CORS,
//! the upload body limit and request tracing.
//!
//! # Route Structure
//!
//! ```text
//! /                - Upload forms
//! /split           - Split an image into a zip of tiles
//! /ocr             - Extract text from an image
//! /download_text   - Download text as extracted_text.txt
//! /health          - Health check
//! ```
//!
//! # Example
//!
//! ```ignore
//! use image_splitter::server::{create_router, AppState, RouterConfig};
//!
//! let state = AppState::new(split_service, ocr_service);
//! let router = create_router(state, RouterConfig::new());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    download_text_handler, health_handler, index_handler, ocr_handler, split_handler, AppState,
};

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// The request body limit comes from the state's upload policy, so
/// oversized uploads are cut off while streaming rather than after
/// buffering.
pub fn create_router(state: AppState, config: RouterConfig) -> Router {
    let body_limit = state.upload_policy.max_bytes();
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/", get(index_handler))
        .route("/split", post(split_handler))
        .route("/ocr", post(ocr_handler))
        .route("/download_text", post(download_text_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
