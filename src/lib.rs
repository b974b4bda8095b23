//! # Image Splitter
//!
//! A small web service that splits uploaded images into a grid of tiles and
//! extracts text from images with OCR.
//!
//! ## Features
//!
//! - **Grid splitting**: Cuts an image into `rows x cols` PNG tiles and
//!   returns them as `split_images.zip`
//! - **Remainder policy**: Drops leftover edge pixels (default) or stretches
//!   the last row and column to cover them
//! - **Swappable OCR**: Local tesseract binary or a hosted OCR.space-style API
//! - **Scoped scratch storage**: Transient upload files are removed on every
//!   exit path
//!
//! ## Architecture
//!
//! - [`tile`] - Grid layout, PNG encoding and zip assembly
//! - [`ocr`] - OCR engine trait and backends
//! - [`upload`] - Multipart intake and extension allow-list
//! - [`scratch`] - Request-scoped scratch files
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use image_splitter::{create_router, AppState, LocalEngine, OcrService, RouterConfig, ScratchDir, SplitService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = LocalEngine::new(ScratchDir::new("uploads"));
//!     let state = AppState::new(SplitService::new(), OcrService::new(Arc::new(engine)));
//!     let router = create_router(state, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod ocr;
pub mod scratch;
pub mod server;
pub mod tile;
pub mod upload;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ArchiveError, OcrError, TileError, ValidationError};
pub use ocr::{LocalEngine, OcrBackend, OcrEngine, OcrService, RemoteApi};
pub use scratch::{ScratchDir, ScratchFile};
pub use server::{create_router, AppState, RouterConfig};
pub use tile::{
    build_archive, GridLayout, GridSpec, PngTileEncoder, RemainderPolicy, SplitService, Tile,
    TileBounds,
};
pub use upload::{UploadPolicy, UploadedImage};
