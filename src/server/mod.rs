//! HTTP server layer for Image Splitter.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │        GET /   POST /split   POST /ocr   POST /download_text    │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    pages    │  │        routes           │  │
//! │  │ (requests)  │  │   (HTML)    │  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod pages;
pub mod routes;

pub use handlers::{
    download_text_handler, health_handler, index_handler, ocr_handler, split_handler, AppState,
    DownloadTextForm, ErrorResponse, HealthResponse, ERROR_TYPE_HEADER, TEXT_FILE_NAME,
    TILE_COUNT_HEADER,
};
pub use routes::{create_router, RouterConfig};
