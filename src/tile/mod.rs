//! Grid partitioning of uploaded images.
//!
//! This module splits a decoded image into an R×C grid of PNG tiles and
//! packages them into a zip archive.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              SplitService               │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  GridLayout  │  │  PNG Encoder    │  │
//! │  │  (tile       │  │  (decode →      │  │
//! │  │   bounds)    │  │   crop → encode)│  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │          build_archive (zip)            │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`SplitService`]: Main entry point, runs the full partition pipeline
//! - [`GridSpec`]: Validated (rows, cols) pair
//! - [`GridLayout`]: Tile bounds for one image and grid, honouring the [`RemainderPolicy`]
//! - [`PngTileEncoder`]: Decodes the source and encodes cropped tiles
//! - [`build_archive`]: Writes tiles into an in-memory zip
//!
//! # Example
//!
//! ```no_run
//! use image_splitter::tile::{build_archive, GridSpec, SplitService};
//!
//! # fn run(upload: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let service = SplitService::new();
//! let tiles = service.partition(upload, GridSpec::parse("2", "3")?)?;
//! let zip = build_archive(&tiles)?;
//! println!("{} tiles, {} bytes zipped", tiles.len(), zip.len());
//! # Ok(())
//! # }
//! ```

mod archive;
mod encoder;
mod grid;
mod service;

pub use archive::{build_archive, ARCHIVE_CONTENT_TYPE, ARCHIVE_FILE_NAME};
pub use encoder::PngTileEncoder;
pub use grid::{GridLayout, GridSpec, RemainderPolicy, TileBounds};
pub use service::{SplitService, Tile, DEFAULT_MAX_TILES};
