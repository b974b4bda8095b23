//! Split service for partitioning uploaded images.
//!
//! The SplitService is the entry point for the `/split` endpoint. It:
//! - Enforces the tile-count ceiling
//! - Rejects degenerate grids before the full decode
//! - Decodes the source image once
//! - Crops and PNG-encodes every tile in row-major order
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         SplitService                            │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                    partition()                          │    │
//! │  │  1. Check tile count   3. Decode source                 │    │
//! │  │  2. Compute layout     4. Crop + encode each tile       │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │                  │                          │                   │
//! │                  ▼                          ▼                   │
//! │          ┌──────────────┐         ┌──────────────────┐          │
//! │          │  GridLayout  │         │  PngTileEncoder  │          │
//! │          └──────────────┘         └──────────────────┘          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use bytes::Bytes;
use image::DynamicImage;
use tracing::debug;

use crate::error::TileError;

use super::encoder::PngTileEncoder;
use super::grid::{GridLayout, GridSpec, RemainderPolicy};

/// Default ceiling on `rows * cols` for a single request.
pub const DEFAULT_MAX_TILES: usize = 4096;

// =============================================================================
// Tile
// =============================================================================

/// One encoded tile, ready to be archived.
#[derive(Debug, Clone)]
pub struct Tile {
    /// Archive entry name (`split_<row>_<col>.png`, 1-indexed)
    pub name: String,

    /// 0-indexed row
    pub row: u32,

    /// 0-indexed column
    pub col: u32,

    /// Tile width in pixels
    pub width: u32,

    /// Tile height in pixels
    pub height: u32,

    /// PNG-encoded tile data
    pub data: Bytes,
}

// =============================================================================
// Split Service
// =============================================================================

/// Service that partitions images into grid tiles.
///
/// Cheap to clone; holds no per-request state.
///
/// # Example
///
/// ```ignore
/// use image_splitter::tile::{GridSpec, SplitService};
///
/// let service = SplitService::new();
/// let tiles = service.split(upload_bytes, GridSpec::new(2, 3)?).await?;
/// assert_eq!(tiles.len(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct SplitService {
    encoder: PngTileEncoder,
    policy: RemainderPolicy,
    max_tiles: usize,
}

impl Default for SplitService {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitService {
    /// Create a split service that drops remainder pixels.
    pub fn new() -> Self {
        Self {
            encoder: PngTileEncoder::new(),
            policy: RemainderPolicy::Drop,
            max_tiles: DEFAULT_MAX_TILES,
        }
    }

    /// Set the remainder policy.
    pub fn with_policy(mut self, policy: RemainderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the maximum number of tiles per request.
    pub fn with_max_tiles(mut self, max_tiles: usize) -> Self {
        self.max_tiles = max_tiles;
        self
    }

    pub fn policy(&self) -> RemainderPolicy {
        self.policy
    }

    pub fn max_tiles(&self) -> usize {
        self.max_tiles
    }

    /// Partition on the blocking thread pool.
    ///
    /// Decoding and PNG encoding are CPU-bound; running them here keeps the
    /// async workers free for other requests.
    pub async fn split(&self, source: Bytes, spec: GridSpec) -> Result<Vec<Tile>, TileError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.partition(&source, spec))
            .await
            .map_err(|e| TileError::Task(e.to_string()))?
    }

    /// Decode `source` and split it into `spec.rows() * spec.cols()` tiles.
    ///
    /// # Errors
    ///
    /// - [`TileError::TooManyTiles`] if the grid exceeds the ceiling
    /// - [`TileError::Decode`] if the source is not a supported image
    /// - [`TileError::GridTooFine`] if tiles would be zero pixels wide or tall
    /// - [`TileError::Encode`] if any tile fails to encode; no tiles are
    ///   returned in that case
    pub fn partition(&self, source: &[u8], spec: GridSpec) -> Result<Vec<Tile>, TileError> {
        self.check_tile_count(spec)?;

        // Reject degenerate grids from the header alone
        let (width, height) = self.encoder.dimensions(source)?;
        GridLayout::compute(width, height, spec, self.policy)?;

        let image = self.encoder.decode(source)?;
        self.partition_image(&image, spec)
    }

    /// Split an already decoded image.
    pub fn partition_image(
        &self,
        image: &DynamicImage,
        spec: GridSpec,
    ) -> Result<Vec<Tile>, TileError> {
        self.check_tile_count(spec)?;

        let layout = GridLayout::compute(image.width(), image.height(), spec, self.policy)?;
        let (covered_width, covered_height) = layout.covered();

        debug!(
            grid = %spec,
            width = image.width(),
            height = image.height(),
            tile_width = layout.tile_width(),
            tile_height = layout.tile_height(),
            covered_width,
            covered_height,
            policy = %self.policy,
            "Partitioning image"
        );

        layout
            .tiles()
            .map(|bounds| {
                let data = self.encoder.encode_tile(image, &bounds)?;
                Ok(Tile {
                    name: bounds.file_name(),
                    row: bounds.row,
                    col: bounds.col,
                    width: bounds.width(),
                    height: bounds.height(),
                    data,
                })
            })
            .collect()
    }

    fn check_tile_count(&self, spec: GridSpec) -> Result<(), TileError> {
        let requested = spec.tile_count();
        if requested > self.max_tiles as u64 {
            return Err(TileError::TooManyTiles {
                rows: spec.rows(),
                cols: spec.cols(),
                requested,
                max: self.max_tiles,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
