//! Grid layout for image partitioning.
//!
//! Tile size is computed once with truncating division and every tile box is
//! derived from its own index:
//!
//! ```text
//! tw = W / cols          th = H / rows
//! left = c * tw          top = r * th
//! right = (c + 1) * tw   bottom = (r + 1) * th
//! ```
//!
//! When `W` is not a multiple of `cols` (or `H` of `rows`) the trailing
//! `W - cols * tw` columns of pixels are not covered by any tile. That is
//! [`RemainderPolicy::Drop`], the default. [`RemainderPolicy::Distribute`]
//! stretches the last column and the last row to the image edge instead.

use std::fmt;

use clap::ValueEnum;

use crate::error::{TileError, ValidationError};

/// What to do with pixels left over by truncating division.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RemainderPolicy {
    /// Leave the remainder out of every tile.
    #[default]
    Drop,
    /// Extend the last column and last row to the image edge.
    Distribute,
}

impl fmt::Display for RemainderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemainderPolicy::Drop => f.write_str("drop"),
            RemainderPolicy::Distribute => f.write_str("distribute"),
        }
    }
}

// =============================================================================
// Grid Spec
// =============================================================================

/// Number of rows and columns to split an image into.
///
/// Both dimensions are at least 1. The only way to build one is through
/// [`GridSpec::new`] or [`GridSpec::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    rows: u32,
    cols: u32,
}

impl GridSpec {
    /// Create a grid spec, rejecting zero rows or columns.
    pub fn new(rows: u32, cols: u32) -> Result<Self, ValidationError> {
        if rows == 0 {
            return Err(ValidationError::InvalidGridSpec {
                field: "rows",
                value: rows.to_string(),
            });
        }
        if cols == 0 {
            return Err(ValidationError::InvalidGridSpec {
                field: "cols",
                value: cols.to_string(),
            });
        }
        Ok(Self { rows, cols })
    }

    /// Parse rows and columns from raw form values.
    ///
    /// Accepts optional surrounding whitespace. Anything that is not a
    /// positive integer is rejected, including `0`, `-1`, `2.5` and `abc`.
    pub fn parse(rows: &str, cols: &str) -> Result<Self, ValidationError> {
        let rows = parse_dimension("rows", rows)?;
        let cols = parse_dimension("cols", cols)?;
        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Total number of tiles this grid produces.
    pub fn tile_count(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.cols)
    }
}

impl fmt::Display for GridSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

fn parse_dimension(field: &'static str, raw: &str) -> Result<u32, ValidationError> {
    let invalid = || ValidationError::InvalidGridSpec {
        field,
        value: raw.to_string(),
    };

    let value: i64 = raw.trim().parse().map_err(|_| invalid())?;
    if value <= 0 {
        return Err(invalid());
    }
    u32::try_from(value).map_err(|_| invalid())
}

// =============================================================================
// Tile Bounds
// =============================================================================

/// Pixel box of one tile, half-open on the right and bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBounds {
    /// 0-indexed row
    pub row: u32,
    /// 0-indexed column
    pub col: u32,
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl TileBounds {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Archive entry name, 1-indexed: `split_<row>_<col>.png`.
    pub fn file_name(&self) -> String {
        format!("split_{}_{}.png", self.row + 1, self.col + 1)
    }
}

// =============================================================================
// Grid Layout
// =============================================================================

/// Tile boxes for one image and one grid spec.
#[derive(Debug, Clone)]
pub struct GridLayout {
    spec: GridSpec,
    image_width: u32,
    image_height: u32,
    tile_width: u32,
    tile_height: u32,
    policy: RemainderPolicy,
}

impl GridLayout {
    /// Compute the layout for an image of `width` x `height` pixels.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::GridTooFine`] when the truncated tile width or
    /// height is zero. This holds for both remainder policies, since every
    /// tile but the last would be empty either way.
    pub fn compute(
        width: u32,
        height: u32,
        spec: GridSpec,
        policy: RemainderPolicy,
    ) -> Result<Self, TileError> {
        let tile_width = width / spec.cols();
        let tile_height = height / spec.rows();

        if tile_width == 0 || tile_height == 0 {
            return Err(TileError::GridTooFine {
                width,
                height,
                rows: spec.rows(),
                cols: spec.cols(),
            });
        }

        Ok(Self {
            spec,
            image_width: width,
            image_height: height,
            tile_width,
            tile_height,
            policy,
        })
    }

    pub fn spec(&self) -> GridSpec {
        self.spec
    }

    /// Truncated tile width shared by all non-stretched tiles.
    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    /// Truncated tile height shared by all non-stretched tiles.
    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    /// Width and height of the region covered by the tiles.
    pub fn covered(&self) -> (u32, u32) {
        match self.policy {
            RemainderPolicy::Drop => (
                self.tile_width * self.spec.cols(),
                self.tile_height * self.spec.rows(),
            ),
            RemainderPolicy::Distribute => (self.image_width, self.image_height),
        }
    }

    /// Bounds of the tile at 0-indexed (`row`, `col`).
    pub fn bounds(&self, row: u32, col: u32) -> TileBounds {
        let left = col * self.tile_width;
        let top = row * self.tile_height;
        let mut right = (col + 1) * self.tile_width;
        let mut bottom = (row + 1) * self.tile_height;

        if self.policy == RemainderPolicy::Distribute {
            if col + 1 == self.spec.cols() {
                right = self.image_width;
            }
            if row + 1 == self.spec.rows() {
                bottom = self.image_height;
            }
        }

        TileBounds {
            row,
            col,
            left,
            top,
            right,
            bottom,
        }
    }

    /// All tile bounds in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TileBounds> + '_ {
        (0..self.spec.rows())
            .flat_map(move |row| (0..self.spec.cols()).map(move |col| self.bounds(row, col)))
    }
}

// =============================================================================
// Tests
// =============================================================================
