//! PNG tile encoder.
//!
//! Decodes the uploaded image once and crops/encodes each tile from it.
//!
//! # Design Decisions
//!
//! - **Format guessed from content**: the upload's extension is only used for
//!   the allow-list. Decoding sniffs the magic bytes, so a `.jpg` that is
//!   really a PNG still decodes.
//!
//! - **Lossless output**: tiles are always PNG regardless of the source
//!   format, so a 1x1 grid round-trips pixel for pixel.

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::error::TileError;

use super::grid::TileBounds;

// =============================================================================
// PNG Encoder
// =============================================================================

/// Decodes source images and encodes cropped tiles as PNG.
///
/// # Example
///
/// ```ignore
/// use image_splitter::tile::{PngTileEncoder, GridLayout, GridSpec, RemainderPolicy};
///
/// let encoder = PngTileEncoder::new();
/// let image = encoder.decode(&upload_bytes)?;
/// let layout = GridLayout::compute(image.width(), image.height(), spec, RemainderPolicy::Drop)?;
///
/// for bounds in layout.tiles() {
///     let png = encoder.encode_tile(&image, &bounds)?;
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PngTileEncoder {}

impl PngTileEncoder {
    /// Create a new PNG tile encoder.
    pub fn new() -> Self {
        Self {}
    }

    /// Decode an uploaded image in any enabled raster format.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::Decode`] if the format cannot be recognised or
    /// the data is corrupt.
    pub fn decode(&self, source: &[u8]) -> Result<DynamicImage, TileError> {
        let reader = ImageReader::new(Cursor::new(source))
            .with_guessed_format()
            .map_err(|e| TileError::Decode {
                message: e.to_string(),
            })?;

        if reader.format().is_none() {
            return Err(TileError::Decode {
                message: "unrecognised image format".to_string(),
            });
        }

        reader.decode().map_err(|e| TileError::Decode {
            message: e.to_string(),
        })
    }

    /// Crop `bounds` out of `image` and encode it as PNG.
    pub fn encode_tile(&self, image: &DynamicImage, bounds: &TileBounds) -> Result<Bytes, TileError> {
        let tile = image.crop_imm(bounds.left, bounds.top, bounds.width(), bounds.height());

        let mut output = Cursor::new(Vec::new());
        tile.write_to(&mut output, ImageFormat::Png)
            .map_err(|e| TileError::Encode {
                name: bounds.file_name(),
                message: e.to_string(),
            })?;

        Ok(Bytes::from(output.into_inner()))
    }

    /// Get image dimensions without fully decoding.
    pub fn dimensions(&self, source: &[u8]) -> Result<(u32, u32), TileError> {
        ImageReader::new(Cursor::new(source))
            .with_guessed_format()
            .map_err(|e| TileError::Decode {
                message: e.to_string(),
            })?
            .into_dimensions()
            .map_err(|e| TileError::Decode {
                message: e.to_string(),
            })
    }
}

// =============================================================================
// Tests
// =============================================================================
