//! In-memory zip assembly for split tiles.

use std::io::{Cursor, Write};

use bytes::Bytes;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;

use super::service::Tile;

/// Download name of the tile archive.
pub const ARCHIVE_FILE_NAME: &str = "split_images.zip";

/// Content type of the tile archive.
pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// Write `tiles` into a Deflate-compressed zip, preserving their order.
pub fn build_archive(tiles: &[Tile]) -> Result<Bytes, ArchiveError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for tile in tiles {
        zip.start_file(tile.name.as_str(), options)?;
        zip.write_all(&tile.data)?;
    }

    let cursor = zip.finish()?;
    Ok(Bytes::from(cursor.into_inner()))
}
