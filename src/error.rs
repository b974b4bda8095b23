use std::time::Duration;

use thiserror::Error;

/// Errors detected while validating an incoming request, before any image work
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// The multipart body has no `file` part
    #[error("No file uploaded.")]
    MissingFile,

    /// The `file` part was sent without a filename
    #[error("No file selected.")]
    EmptyFilename,

    /// File extension is not on the allow-list
    #[error("Invalid file type '{extension}'. Only images allowed ({allowed}).")]
    DisallowedExtension { extension: String, allowed: String },

    /// Rows or columns are missing, non-numeric or not positive
    #[error("Invalid {field} value '{value}'. Rows and columns must be positive integers.")]
    InvalidGridSpec { field: &'static str, value: String },

    /// A required form field is absent
    #[error("Missing form field: {0}")]
    MissingField(&'static str),

    /// Request body exceeds the configured upload ceiling
    #[error("Upload too large: the limit is {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Malformed multipart body
    #[error("Could not read upload: {0}")]
    Multipart(String),
}

/// Errors raised while partitioning an image into tiles
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// Input bytes are not a supported raster image
    #[error("Could not decode image: {message}")]
    Decode { message: String },

    /// A tile could not be re-encoded
    #[error("Could not encode tile {name}: {message}")]
    Encode { name: String, message: String },

    /// The grid is finer than the image resolution, so tiles would be empty
    #[error(
        "A {rows}x{cols} grid is too fine for a {width}x{height} image: tiles would be empty"
    )]
    GridTooFine {
        width: u32,
        height: u32,
        rows: u32,
        cols: u32,
    },

    /// The grid would produce more tiles than the configured ceiling
    #[error("A {rows}x{cols} grid yields {requested} tiles, the limit is {max}")]
    TooManyTiles {
        rows: u32,
        cols: u32,
        requested: u64,
        max: usize,
    },

    /// The blocking partition task did not complete
    #[error("Partition task failed: {0}")]
    Task(String),
}

/// Errors raised while writing the tile archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Zip container error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Write failure on the in-memory buffer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by an OCR engine
#[derive(Debug, Clone, Error)]
pub enum OcrError {
    /// Could not reach the OCR service
    #[error("OCR service unreachable: {0}")]
    Network(String),

    /// The engine did not answer within the configured bound
    #[error("OCR timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The OCR service answered with something we cannot parse
    #[error("Malformed OCR response: {0}")]
    MalformedResponse(String),

    /// The OCR service reported a processing error
    #[error("OCR failed: {0}")]
    Api(String),

    /// The local OCR engine failed to run or exited with an error
    #[error("OCR engine error: {0}")]
    Engine(String),

    /// Scratch storage for the engine could not be prepared
    #[error("Scratch storage error: {0}")]
    Scratch(String),
}

/// Any failure while handling a request, converted to a response at the
/// handler boundary
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Tile(#[from] TileError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Ocr(#[from] OcrError),
}
