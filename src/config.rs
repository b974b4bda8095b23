//! Configuration management for Image Splitter.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `SPLITTER_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use image_splitter::config::Config;
//!
//! // Parse from command line and environment
//! let config = Config::parse();
//!
//! println!("Listening on {}", config.bind_address());
//! ```
//!
//! # Environment Variables
//!
//! - `SPLITTER_HOST` - Server bind address (default: 0.0.0.0)
//! - `SPLITTER_PORT` - Server port (default: 5000)
//! - `SPLITTER_MAX_UPLOAD_BYTES` - Upload ceiling (default: 16 MiB)
//! - `SPLITTER_ALLOWED_EXTENSIONS` - Comma-separated allow-list (default: png,jpg,jpeg,gif,bmp)
//! - `SPLITTER_SCRATCH_DIR` - Directory for transient uploads (default: uploads)
//! - `SPLITTER_REMAINDER` - `drop` or `distribute` (default: drop)
//! - `SPLITTER_MAX_TILES` - Maximum rows x cols per request (default: 4096)
//! - `SPLITTER_OCR_BACKEND` - `local` or `remote` (default: local)
//! - `SPLITTER_OCR_LANGUAGE` - OCR language code (default: eng)
//! - `SPLITTER_TESSERACT_BIN` - tesseract executable (default: tesseract)
//! - `SPLITTER_OCR_API_URL` - Remote OCR endpoint
//! - `SPLITTER_OCR_API_KEY` - Remote OCR API key (required for the remote backend)
//! - `SPLITTER_OCR_TIMEOUT_SECS` - Bound on each OCR call (default: 60)
//! - `SPLITTER_CORS_ORIGINS` - Allowed CORS origins (default: any)

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::ocr::{
    OcrBackend, DEFAULT_OCR_API_URL, DEFAULT_OCR_LANGUAGE, DEFAULT_OCR_TIMEOUT,
    DEFAULT_TESSERACT_BIN,
};
use crate::scratch::DEFAULT_SCRATCH_DIR;
use crate::tile::{RemainderPolicy, DEFAULT_MAX_TILES};
use crate::upload::{UploadPolicy, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_UPLOAD_BYTES};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 5000;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Image Splitter - split images into grid tiles and extract text with OCR.
#[derive(Parser, Clone)]
#[command(name = "image-splitter")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "SPLITTER_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "SPLITTER_PORT")]
    pub port: u16,

    // =========================================================================
    // Upload Configuration
    // =========================================================================
    /// Maximum request body size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "SPLITTER_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,

    /// Accepted file extensions (comma-separated, case-insensitive).
    #[arg(
        long,
        default_values_t = DEFAULT_ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()),
        env = "SPLITTER_ALLOWED_EXTENSIONS",
        value_delimiter = ','
    )]
    pub allowed_extensions: Vec<String>,

    /// Directory for transient upload files. Created at startup.
    #[arg(long, default_value = DEFAULT_SCRATCH_DIR, env = "SPLITTER_SCRATCH_DIR")]
    pub scratch_dir: PathBuf,

    // =========================================================================
    // Split Configuration
    // =========================================================================
    /// What to do with pixels left over when the image size is not a
    /// multiple of the grid.
    ///
    /// `drop` leaves them out (compatible with earlier releases);
    /// `distribute` extends the last row and column to the image edge.
    #[arg(long, value_enum, default_value_t = RemainderPolicy::Drop, env = "SPLITTER_REMAINDER")]
    pub remainder: RemainderPolicy,

    /// Maximum number of tiles (rows x cols) per request.
    #[arg(long, default_value_t = DEFAULT_MAX_TILES, env = "SPLITTER_MAX_TILES")]
    pub max_tiles: usize,

    // =========================================================================
    // OCR Configuration
    // =========================================================================
    /// OCR backend to use.
    #[arg(long, value_enum, default_value_t = OcrBackend::Local, env = "SPLITTER_OCR_BACKEND")]
    pub ocr_backend: OcrBackend,

    /// OCR language code (ISO 639-2, e.g. `eng`, `fra`).
    #[arg(long, default_value = DEFAULT_OCR_LANGUAGE, env = "SPLITTER_OCR_LANGUAGE")]
    pub ocr_language: String,

    /// tesseract executable for the local backend.
    #[arg(long, default_value = DEFAULT_TESSERACT_BIN, env = "SPLITTER_TESSERACT_BIN")]
    pub tesseract_bin: PathBuf,

    /// Endpoint of the remote OCR API.
    #[arg(long, default_value = DEFAULT_OCR_API_URL, env = "SPLITTER_OCR_API_URL")]
    pub ocr_api_url: String,

    /// API key for the remote OCR backend.
    ///
    /// Prefer the environment variable so the key stays out of shell history.
    #[arg(long, env = "SPLITTER_OCR_API_KEY", hide_env_values = true)]
    pub ocr_api_key: Option<String>,

    /// Upper bound on a single OCR call, in seconds.
    #[arg(long, default_value_t = DEFAULT_OCR_TIMEOUT.as_secs(), env = "SPLITTER_OCR_TIMEOUT_SECS")]
    pub ocr_timeout_secs: u64,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "SPLITTER_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.upload_policy().allowed_extensions().is_empty() {
            return Err("allowed_extensions must list at least one extension".to_string());
        }

        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }

        if self.max_tiles == 0 {
            return Err("max_tiles must be greater than 0".to_string());
        }

        if self.ocr_timeout_secs == 0 {
            return Err("ocr_timeout_secs must be greater than 0".to_string());
        }

        if self.ocr_language.trim().is_empty() {
            return Err("ocr_language must not be empty".to_string());
        }

        if self.ocr_backend == OcrBackend::Remote {
            let has_key = self
                .ocr_api_key
                .as_deref()
                .is_some_and(|key| !key.trim().is_empty());
            if !has_key {
                return Err(
                    "The remote OCR backend needs an API key. \
                     Set --ocr-api-key or SPLITTER_OCR_API_KEY, or use --ocr-backend=local"
                        .to_string(),
                );
            }
            if self.ocr_api_url.is_empty() {
                return Err("ocr_api_url must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upload allow-list and size ceiling.
    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::new(self.allowed_extensions.iter().cloned(), self.max_upload_bytes)
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }

    /// Get the API key, or an empty string if not set (call validate() first).
    pub fn ocr_api_key_or_empty(&self) -> &str {
        self.ocr_api_key.as_deref().unwrap_or("")
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("allowed_extensions", &self.allowed_extensions)
            .field("scratch_dir", &self.scratch_dir)
            .field("remainder", &self.remainder)
            .field("max_tiles", &self.max_tiles)
            .field("ocr_backend", &self.ocr_backend)
            .field("ocr_language", &self.ocr_language)
            .field("tesseract_bin", &self.tesseract_bin)
            .field("ocr_api_url", &self.ocr_api_url)
            .field(
                "ocr_api_key",
                &self.ocr_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("ocr_timeout_secs", &self.ocr_timeout_secs)
            .field("cors_origins", &self.cors_origins)
            .field("verbose", &self.verbose)
            .field("no_tracing", &self.no_tracing)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
