//! Text extraction backends.
//!
//! OCR is an opaque capability: bytes in, text out. [`OcrEngine`] is the seam
//! and two backends implement it:
//!
//! - [`LocalEngine`] runs the `tesseract` binary against a scratch copy of
//!   the upload
//! - [`RemoteApi`] posts the image to an OCR.space-compatible HTTP API
//!
//! [`OcrService`] wraps whichever engine is configured and bounds each call
//! with a timeout.

mod local;
mod remote;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::ValueEnum;
use tracing::{debug, warn};

use crate::error::OcrError;

pub use local::{LocalEngine, DEFAULT_TESSERACT_BIN};
pub use remote::{RemoteApi, DEFAULT_OCR_API_URL};

/// Default language passed to both backends (ISO 639-2).
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// Default bound on a single OCR call.
pub const DEFAULT_OCR_TIMEOUT: Duration = Duration::from_secs(60);

/// OCR engine trait.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Extract text from encoded image bytes.
    ///
    /// An image without text yields `Ok` with an empty string.
    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// Which OCR backend to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OcrBackend {
    /// Local tesseract binary
    #[default]
    Local,
    /// Hosted OCR HTTP API
    Remote,
}

impl fmt::Display for OcrBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OcrBackend::Local => f.write_str("local"),
            OcrBackend::Remote => f.write_str("remote"),
        }
    }
}

/// Trim every line and drop blank ones.
pub(crate) fn normalize_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// OCR Service
// =============================================================================

/// Shared handle to the configured OCR engine.
#[derive(Clone)]
pub struct OcrService {
    engine: Arc<dyn OcrEngine>,
    timeout: Duration,
}

impl OcrService {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            engine,
            timeout: DEFAULT_OCR_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the engine, giving up after the configured timeout.
    ///
    /// On timeout the engine future is dropped, which kills a local child
    /// process and aborts a remote request.
    pub async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError> {
        debug!(engine = self.engine.name(), bytes = image.len(), "Running OCR");

        match tokio::time::timeout(self.timeout, self.engine.extract_text(image)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    engine = self.engine.name(),
                    timeout_secs = self.timeout.as_secs(),
                    "OCR call timed out"
                );
                Err(OcrError::Timeout(self.timeout))
            }
        }
    }
}

impl fmt::Debug for OcrService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrService")
            .field("engine", &self.engine.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}
