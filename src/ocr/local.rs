//! Local OCR through the tesseract command-line tool.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::OcrError;
use crate::scratch::ScratchDir;

use super::{normalize_text, OcrEngine, DEFAULT_OCR_LANGUAGE};

/// Default tesseract executable, resolved through `PATH`.
pub const DEFAULT_TESSERACT_BIN: &str = "tesseract";

/// Runs `tesseract <image> stdout -l <lang>` on a scratch copy of the upload.
#[derive(Debug, Clone)]
pub struct LocalEngine {
    binary: PathBuf,
    language: String,
    scratch: ScratchDir,
}

impl LocalEngine {
    pub fn new(scratch: ScratchDir) -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_TESSERACT_BIN),
            language: DEFAULT_OCR_LANGUAGE.to_string(),
            scratch,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

#[async_trait]
impl OcrEngine for LocalEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError> {
        // tesseract picks its decoder from the file extension
        let extension = image::guess_format(image)
            .ok()
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("img");

        // Removed when `input` drops, on every path out of this function
        let input = self
            .scratch
            .write_async(image.to_vec(), extension)
            .await
            .map_err(|e| OcrError::Scratch(e.to_string()))?;

        let output = Command::new(&self.binary)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                OcrError::Engine(format!("failed to run {}: {}", self.binary.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        let text = normalize_text(&String::from_utf8_lossy(&output.stdout));
        debug!(chars = text.len(), "tesseract finished");
        Ok(text)
    }
}
