//! Request-scoped scratch storage.
//!
//! Uploads that must touch disk (the local OCR engine reads from a path) are
//! written to a [`ScratchFile`] under the configured scratch directory. The
//! file is unlinked when the guard is dropped, so every exit path, including
//! errors, early returns and cancelled futures, cleans up after itself.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use tracing::debug;

/// Default scratch directory, relative to the working directory.
pub const DEFAULT_SCRATCH_DIR: &str = "uploads";

/// Directory holding transient upload files.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the directory if it does not exist yet.
    pub fn ensure(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write `data` to a fresh scratch file with the given extension.
    ///
    /// The file name is random; the client filename never reaches disk.
    pub fn write(&self, data: &[u8], extension: &str) -> io::Result<ScratchFile> {
        let suffix = format!(".{}", extension);
        let mut file = Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(&self.root)?;

        file.write_all(data)?;
        file.flush()?;

        debug!(path = %file.path().display(), bytes = data.len(), "Wrote scratch file");
        Ok(ScratchFile { file })
    }
}

impl ScratchDir {
    /// Like [`ScratchDir::write`], but runs the file I/O on the blocking pool.
    pub async fn write_async(&self, data: Vec<u8>, extension: &str) -> io::Result<ScratchFile> {
        let dir = self.clone();
        let extension = extension.to_string();

        tokio::task::spawn_blocking(move || dir.write(&data, &extension))
            .await
            .map_err(io::Error::other)?
    }
}

impl Default for ScratchDir {
    fn default() -> Self {
        Self::new(DEFAULT_SCRATCH_DIR)
    }
}

/// A scratch file that is deleted on drop.
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
