//! Upload intake and validation.
//!
//! Reads the multipart body of `/split` and `/ocr`, checks the uploaded
//! file against the extension allow-list and collects the remaining text
//! fields. Nothing here touches disk.

use std::collections::HashMap;

use axum::extract::multipart::{Multipart, MultipartError};
use bytes::Bytes;
use http::StatusCode;
use tracing::debug;

use crate::error::ValidationError;

/// Extensions accepted by default.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

/// Default upload ceiling (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

// =============================================================================
// Upload Policy
// =============================================================================

/// Allow-list and size ceiling for uploads.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    allowed_extensions: Vec<String>,
    max_bytes: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()),
            DEFAULT_MAX_UPLOAD_BYTES,
        )
    }
}

impl UploadPolicy {
    /// Extensions are compared case-insensitively, without a leading dot.
    pub fn new(extensions: impl IntoIterator<Item = String>, max_bytes: usize) -> Self {
        let allowed_extensions = extensions
            .into_iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        Self {
            allowed_extensions,
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Comma-separated allow-list for messages and the HTML `accept` attribute.
    pub fn allowed_list(&self) -> String {
        self.allowed_extensions.join(", ")
    }

    /// Validate a client filename and return its lowercase extension.
    ///
    /// The extension is whatever follows the last `.`; a name without a dot
    /// has none and is rejected.
    pub fn check_filename(&self, filename: &str) -> Result<String, ValidationError> {
        if filename.trim().is_empty() {
            return Err(ValidationError::EmptyFilename);
        }

        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if extension.is_empty() || !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::DisallowedExtension {
                extension,
                allowed: self.allowed_list(),
            });
        }

        Ok(extension)
    }
}

/// Reduce a client filename to a safe ASCII base name.
///
/// Directory components are removed, whitespace becomes `_`, and anything
/// outside `[A-Za-z0-9._-]` is dropped, as are leading dots.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(&['/', '\\'][..]).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    cleaned.trim_start_matches('.').to_string()
}

// =============================================================================
// Multipart Intake
// =============================================================================

/// A validated image upload.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Sanitized client filename, for logs only
    pub filename: String,

    /// Lowercase extension from the allow-list
    pub extension: String,

    /// Raw file contents
    pub data: Bytes,
}

/// Parsed multipart form: the image plus any text fields.
#[derive(Debug)]
pub struct UploadForm {
    pub image: UploadedImage,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Value of a text field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Value of a required text field.
    pub fn require(&self, name: &'static str) -> Result<&str, ValidationError> {
        self.field(name).ok_or(ValidationError::MissingField(name))
    }
}

fn multipart_error(err: MultipartError, policy: &UploadPolicy) -> ValidationError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidationError::PayloadTooLarge {
            limit: policy.max_bytes(),
        }
    } else {
        ValidationError::Multipart(err.body_text())
    }
}

/// Read the whole multipart body, validating the `file` part.
///
/// The file part is checked against the allow-list before its contents are
/// read, so a disallowed upload is rejected without buffering it.
pub async fn read_upload(
    mut multipart: Multipart,
    policy: &UploadPolicy,
) -> Result<UploadForm, ValidationError> {
    let mut image = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, policy))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == FILE_FIELD {
            let raw_name = field.file_name().unwrap_or_default().to_string();
            let extension = policy.check_filename(&raw_name)?;
            let data = field.bytes().await.map_err(|e| multipart_error(e, policy))?;
            let filename = sanitize_filename(&raw_name);

            debug!(
                filename = %filename,
                extension = %extension,
                bytes = data.len(),
                "Received upload"
            );

            image = Some(UploadedImage {
                filename,
                extension,
                data,
            });
        } else {
            let value = field.text().await.map_err(|e| multipart_error(e, policy))?;
            fields.insert(name, value);
        }
    }

    let image = image.ok_or(ValidationError::MissingFile)?;
    Ok(UploadForm { image, fields })
}

// =============================================================================
// Tests
// =============================================================================
