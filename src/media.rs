//! Media validation and temp-file lifecycle.
//!
//! An uploaded file is staged to temporary storage by the transport layer and
//! wrapped in a [`TempUpload`], which owns the file for the rest of the
//! request. Deletion is exactly-once on every exit path: `discard()` removes
//! the file eagerly and flips the released flag; `Drop` is the backstop for
//! panics and early returns. A failed removal (file already gone) is logged
//! and swallowed — cleanup is mandatory-attempt, best-effort.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Upload acceptance policy: mime allow-list and size cap.
#[derive(Debug, Clone)]
pub struct MediaPolicy {
    pub allowed_mime_types: Vec<String>,
    pub max_size_bytes: u64,
}

impl Default for MediaPolicy {
    fn default() -> Self {
        Self {
            allowed_mime_types: vec![
                "image/jpeg".to_string(),
                "image/jpg".to_string(),
                "image/png".to_string(),
                "image/bmp".to_string(),
                "image/tiff".to_string(),
            ],
            max_size_bytes: 10 * 1024 * 1024,
        }
    }
}

impl MediaPolicy {
    pub fn allows(&self, mime: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("Invalid file type: {mime}. Upload a JPG, PNG, BMP, or TIFF image")]
    UnsupportedType { mime: String },

    #[error("File too large: {size} bytes (maximum is {max} bytes)")]
    TooLarge { size: u64, max: u64 },
}

/// Owning handle over a staged upload on temporary storage.
///
/// Whoever holds the handle is responsible for deletion; ownership moves with
/// the value. The underlying file is removed at most once.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    declared_mime: String,
    size_bytes: u64,
    released: bool,
}

impl TempUpload {
    pub fn new(path: PathBuf, declared_mime: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path,
            declared_mime: declared_mime.into(),
            size_bytes,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn declared_mime(&self) -> &str {
        &self.declared_mime
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Remove the staged file now. Idempotent: later calls (and Drop) no-op.
    pub fn discard(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "staged upload removed");
            }
            Err(e) => {
                // Non-fatal: the file may already be gone.
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to remove staged upload"
                );
            }
        }
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        self.discard();
    }
}

/// Check an upload against policy.
///
/// On failure the staged file is deleted before the error is returned — the
/// caller never cleans up a rejected upload. On success the handle (and the
/// deletion duty) passes back to the caller.
pub fn validate(mut upload: TempUpload, policy: &MediaPolicy) -> Result<TempUpload, MediaError> {
    if !policy.allows(upload.declared_mime()) {
        let mime = upload.declared_mime().to_string();
        upload.discard();
        return Err(MediaError::UnsupportedType { mime });
    }

    if upload.size_bytes() > policy.max_size_bytes {
        let size = upload.size_bytes();
        let max = policy.max_size_bytes;
        upload.discard();
        return Err(MediaError::TooLarge { size, max });
    }

    Ok(upload)
}
