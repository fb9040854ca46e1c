//! Image upload collaborator.
//!
//! The engine never talks to the network itself: hosts provide an
//! [`ImageUploader`]. What lives here is the client-side policy check that
//! runs before any upload begins, and the preview-swap state for an image
//! slot (local object URL first, durable remote URL once the upload
//! resolves, previous value kept on failure).

use crate::error::{FolioError, FolioResult};
use tracing::warn;

/// Options forwarded to the upload backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub compress: bool,
    /// Bypass the processing pipeline and store the file as-is.
    pub direct: bool,
}

/// A file selected for upload. Only name, MIME type, and size take part in
/// the client-side checks.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Upload backend contract. `progress` receives 0–100.
pub trait ImageUploader {
    fn upload(
        &mut self,
        file: &UploadFile,
        options: &UploadOptions,
        progress: &mut dyn FnMut(u8),
    ) -> FolioResult<String>;
}

pub const MB: u64 = 1024 * 1024;

/// Accepted MIME types and size ceiling, enforced client-side before the
/// upload begins. Ceilings differ by call site (2 MB avatars up to 25 MB
/// gallery originals).
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPolicy {
    pub allowed_types: Vec<String>,
    pub max_bytes: u64,
}

impl UploadPolicy {
    pub fn new(allowed_types: &[&str], max_bytes: u64) -> Self {
        Self {
            allowed_types: allowed_types.iter().map(|t| t.to_string()).collect(),
            max_bytes,
        }
    }

    /// Standard image uploads: jpeg/png/webp, 10 MB.
    pub fn images() -> Self {
        Self::new(&["image/jpeg", "image/png", "image/webp"], 10 * MB)
    }

    /// Small avatar images, 2 MB.
    pub fn avatars() -> Self {
        Self::new(&["image/jpeg", "image/png", "image/webp"], 2 * MB)
    }

    /// Gallery originals: animated gif allowed, 25 MB.
    pub fn gallery() -> Self {
        Self::new(
            &["image/jpeg", "image/png", "image/webp", "image/gif"],
            25 * MB,
        )
    }

    pub fn check(&self, file: &UploadFile) -> FolioResult<()> {
        if !self.allowed_types.iter().any(|t| t == &file.mime_type) {
            return Err(FolioError::Upload {
                reason: format!(
                    "type '{}' not allowed (accepted: {})",
                    file.mime_type,
                    self.allowed_types.join(", ")
                ),
            });
        }
        if file.size() > self.max_bytes {
            return Err(FolioError::Upload {
                reason: format!(
                    "file is {} bytes, limit is {} bytes",
                    file.size(),
                    self.max_bytes
                ),
            });
        }
        Ok(())
    }
}

/// Runs the policy check, then the upload. Policy violations never reach the
/// backend.
pub fn upload_image(
    uploader: &mut dyn ImageUploader,
    policy: &UploadPolicy,
    file: &UploadFile,
    options: &UploadOptions,
    progress: &mut dyn FnMut(u8),
) -> FolioResult<String> {
    policy.check(file)?;
    uploader.upload(file, options, progress)
}

/// Preview-swap state for one image slot.
///
/// While an upload is in flight the slot shows the transient local preview
/// URL; on success it swaps to the remote URL, on failure it reverts to the
/// previous durable value. Either way the transient URL is handed back to
/// the caller exactly once for release (object URLs leak otherwise).
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImage {
    previous: Option<String>,
    preview: Option<String>,
    remote: Option<String>,
}

impl PendingImage {
    pub fn new(previous: Option<String>, preview_url: String) -> Self {
        Self {
            previous,
            preview: Some(preview_url),
            remote: None,
        }
    }

    /// The URL the slot should currently display.
    pub fn current(&self) -> Option<&str> {
        self.remote
            .as_deref()
            .or(self.preview.as_deref())
            .or(self.previous.as_deref())
    }

    pub fn is_pending(&self) -> bool {
        self.preview.is_some() && self.remote.is_none()
    }

    /// Swaps in the durable remote URL. Returns the transient preview URL,
    /// which the caller must release.
    pub fn resolve(&mut self, remote_url: String) -> Option<String> {
        self.remote = Some(remote_url);
        self.preview.take()
    }

    /// Reverts to the previous value after a failed upload. Returns the
    /// transient preview URL for release; the error itself is surfaced by
    /// the caller, the slot keeps working.
    pub fn fail(&mut self) -> Option<String> {
        warn!("image upload failed, keeping previous value");
        self.preview.take()
    }
}
