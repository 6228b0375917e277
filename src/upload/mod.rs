//! Upload validation and temporary storage.
//!
//! An upload is accepted only with a `.jpg`, `.jpeg` or `.png` extension and
//! a size under the configured ceiling. Accepted bytes are written under the
//! upload directory with a unique name, and the returned `StoredUpload`
//! deletes that file when it goes out of scope.

mod multipart;

pub use multipart::{read_image_field, IMAGE_FIELD};

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default upload size ceiling (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Errors raised while receiving or storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file provided")]
    NoFileProvided,

    #[error("Unsupported image format: {filename:?}")]
    UnsupportedFormat { filename: String },

    #[error("Upload exceeds {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("More than one file sent")]
    MultipleFiles,

    #[error("Malformed multipart body: {0}")]
    Malformed(String),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),
}

/// Accepted image extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageExtension {
    Jpg,
    Jpeg,
    Png,
}

impl ImageExtension {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageExtension::Jpg => "jpg",
            ImageExtension::Jpeg => "jpeg",
            ImageExtension::Png => "png",
        }
    }

    /// Parse a bare extension (no dot), case-insensitively.
    pub fn parse(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" => Some(ImageExtension::Jpg),
            "jpeg" => Some(ImageExtension::Jpeg),
            "png" => Some(ImageExtension::Png),
            _ => None,
        }
    }

    /// Extension of a client-supplied filename.
    ///
    /// Dot-files such as `.png` have no extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::parse)
    }
}

impl fmt::Display for ImageExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.as_str())
    }
}

/// Build the temporary path for an upload.
///
/// `{upload_dir}/{unix_millis}-{nonce}.{ext}`. The timestamp keeps names
/// sortable; the nonce keeps uploads in the same millisecond apart.
pub fn temp_path_for(
    upload_dir: &Path,
    extension: ImageExtension,
    received_at: DateTime<Utc>,
    nonce: Uuid,
) -> PathBuf {
    upload_dir.join(format!(
        "{}-{}.{}",
        received_at.timestamp_millis(),
        nonce.simple(),
        extension.as_str()
    ))
}

/// Admission rules and destination for uploads.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    upload_dir: PathBuf,
    max_bytes: u64,
}

impl UploadPolicy {
    pub fn new(upload_dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_bytes,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Create the upload directory if needed.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.upload_dir).await
    }

    pub fn check_extension(&self, filename: &str) -> Result<ImageExtension, UploadError> {
        ImageExtension::from_filename(filename).ok_or_else(|| UploadError::UnsupportedFormat {
            filename: filename.to_string(),
        })
    }

    pub fn check_size(&self, size: u64) -> Result<(), UploadError> {
        if size > self.max_bytes {
            return Err(UploadError::PayloadTooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Validate and write an upload to a fresh temporary file.
    ///
    /// Nothing touches the disk unless both checks pass. If the write fails
    /// the partial file is removed before the error is returned.
    pub async fn store(&self, filename: &str, bytes: &[u8]) -> Result<StoredUpload, UploadError> {
        let extension = self.check_extension(filename)?;
        self.check_size(bytes.len() as u64)?;

        let path = temp_path_for(&self.upload_dir, extension, Utc::now(), Uuid::new_v4());
        write_new(path, extension, bytes).await
    }
}

/// Write `bytes` to `path`, which must not exist yet.
///
/// The guard is only taken once this call created the file, so a name
/// collision never deletes someone else's upload.
async fn write_new(
    path: PathBuf,
    extension: ImageExtension,
    bytes: &[u8],
) -> Result<StoredUpload, UploadError> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await?;
    let upload = StoredUpload::new(path, extension, bytes.len() as u64);

    file.write_all(bytes).await?;
    file.flush().await?;

    debug!(
        path = %upload.path().display(),
        size = upload.size_bytes(),
        "Stored upload"
    );
    Ok(upload)
}

/// A temporary upload on disk, removed exactly once.
///
/// Removal happens through `remove()` or, on any other exit path (early
/// return, panic, dropped request future), through `Drop`. Failures are
/// logged and never surfaced.
#[derive(Debug)]
pub struct StoredUpload {
    path: PathBuf,
    extension: ImageExtension,
    size_bytes: u64,
    removed: bool,
}

impl StoredUpload {
    fn new(path: PathBuf, extension: ImageExtension, size_bytes: u64) -> Self {
        Self {
            path,
            extension,
            size_bytes,
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extension(&self) -> ImageExtension {
        self.extension
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Delete the file now.
    pub async fn remove(mut self) {
        self.removed = true;
        let result = tokio::fs::remove_file(&self.path).await;
        log_removal(&self.path, result);
    }
}

impl Drop for StoredUpload {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        log_removal(&self.path, std::fs::remove_file(&self.path));
    }
}

fn log_removal(path: &Path, result: std::io::Result<()>) {
    match result {
        Ok(()) => debug!(path = %path.display(), "Removed temporary upload"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Temporary upload already gone")
        }
        Err(e) => warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove temporary upload"
        ),
    }
}
