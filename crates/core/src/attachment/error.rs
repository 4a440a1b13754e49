//! Attachment error types.

use brightpath_shared::AppError;
use thiserror::Error;

use crate::storage::StorageError;

/// Attachment lifecycle errors.
///
/// The first four variants are validation failures raised before any call to
/// the storage backend.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// Upload carried no content.
    #[error("file is empty")]
    EmptyFile,

    /// File too large.
    #[error("file too large: {size} bytes exceeds maximum {max} bytes")]
    FileTooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// Original filename missing or blank.
    #[error("filename is missing or blank")]
    InvalidFilename,

    /// Extension not accepted for this asset kind.
    #[error("unsupported file type '{extension}', allowed: {}", .allowed.join(", "))]
    UnsupportedType {
        /// Lowercase extension without the dot; empty when the name has none.
        extension: String,
        /// Accepted extensions.
        allowed: Vec<String>,
    },

    /// Signed URL lifetime must be at least one minute.
    #[error("signed URL expiry must be at least one minute")]
    InvalidExpiry,

    /// Backend rejected the write.
    #[error("failed to upload to '{namespace}': {source}")]
    StorageUpload {
        /// Target namespace.
        namespace: String,
        /// Backend failure.
        #[source]
        source: StorageError,
    },

    /// Backend could not issue a signed URL.
    #[error("failed to sign URL in '{namespace}': {source}")]
    SignedUrl {
        /// Target namespace.
        namespace: String,
        /// Backend failure.
        #[source]
        source: StorageError,
    },

    /// Fetching a stored asset by URL failed.
    #[error("failed to download {url}: {reason}")]
    Download {
        /// Requested URL.
        url: String,
        /// Network error or HTTP status.
        reason: String,
    },

    /// Store could not be built.
    #[error("attachment store configuration error: {0}")]
    Configuration(String),
}

impl AttachmentError {
    /// Create a file too large error.
    #[must_use]
    pub fn file_too_large(size: u64, max: u64) -> Self {
        Self::FileTooLarge { size, max }
    }

    /// Create a download error.
    #[must_use]
    pub fn download(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Whether the upload was rejected before reaching storage.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyFile
                | Self::FileTooLarge { .. }
                | Self::InvalidFilename
                | Self::UnsupportedType { .. }
                | Self::InvalidExpiry
        )
    }
}

impl From<AttachmentError> for AppError {
    fn from(err: AttachmentError) -> Self {
        if err.is_validation() {
            return Self::Validation(err.to_string());
        }
        match err {
            AttachmentError::Configuration(msg) => Self::Internal(msg),
            other => Self::Storage(other.to_string()),
        }
    }
}
