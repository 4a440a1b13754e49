//! Attachment domain types.

use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of uploaded asset. Each kind owns one namespace and one policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// User avatar.
    ProfileImage,
    /// Course cover image.
    CourseImage,
    /// Course PDF resource.
    CourseResource,
}

impl AssetKind {
    /// All kinds.
    pub const ALL: [Self; 3] = [Self::ProfileImage, Self::CourseImage, Self::CourseResource];

    /// Prefix of generated object names.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::ProfileImage => "profile",
            Self::CourseImage => "course",
            Self::CourseResource => "resource",
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProfileImage => "profile_image",
            Self::CourseImage => "course_image",
            Self::CourseResource => "course_resource",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An upload as received from the client.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    /// File content.
    pub content: Bytes,
    /// Client-supplied filename; only its extension is used.
    pub original_filename: Option<String>,
    /// Client-supplied MIME type.
    pub declared_content_type: Option<String>,
}

impl AssetUpload {
    /// Create an upload without a declared content type.
    #[must_use]
    pub fn new(content: impl Into<Bytes>, original_filename: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            original_filename: Some(original_filename.into()),
            declared_content_type: None,
        }
    }

    /// Set the declared content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.declared_content_type = Some(content_type.into());
        self
    }

    /// Content length in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::try_from(self.content.len()).unwrap_or(u64::MAX)
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredAsset {
    /// Namespace the object lives in.
    pub namespace: String,
    /// `<prefix>_<uuid>.<ext>`.
    pub generated_name: String,
    /// Content type recorded with the object.
    pub content_type: String,
    /// Stored size.
    pub size_bytes: u64,
    /// Permanent URL; its last path segment is `generated_name`.
    pub url: String,
}

/// Time-limited read URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedUrl {
    /// The signed URL.
    pub url: String,
    /// When the URL stops working.
    pub expires_at: DateTime<Utc>,
}
