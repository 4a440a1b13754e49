//! Course error types.

use brightpath_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::attachment::AttachmentError;

/// Course operation errors.
#[derive(Debug, Error)]
pub enum CourseError {
    /// Course not found.
    #[error("course not found: {0}")]
    NotFound(Uuid),

    /// Invalid input.
    #[error("{0}")]
    Validation(String),

    /// Course has no cover image.
    #[error("course {0} has no image")]
    NoImage(Uuid),

    /// Course has no resource.
    #[error("course {0} has no resource")]
    NoResource(Uuid),

    /// Storage refused to delete the image; the reference is kept.
    #[error("image of course {0} could not be removed from storage")]
    ImageNotRemoved(Uuid),

    /// Storage refused to delete the resource; the reference is kept.
    #[error("resource of course {0} could not be removed from storage")]
    ResourceNotRemoved(Uuid),

    /// Upload, signing or download failed.
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl CourseError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<CourseError> for AppError {
    fn from(err: CourseError) -> Self {
        match err {
            CourseError::NotFound(_) | CourseError::NoImage(_) | CourseError::NoResource(_) => {
                Self::NotFound(err.to_string())
            }
            CourseError::Validation(msg) => Self::Validation(msg),
            CourseError::ImageNotRemoved(_) | CourseError::ResourceNotRemoved(_) => {
                Self::Storage(err.to_string())
            }
            CourseError::Attachment(e) => e.into(),
            CourseError::Repository(msg) => Self::Database(msg),
        }
    }
}
