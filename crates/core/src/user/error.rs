//! User error types.

use brightpath_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::attachment::AttachmentError;

/// User operation errors.
#[derive(Debug, Error)]
pub enum UserError {
    /// User not found.
    #[error("user not found: {0}")]
    NotFound(Uuid),

    /// Username already registered.
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// Invalid input.
    #[error("{0}")]
    Validation(String),

    /// User has no profile image to remove or sign.
    #[error("user {0} has no profile image")]
    NoProfileImage(Uuid),

    /// Storage refused to delete the image; the reference is kept.
    #[error("profile image of user {0} could not be removed from storage")]
    ImageNotRemoved(Uuid),

    /// Upload, signing or download failed.
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl UserError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) | UserError::NoProfileImage(_) => {
                Self::NotFound(err.to_string())
            }
            UserError::UsernameTaken(_) => Self::Conflict(err.to_string()),
            UserError::Validation(msg) => Self::Validation(msg),
            UserError::ImageNotRemoved(_) => Self::Storage(err.to_string()),
            UserError::Attachment(e) => e.into(),
            UserError::Repository(msg) => Self::Database(msg),
        }
    }
}
