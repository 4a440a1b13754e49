//! Enrollment error types.

use brightpath_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Enrollment operation errors.
#[derive(Debug, Error)]
pub enum EnrollmentError {
    /// User not found.
    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    /// Course not found.
    #[error("course not found: {0}")]
    CourseNotFound(Uuid),

    /// User already enrolled in the course.
    #[error("user {user_id} is already enrolled in course {course_id}")]
    AlreadyEnrolled {
        /// User ID.
        user_id: Uuid,
        /// Course ID.
        course_id: Uuid,
    },

    /// User is not enrolled in the course.
    #[error("user {user_id} is not enrolled in course {course_id}")]
    NotEnrolled {
        /// User ID.
        user_id: Uuid,
        /// Course ID.
        course_id: Uuid,
    },

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl EnrollmentError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<EnrollmentError> for AppError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::UserNotFound(_)
            | EnrollmentError::CourseNotFound(_)
            | EnrollmentError::NotEnrolled { .. } => Self::NotFound(err.to_string()),
            EnrollmentError::AlreadyEnrolled { .. } => Self::Conflict(err.to_string()),
            EnrollmentError::Repository(msg) => Self::Database(msg),
        }
    }
}
