//! Repository implementations.

mod course;
mod enrollment;
mod user;

pub use course::CourseRepository;
pub use enrollment::EnrollmentRepository;
pub use user::UserRepository;

use sea_orm::{DbErr, SqlErr};
use tracing::warn;

/// Whether the error is a unique-constraint violation.
fn is_unique_violation(err: &DbErr) -> bool {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            warn!(detail = %detail, "Unique constraint rejected write");
            true
        }
        _ => false,
    }
}
