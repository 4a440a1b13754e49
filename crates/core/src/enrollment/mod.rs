//! Enrollment of users in courses.

mod error;
mod service;
mod types;

pub use error::EnrollmentError;
pub use service::{EnrollmentRepository, EnrollmentService};
pub use types::{CourseEnrollments, Enrollment, UserCourses};
