//! Enrollment domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::course::Course;

/// A user's enrollment in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enrollment {
    /// Enrollment ID.
    pub id: Uuid,
    /// Enrolled user.
    pub user_id: Uuid,
    /// Course enrolled in.
    pub course_id: Uuid,
    /// When the enrollment was made.
    pub enrolled_at: DateTime<Utc>,
}

/// Courses a user is enrolled in.
#[derive(Debug, Clone, Serialize)]
pub struct UserCourses {
    /// User ID.
    pub user_id: Uuid,
    /// Enrolled courses.
    pub courses: Vec<Course>,
    /// Number of courses.
    pub count: u64,
}

/// Enrollments of one course.
#[derive(Debug, Clone, Serialize)]
pub struct CourseEnrollments {
    /// Course ID.
    pub course_id: Uuid,
    /// Enrollments.
    pub enrollments: Vec<Enrollment>,
    /// Number of enrollments.
    pub count: u64,
}
