//! Enrollment service implementation.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::error::EnrollmentError;
use super::types::{CourseEnrollments, Enrollment, UserCourses};
use crate::course::Course;

/// Repository trait for enrollment persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait EnrollmentRepository: Send + Sync {
    /// Check if user exists.
    fn user_exists(
        &self,
        user_id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, EnrollmentError>> + Send;

    /// Check if course exists.
    fn course_exists(
        &self,
        course_id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, EnrollmentError>> + Send;

    /// Check if the user is enrolled in the course.
    fn is_enrolled(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, EnrollmentError>> + Send;

    /// Insert an enrollment. Fails with `AlreadyEnrolled` on a duplicate pair.
    fn create(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Enrollment, EnrollmentError>> + Send;

    /// Delete an enrollment. Returns `false` if there was none.
    fn delete(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, EnrollmentError>> + Send;

    /// Courses the user is enrolled in, oldest enrollment first.
    fn courses_for_user(
        &self,
        user_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Course>, EnrollmentError>> + Send;

    /// Enrollments of a course, oldest first.
    fn list_by_course(
        &self,
        course_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Enrollment>, EnrollmentError>> + Send;

    /// Number of enrollments of a user.
    fn count_by_user(
        &self,
        user_id: Uuid,
    ) -> impl std::future::Future<Output = Result<u64, EnrollmentError>> + Send;

    /// Number of enrollments of a course.
    fn count_by_course(
        &self,
        course_id: Uuid,
    ) -> impl std::future::Future<Output = Result<u64, EnrollmentError>> + Send;

    /// Total number of enrollments.
    fn count_all(&self) -> impl std::future::Future<Output = Result<u64, EnrollmentError>> + Send;
}

/// Enrollment service.
pub struct EnrollmentService<R: EnrollmentRepository> {
    repo: Arc<R>,
}

impl<R: EnrollmentRepository> EnrollmentService<R> {
    /// Create a new enrollment service.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    async fn ensure_user(&self, user_id: Uuid) -> Result<(), EnrollmentError> {
        if self.repo.user_exists(user_id).await? {
            Ok(())
        } else {
            Err(EnrollmentError::UserNotFound(user_id))
        }
    }

    async fn ensure_course(&self, course_id: Uuid) -> Result<(), EnrollmentError> {
        if self.repo.course_exists(course_id).await? {
            Ok(())
        } else {
            Err(EnrollmentError::CourseNotFound(course_id))
        }
    }

    /// Enroll a user in a course.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - User or course does not exist
    /// - User is already enrolled
    pub async fn enroll(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Enrollment, EnrollmentError> {
        self.ensure_user(user_id).await?;
        self.ensure_course(course_id).await?;
        if self.repo.is_enrolled(user_id, course_id).await? {
            return Err(EnrollmentError::AlreadyEnrolled { user_id, course_id });
        }

        let enrollment = self.repo.create(user_id, course_id).await?;
        info!(user_id = %user_id, course_id = %course_id, "User enrolled");
        Ok(enrollment)
    }

    /// Remove a user from a course.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - User or course does not exist
    /// - User is not enrolled
    pub async fn unenroll(&self, user_id: Uuid, course_id: Uuid) -> Result<(), EnrollmentError> {
        self.ensure_user(user_id).await?;
        self.ensure_course(course_id).await?;
        if !self.repo.delete(user_id, course_id).await? {
            return Err(EnrollmentError::NotEnrolled { user_id, course_id });
        }
        info!(user_id = %user_id, course_id = %course_id, "User unenrolled");
        Ok(())
    }

    /// Courses a user is enrolled in.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist.
    pub async fn courses_for_user(&self, user_id: Uuid) -> Result<UserCourses, EnrollmentError> {
        self.ensure_user(user_id).await?;
        let courses = self.repo.courses_for_user(user_id).await?;
        Ok(UserCourses {
            user_id,
            count: u64::try_from(courses.len()).unwrap_or(u64::MAX),
            courses,
        })
    }

    /// Enrollments of a course.
    ///
    /// # Errors
    ///
    /// Returns an error if the course does not exist.
    pub async fn enrollments_for_course(
        &self,
        course_id: Uuid,
    ) -> Result<CourseEnrollments, EnrollmentError> {
        self.ensure_course(course_id).await?;
        let enrollments = self.repo.list_by_course(course_id).await?;
        Ok(CourseEnrollments {
            course_id,
            count: u64::try_from(enrollments.len()).unwrap_or(u64::MAX),
            enrollments,
        })
    }

    /// Number of courses a user is enrolled in.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist.
    pub async fn count_for_user(&self, user_id: Uuid) -> Result<u64, EnrollmentError> {
        self.ensure_user(user_id).await?;
        self.repo.count_by_user(user_id).await
    }

    /// Number of users enrolled in a course.
    ///
    /// # Errors
    ///
    /// Returns an error if the course does not exist.
    pub async fn count_for_course(&self, course_id: Uuid) -> Result<u64, EnrollmentError> {
        self.ensure_course(course_id).await?;
        self.repo.count_by_course(course_id).await
    }

    /// Total number of enrollments.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails.
    pub async fn count_all(&self) -> Result<u64, EnrollmentError> {
        self.repo.count_all().await
    }
}
