//! Enrollment repository for database operations.

use brightpath_core::course::Course;
use brightpath_core::enrollment::{
    Enrollment, EnrollmentError, EnrollmentRepository as EnrollmentRepoTrait,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::{course, is_unique_violation};
use crate::entities::{courses, enrollments, users};

/// Enrollment repository backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct EnrollmentRepository {
    db: DatabaseConnection,
}

impl EnrollmentRepository {
    /// Creates a new enrollment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_err(e: &sea_orm::DbErr) -> EnrollmentError {
    EnrollmentError::repository(e.to_string())
}

impl EnrollmentRepoTrait for EnrollmentRepository {
    async fn user_exists(&self, user_id: Uuid) -> Result<bool, EnrollmentError> {
        let count = users::Entity::find_by_id(user_id)
            .count(&self.db)
            .await
            .map_err(|e| db_err(&e))?;
        Ok(count > 0)
    }

    async fn course_exists(&self, course_id: Uuid) -> Result<bool, EnrollmentError> {
        let count = courses::Entity::find_by_id(course_id)
            .count(&self.db)
            .await
            .map_err(|e| db_err(&e))?;
        Ok(count > 0)
    }

    async fn is_enrolled(&self, user_id: Uuid, course_id: Uuid) -> Result<bool, EnrollmentError> {
        let count = enrollments::Entity::find()
            .filter(enrollments::Column::UserId.eq(user_id))
            .filter(enrollments::Column::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(|e| db_err(&e))?;
        Ok(count > 0)
    }

    async fn create(&self, user_id: Uuid, course_id: Uuid) -> Result<Enrollment, EnrollmentError> {
        let model = enrollments::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            course_id: Set(course_id),
            enrolled_at: Set(Utc::now().into()),
        };

        let model = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                EnrollmentError::AlreadyEnrolled { user_id, course_id }
            } else {
                db_err(&e)
            }
        })?;

        Ok(to_domain(model))
    }

    async fn delete(&self, user_id: Uuid, course_id: Uuid) -> Result<bool, EnrollmentError> {
        let result = enrollments::Entity::delete_many()
            .filter(enrollments::Column::UserId.eq(user_id))
            .filter(enrollments::Column::CourseId.eq(course_id))
            .exec(&self.db)
            .await
            .map_err(|e| db_err(&e))?;

        Ok(result.rows_affected > 0)
    }

    async fn courses_for_user(&self, user_id: Uuid) -> Result<Vec<Course>, EnrollmentError> {
        let models = courses::Entity::find()
            .inner_join(enrollments::Entity)
            .filter(enrollments::Column::UserId.eq(user_id))
            .order_by_asc(enrollments::Column::EnrolledAt)
            .all(&self.db)
            .await
            .map_err(|e| db_err(&e))?;

        Ok(models.into_iter().map(course::to_domain).collect())
    }

    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Enrollment>, EnrollmentError> {
        let models = enrollments::Entity::find()
            .filter(enrollments::Column::CourseId.eq(course_id))
            .order_by_asc(enrollments::Column::EnrolledAt)
            .all(&self.db)
            .await
            .map_err(|e| db_err(&e))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<u64, EnrollmentError> {
        enrollments::Entity::find()
            .filter(enrollments::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(|e| db_err(&e))
    }

    async fn count_by_course(&self, course_id: Uuid) -> Result<u64, EnrollmentError> {
        enrollments::Entity::find()
            .filter(enrollments::Column::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(|e| db_err(&e))
    }

    async fn count_all(&self) -> Result<u64, EnrollmentError> {
        enrollments::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| db_err(&e))
    }
}

fn to_domain(model: enrollments::Model) -> Enrollment {
    Enrollment {
        id: model.id,
        user_id: model.user_id,
        course_id: model.course_id,
        enrolled_at: model.enrolled_at.with_timezone(&Utc),
    }
}
