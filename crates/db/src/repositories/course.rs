//! Course repository for database operations.

use brightpath_core::course::{
    Course, CourseDetails, CourseError, CourseRepository as CourseRepoTrait, CreateCourseInput,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::entities::courses;

/// Course repository backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct CourseRepository {
    db: DatabaseConnection,
}

impl CourseRepository {
    /// Creates a new course repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> Result<Option<courses::Model>, CourseError> {
        courses::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CourseError::repository(e.to_string()))
    }

    async fn save(&self, active: courses::ActiveModel) -> Result<Course, CourseError> {
        active
            .update(&self.db)
            .await
            .map(to_domain)
            .map_err(|e| CourseError::repository(e.to_string()))
    }
}

impl CourseRepoTrait for CourseRepository {
    async fn list(&self) -> Result<Vec<Course>, CourseError> {
        let models = courses::Entity::find()
            .order_by_asc(courses::Column::StartDate)
            .order_by_asc(courses::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| CourseError::repository(e.to_string()))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, CourseError> {
        Ok(self.find_model(id).await?.map(to_domain))
    }

    async fn create(&self, input: CreateCourseInput) -> Result<Course, CourseError> {
        let now = Utc::now().into();
        let details = input.details;
        let model = courses::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(details.name),
            description: Set(details.description),
            start_date: Set(details.start_date),
            price: Set(details.price),
            image_url: Set(input.image_url),
            resource_url: Set(input.resource_url),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(&self.db)
            .await
            .map(to_domain)
            .map_err(|e| CourseError::repository(e.to_string()))
    }

    async fn update(
        &self,
        id: Uuid,
        details: CourseDetails,
    ) -> Result<Option<Course>, CourseError> {
        let Some(model) = self.find_model(id).await? else {
            return Ok(None);
        };

        let mut active: courses::ActiveModel = model.into();
        active.name = Set(details.name);
        active.description = Set(details.description);
        active.start_date = Set(details.start_date);
        active.price = Set(details.price);
        active.updated_at = Set(Utc::now().into());

        self.save(active).await.map(Some)
    }

    async fn set_image_url(
        &self,
        id: Uuid,
        url: Option<String>,
    ) -> Result<Option<Course>, CourseError> {
        let Some(model) = self.find_model(id).await? else {
            return Ok(None);
        };

        let mut active: courses::ActiveModel = model.into();
        active.image_url = Set(url);
        active.updated_at = Set(Utc::now().into());

        self.save(active).await.map(Some)
    }

    async fn set_resource_url(
        &self,
        id: Uuid,
        url: Option<String>,
    ) -> Result<Option<Course>, CourseError> {
        let Some(model) = self.find_model(id).await? else {
            return Ok(None);
        };

        let mut active: courses::ActiveModel = model.into();
        active.resource_url = Set(url);
        active.updated_at = Set(Utc::now().into());

        self.save(active).await.map(Some)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CourseError> {
        // Enrollments go with the row via ON DELETE CASCADE
        let result = courses::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| CourseError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// Converts a course row into the domain type.
pub(crate) fn to_domain(model: courses::Model) -> Course {
    Course {
        id: model.id,
        name: model.name,
        description: model.description,
        start_date: model.start_date,
        price: model.price,
        image_url: model.image_url,
        resource_url: model.resource_url,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
