//! User repository for database operations.

use brightpath_core::user::{
    CreateUserInput, UpdateUserInput, User, UserError, UserRepository as UserRepoTrait,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::is_unique_violation;
use crate::entities::users;

/// User repository backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> Result<Option<users::Model>, UserError> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| UserError::repository(e.to_string()))
    }
}

impl UserRepoTrait for UserRepository {
    async fn create(&self, input: CreateUserInput) -> Result<User, UserError> {
        let now = Utc::now().into();
        let model = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(input.username.clone()),
            email: Set(input.email),
            profile_image_url: Set(input.profile_image_url),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                UserError::UsernameTaken(input.username)
            } else {
                UserError::repository(e.to_string())
            }
        })?;

        Ok(to_domain(model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError> {
        Ok(self.find_model(id).await?.map(to_domain))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| UserError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn update(&self, id: Uuid, input: UpdateUserInput) -> Result<Option<User>, UserError> {
        let Some(model) = self.find_model(id).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = model.into();
        active.username = Set(input.username.clone());
        active.email = Set(input.email);
        active.updated_at = Set(Utc::now().into());

        let model = active.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                UserError::UsernameTaken(input.username)
            } else {
                UserError::repository(e.to_string())
            }
        })?;

        Ok(Some(to_domain(model)))
    }

    async fn set_profile_image_url(
        &self,
        id: Uuid,
        url: Option<String>,
    ) -> Result<Option<User>, UserError> {
        let Some(model) = self.find_model(id).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = model.into();
        active.profile_image_url = Set(url);
        active.updated_at = Set(Utc::now().into());

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| UserError::repository(e.to_string()))?;

        Ok(Some(to_domain(model)))
    }
}

fn to_domain(model: users::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        profile_image_url: model.profile_image_url,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
