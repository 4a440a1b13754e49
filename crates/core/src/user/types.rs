//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::UserError;
use crate::attachment::AssetUpload;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// User ID.
    pub id: Uuid,
    /// Unique username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Permanent URL of the profile image.
    pub profile_image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Registration request, optionally with a profile image.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Profile image to upload before the user is stored.
    pub profile_image: Option<AssetUpload>,
}

/// Input for inserting a user row.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Already-uploaded profile image.
    pub profile_image_url: Option<String>,
}

/// Editable user fields.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserInput {
    /// New username.
    pub username: String,
    /// New email address.
    pub email: String,
}

pub(crate) fn validate_identity(username: &str, email: &str) -> Result<(), UserError> {
    if username.trim().is_empty() {
        return Err(UserError::Validation("username is required".into()));
    }
    if username.chars().count() > 50 {
        return Err(UserError::Validation(
            "username must be at most 50 characters".into(),
        ));
    }
    let email = email.trim();
    let valid_email = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid_email {
        return Err(UserError::Validation(format!("invalid email: {email}")));
    }
    Ok(())
}
