//! Course domain types.

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::CourseError;
use crate::attachment::AssetUpload;

/// Maximum description length in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// A course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    /// Course ID.
    pub id: Uuid,
    /// Course name.
    pub name: String,
    /// Description, at most 1000 characters.
    pub description: String,
    /// First day of the course.
    pub start_date: NaiveDate,
    /// Price.
    pub price: Decimal,
    /// Permanent URL of the cover image.
    pub image_url: Option<String>,
    /// Permanent URL of the course resource.
    pub resource_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Editable course fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CourseDetails {
    /// Course name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// First day of the course.
    pub start_date: NaiveDate,
    /// Price.
    pub price: Decimal,
}

impl CourseDetails {
    /// Validate field constraints.
    ///
    /// # Errors
    ///
    /// Returns `Validation` describing the first invalid field.
    pub fn validate(&self) -> Result<(), CourseError> {
        if self.name.trim().is_empty() {
            return Err(CourseError::Validation("name is required".into()));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(CourseError::Validation(format!(
                "description must be at most {MAX_DESCRIPTION_CHARS} characters"
            )));
        }
        if self.price.is_sign_negative() {
            return Err(CourseError::Validation("price must not be negative".into()));
        }
        Ok(())
    }
}

/// Course creation request with optional attachments.
#[derive(Debug, Clone)]
pub struct NewCourse {
    /// Course fields.
    pub details: CourseDetails,
    /// Cover image.
    pub image: Option<AssetUpload>,
    /// Course resource (PDF).
    pub resource: Option<AssetUpload>,
}

/// Input for inserting a course row.
#[derive(Debug, Clone)]
pub struct CreateCourseInput {
    /// Course fields.
    pub details: CourseDetails,
    /// Already-uploaded cover image.
    pub image_url: Option<String>,
    /// Already-uploaded resource.
    pub resource_url: Option<String>,
}

/// A course resource fetched for download.
#[derive(Debug, Clone)]
pub struct ResourceDownload {
    /// Suggested filename, `<course name>.pdf`.
    pub filename: String,
    /// File content.
    pub content: Bytes,
}
