//! API route definitions.

use axum::Router;
use serde::Deserialize;

use crate::AppState;

pub mod courses;
pub mod enrollments;
pub mod health;
pub mod users;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(users::routes())
        .merge(courses::routes())
        .merge(enrollments::routes())
}

/// Query parameters for signed URL endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SignedUrlQuery {
    /// Requested lifetime; the configured default applies when omitted.
    pub expiry_minutes: Option<u32>,
}

impl SignedUrlQuery {
    /// Requested lifetime, falling back to `default`.
    #[must_use]
    pub fn minutes_or(&self, default: u32) -> u32 {
        self.expiry_minutes.unwrap_or(default)
    }
}
