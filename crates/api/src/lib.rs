//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for users, courses and enrollments
//! - Multipart upload extraction
//! - Error to JSON response mapping

pub mod error;
pub mod extractors;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use brightpath_core::attachment::AttachmentStore;
use brightpath_core::storage::OpendalBackend;
use brightpath_shared::config::ServerConfig;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Attachment store shared by every request.
    pub attachments: Arc<AttachmentStore<OpendalBackend>>,
    /// Lifetime of signed URLs when the client does not ask for one.
    pub signed_url_expiry_minutes: u32,
}

/// Creates the main application router.
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout_secs),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
