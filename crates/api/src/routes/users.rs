//! User routes: registration, profile edits and profile images.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use brightpath_core::attachment::SignedUrl;
use brightpath_core::storage::OpendalBackend;
use brightpath_core::user::{RegisterUser, UpdateUserInput, User, UserService};
use brightpath_db::UserRepository;
use uuid::Uuid;

use super::SignedUrlQuery;
use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::UploadForm;

/// Multipart names accepted for the registration profile image.
const PROFILE_IMAGE_FIELDS: &[&str] = &["profile_image", "profileImage"];

/// Multipart names accepted when replacing a profile image.
const PROFILE_IMAGE_UPLOAD_FIELDS: &[&str] = &["file", "profileImage"];

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register_user))
        .route("/users/{id}", get(get_user).put(update_user))
        .route(
            "/users/{id}/profile-image",
            post(replace_profile_image)
                .put(replace_profile_image)
                .delete(remove_profile_image),
        )
        .route(
            "/users/{id}/profile-image/signed-url",
            get(profile_image_signed_url),
        )
}

fn service(state: &AppState) -> UserService<UserRepository, OpendalBackend> {
    UserService::new(
        Arc::new(UserRepository::new((*state.db).clone())),
        Arc::clone(&state.attachments),
    )
}

/// POST `/users`
///
/// Multipart fields: `username`, `email`, optional `profile_image`
/// (or `profileImage`).
async fn register_user(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut form = UploadForm::read(multipart).await?;
    let input = RegisterUser {
        username: form.require_text("username")?.trim().to_string(),
        email: form.require_text("email")?.trim().to_string(),
        profile_image: form.take_any_file(PROFILE_IMAGE_FIELDS),
    };

    let user = service(&state).register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET `/users/{id}`
async fn get_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<User>> {
    Ok(Json(service(&state).get(id).await?))
}

/// PUT `/users/{id}`
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserInput>,
) -> ApiResult<Json<User>> {
    Ok(Json(service(&state).update(id, payload).await?))
}

/// POST/PUT `/users/{id}/profile-image`
///
/// Multipart field: `file` (or `profileImage`).
async fn replace_profile_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<User>> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.require_file(PROFILE_IMAGE_UPLOAD_FIELDS)?;

    Ok(Json(service(&state).replace_profile_image(id, upload).await?))
}

/// DELETE `/users/{id}/profile-image`
async fn remove_profile_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    Ok(Json(service(&state).remove_profile_image(id).await?))
}

/// GET `/users/{id}/profile-image/signed-url`
async fn profile_image_signed_url(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SignedUrlQuery>,
) -> ApiResult<Json<SignedUrl>> {
    let minutes = query.minutes_or(state.signed_url_expiry_minutes);
    Ok(Json(
        service(&state).profile_image_signed_url(id, minutes).await?,
    ))
}
