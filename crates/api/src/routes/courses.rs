//! Course routes: catalog CRUD, cover image and downloadable resource.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use brightpath_core::attachment::SignedUrl;
use brightpath_core::course::{Course, CourseDetails, CourseService, NewCourse};
use brightpath_core::storage::OpendalBackend;
use brightpath_db::CourseRepository;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use uuid::Uuid;

use super::SignedUrlQuery;
use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extractors::UploadForm;

/// Multipart names accepted when replacing a cover image.
const IMAGE_UPLOAD_FIELDS: &[&str] = &["file", "image"];

/// Creates the course routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/courses/{id}/image", put(replace_image).delete(remove_image))
        .route("/courses/{id}/image/signed-url", get(image_signed_url))
        .route(
            "/courses/{id}/resource",
            get(resource_url)
                .put(replace_resource)
                .delete(remove_resource),
        )
        .route(
            "/courses/{id}/resource/signed-url",
            get(resource_signed_url),
        )
        .route("/courses/{id}/download", get(download_resource))
}

fn service(state: &AppState) -> CourseService<CourseRepository, OpendalBackend> {
    CourseService::new(
        Arc::new(CourseRepository::new((*state.db).clone())),
        Arc::clone(&state.attachments),
    )
}

/// Reads course fields from a multipart form.
fn details_from_form(form: &UploadForm) -> Result<CourseDetails, ApiError> {
    let start_date = form.require_text("start_date")?.trim();
    let start_date = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").map_err(|_| {
        ApiError::validation(format!("start_date must be YYYY-MM-DD, got {start_date}"))
    })?;

    let price = form.require_text("price")?.trim();
    let price = Decimal::from_str(price)
        .map_err(|_| ApiError::validation(format!("price must be a decimal, got {price}")))?;

    Ok(CourseDetails {
        name: form.require_text("name")?.trim().to_string(),
        description: form.text("description").unwrap_or_default().to_string(),
        start_date,
        price,
    })
}

/// `Content-Disposition` for a download, with characters that would break
/// the quoted filename replaced.
fn attachment_disposition(filename: &str) -> Result<HeaderValue, ApiError> {
    let safe: String = filename
        .chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();

    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .map_err(|e| ApiError::from(brightpath_shared::AppError::Internal(e.to_string())))
}

/// GET `/courses`
async fn list_courses(State(state): State<AppState>) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(service(&state).list().await?))
}

/// POST `/courses`
///
/// Multipart fields: `name`, `description`, `start_date`, `price`, optional
/// `image` and `file`.
async fn create_course(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut form = UploadForm::read(multipart).await?;
    let input = NewCourse {
        details: details_from_form(&form)?,
        image: form.take_file("image"),
        resource: form.take_file("file"),
    };

    let course = service(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// GET `/courses/{id}`
async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Course>> {
    Ok(Json(service(&state).get(id).await?))
}

/// PUT `/courses/{id}`
async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CourseDetails>,
) -> ApiResult<Json<Course>> {
    Ok(Json(service(&state).update(id, payload).await?))
}

/// DELETE `/courses/{id}`
async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT `/courses/{id}/image`
///
/// Multipart field: `file` (or `image`).
async fn replace_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<Course>> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.require_file(IMAGE_UPLOAD_FIELDS)?;
    Ok(Json(service(&state).replace_image(id, upload).await?))
}

/// DELETE `/courses/{id}/image`
async fn remove_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Course>> {
    Ok(Json(service(&state).remove_image(id).await?))
}

/// GET `/courses/{id}/image/signed-url`
async fn image_signed_url(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SignedUrlQuery>,
) -> ApiResult<Json<SignedUrl>> {
    let minutes = query.minutes_or(state.signed_url_expiry_minutes);
    Ok(Json(service(&state).image_signed_url(id, minutes).await?))
}

/// GET `/courses/{id}/resource`
async fn resource_url(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let url = service(&state).resource_url(id).await?;
    Ok(Json(json!({ "url": url })))
}

/// PUT `/courses/{id}/resource`
///
/// Multipart field: `file`.
async fn replace_resource(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<Course>> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.require_file(&["file"])?;
    Ok(Json(service(&state).replace_resource(id, upload).await?))
}

/// DELETE `/courses/{id}/resource`
async fn remove_resource(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Course>> {
    Ok(Json(service(&state).remove_resource(id).await?))
}

/// GET `/courses/{id}/resource/signed-url`
async fn resource_signed_url(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SignedUrlQuery>,
) -> ApiResult<Json<SignedUrl>> {
    let minutes = query.minutes_or(state.signed_url_expiry_minutes);
    Ok(Json(service(&state).resource_signed_url(id, minutes).await?))
}

/// GET `/courses/{id}/download`
async fn download_resource(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let download = service(&state).download_resource(id).await?;
    let disposition = attachment_disposition(&download.filename)?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.content,
    )
        .into_response())
}
