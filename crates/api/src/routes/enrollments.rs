//! Enrollment routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use brightpath_core::enrollment::{CourseEnrollments, EnrollmentService, UserCourses};
use brightpath_db::EnrollmentRepository;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiResult;

/// Creates the enrollment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/enrollments/count", get(count_enrollments))
        .route(
            "/enrollments/users/{user_id}/courses",
            get(courses_for_user),
        )
        .route(
            "/enrollments/courses/{course_id}",
            get(enrollments_for_course),
        )
        .route(
            "/enrollments/{user_id}/{course_id}",
            post(enroll).delete(unenroll),
        )
}

fn service(state: &AppState) -> EnrollmentService<EnrollmentRepository> {
    EnrollmentService::new(Arc::new(EnrollmentRepository::new((*state.db).clone())))
}

/// POST `/enrollments/{user_id}/{course_id}`
async fn enroll(
    State(state): State<AppState>,
    Path((user_id, course_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let enrollment = service(&state).enroll(user_id, course_id).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// DELETE `/enrollments/{user_id}/{course_id}`
async fn unenroll(
    State(state): State<AppState>,
    Path((user_id, course_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    service(&state).unenroll(user_id, course_id).await?;
    info!(user_id = %user_id, course_id = %course_id, "Enrollment removed via API");
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/enrollments/users/{user_id}/courses`
async fn courses_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<UserCourses>> {
    Ok(Json(service(&state).courses_for_user(user_id).await?))
}

/// GET `/enrollments/courses/{course_id}`
async fn enrollments_for_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<CourseEnrollments>> {
    Ok(Json(
        service(&state).enrollments_for_course(course_id).await?,
    ))
}

/// GET `/enrollments/count`
async fn count_enrollments(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let count = service(&state).count_all().await?;
    Ok(Json(json!({ "count": count })))
}
