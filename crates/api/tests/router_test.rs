//! Router tests that stop before the database.
//!
//! The state carries a disconnected `DatabaseConnection` and an in-memory
//! storage backend, so only validation paths and error rendering are
//! exercised here.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use brightpath_api::{AppState, create_router};
use brightpath_core::attachment::AttachmentStore;
use brightpath_core::storage::OpendalBackend;
use brightpath_shared::config::{ServerConfig, StorageConfig, StorageProvider};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "brightpath-test-boundary";

fn app() -> Router {
    let storage = StorageConfig {
        provider: StorageProvider::Memory,
        ..StorageConfig::default()
    };
    let backend = OpendalBackend::from_config(&storage).expect("memory backend");
    let attachments =
        AttachmentStore::from_config(Arc::new(backend), &storage).expect("attachment store");

    let state = AppState {
        db: Arc::new(DatabaseConnection::default()),
        attachments: Arc::new(attachments),
        signed_url_expiry_minutes: 60,
    };
    create_router(state, &ServerConfig::default())
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, Vec<u8>),
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, filename, content) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; \
                         filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn course_fields<'a>(price: &'a str, start_date: &'a str) -> Vec<Part<'a>> {
    vec![
        Part::Text("name", "Rust Fundamentals"),
        Part::Text("description", "Ownership, borrowing and traits"),
        Part::Text("start_date", start_date),
        Part::Text("price", price),
    ]
}

#[tokio::test]
async fn test_health_reports_storage_provider() {
    let request = Request::get("/api/v1/health").body(Body::empty()).unwrap();
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_register_requires_username() {
    let request = multipart_request(
        "/api/v1/users",
        &[Part::Text("email", "ada@example.com")],
    );
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_course_rejects_negative_price() {
    let request = multipart_request("/api/v1/courses", &course_fields("-5.00", "2026-11-02"));
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_course_rejects_malformed_date() {
    let request = multipart_request("/api/v1/courses", &course_fields("10", "02/11/2026"));
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("start_date"));
}

#[tokio::test]
async fn test_create_course_rejects_oversized_image() {
    let mut parts = course_fields("10", "2026-11-02");
    parts.push(Part::File("image", "cover.png", vec![0u8; 3 * 1024 * 1024]));
    let (status, body) = send(multipart_request("/api/v1/courses", &parts)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_course_rejects_unsupported_image_type() {
    let mut parts = course_fields("10", "2026-11-02");
    parts.push(Part::File("image", "cover.svg", b"<svg/>".to_vec()));
    let (status, body) = send(multipart_request("/api/v1/courses", &parts)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("svg"));
}

#[tokio::test]
async fn test_replace_image_requires_file() {
    let request = Request::put(format!("/api/v1/courses/{}/image", uuid::Uuid::new_v4()))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(&[])))
        .unwrap();
    let (status, _) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_replace_image_accepts_image_field() {
    let request = Request::put(format!("/api/v1/courses/{}/image", uuid::Uuid::new_v4()))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(&[Part::File(
            "image",
            "cover.png",
            b"png".to_vec(),
        )])))
        .unwrap();
    let (status, body) = send(request).await;

    // The upload is accepted and the course lookup reaches the database.
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "DATABASE_ERROR");
}

#[tokio::test]
async fn test_replace_profile_image_accepts_profile_image_field() {
    let uri = format!("/api/v1/users/{}/profile-image", uuid::Uuid::new_v4());
    let parts = [Part::File("profileImage", "me.jpg", b"jpg".to_vec())];
    let (status, body) = send(multipart_request(&uri, &parts)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "DATABASE_ERROR");
}

#[tokio::test]
async fn test_replace_profile_image_ignores_unknown_field() {
    let uri = format!("/api/v1/users/{}/profile-image", uuid::Uuid::new_v4());
    let parts = [Part::File("avatar", "me.jpg", b"jpg".to_vec())];
    let (status, body) = send(multipart_request(&uri, &parts)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("file file is required"));
}

#[tokio::test]
async fn test_invalid_path_id_is_bad_request() {
    let request = Request::get("/api/v1/courses/not-a-uuid").body(Body::empty()).unwrap();
    let (status, _) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_database_failure_is_opaque() {
    let request = Request::get("/api/v1/courses").body(Body::empty()).unwrap();
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "DATABASE_ERROR");
    assert_eq!(body["message"], "An internal error occurred");
}
