//! Integration tests for API endpoints.
//!
//! The router is driven in-process against the in-memory store, so no
//! database is required.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use user_service_lib::http::{create_router, AppState};
use user_service_lib::repository::InMemoryUserStore;
use user_service_lib::service::UserManager;

// =============================================================================
// Helpers
// =============================================================================

fn app() -> Router {
    let repo = Arc::new(InMemoryUserStore::new());
    let service = Arc::new(UserManager::new(repo));
    create_router(AppState::new(service, None))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn create(app: &Router, name: &str, email: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/users",
        Some(json!({ "name": name, "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_user_returns_201_without_password() {
    let app = app();

    let body = create(&app, "John Doe", "john@example.com").await;

    assert_eq!(body["name"], "John Doe");
    assert_eq!(body["email"], "john@example.com");
    assert!(body["id"].is_string());
    assert!(body["createdAt"].is_string());
    assert_eq!(body["createdAt"], body["updatedAt"]);
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_create_user_duplicate_email_is_409() {
    let app = app();
    create(&app, "John Doe", "john@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({ "name": "Jane", "email": "john@example.com", "password": "password123" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_create_user_validation_errors_are_400() {
    let app = app();

    let cases = [
        json!({ "name": "John", "email": "john@example.com", "password": "short" }),
        json!({ "name": "", "email": "john@example.com", "password": "password123" }),
        json!({ "name": "John", "email": "not-an-email", "password": "password123" }),
        json!({ "email": "john@example.com", "password": "password123" }),
    ];

    for case in cases {
        let (status, body) = send(&app, Method::POST, "/users", Some(case.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case: {}", case);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "case: {}", case);
    }

    let (_, list) = send(&app, Method::GET, "/users", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_create_user_empty_email_reports_required() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({ "name": "John", "email": "", "password": "password123" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "email is required");
}

#[tokio::test]
async fn test_create_user_malformed_json_is_400() {
    let app = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Get / Update / Delete
// =============================================================================

#[tokio::test]
async fn test_get_user_round_trip() {
    let app = app();
    let created = create(&app, "John Doe", "john@example.com").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&app, Method::GET, &format!("/users/{}", id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_404() {
    let app = app();

    for uri in [
        "/users/non-existent-id".to_string(),
        format!("/users/{}", uuid::Uuid::new_v4()),
    ] {
        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "uri: {}", uri);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "uri: {}", uri);

        let (status, _) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "name": "X", "email": "x@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "uri: {}", uri);
    }
}

#[tokio::test]
async fn test_update_user_changes_profile() {
    let app = app();
    let created = create(&app, "John Doe", "john@example.com").await;
    let uri = format!("/users/{}", created["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "name": "John Updated", "email": "john.updated@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["name"], "John Updated");
    assert_eq!(body["email"], "john.updated@example.com");
    assert_eq!(body["createdAt"], created["createdAt"]);
    assert_ne!(body["updatedAt"], created["updatedAt"]);

    let (_, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn test_update_user_empty_name_is_400() {
    let app = app();
    let created = create(&app, "John Doe", "john@example.com").await;
    let uri = format!("/users/{}", created["id"].as_str().unwrap());

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "name": "", "email": "john@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_delete_user_then_404() {
    let app = app();
    let created = create(&app, "John Doe", "john@example.com").await;
    let uri = format!("/users/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// List / Health
// =============================================================================

#[tokio::test]
async fn test_list_users_newest_first() {
    let app = app();
    let first = create(&app, "First", "first@example.com").await;
    let second = create(&app, "Second", "second@example.com").await;

    let (status, body) = send(&app, Method::GET, "/users", None).await;

    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["id"], second["id"]);
    assert_eq!(users[1]["id"], first["id"]);
    assert!(users.iter().all(|u| u.get("password").is_none()));
}

#[tokio::test]
async fn test_health_without_database() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["database"]["status"], "in-memory");
}
