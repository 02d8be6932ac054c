//! User handlers.

use std::borrow::Cow;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

use common::{AppError, AppResult};
use domain::UserResponse;

use crate::http::extractors::{RequestContext, ValidatedJson};
use crate::http::state::AppState;

/// User creation request.
///
/// Missing fields deserialize as empty strings so the entity rules report
/// them; only the format of a non-empty email is checked here.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// User display name
    #[serde(default)]
    #[schema(example = "John Doe")]
    pub name: String,
    /// User email address
    #[serde(default)]
    #[validate(custom(function = "email_format"))]
    #[schema(example = "john@example.com")]
    pub email: String,
    /// User password (minimum 8 characters)
    #[serde(default)]
    #[schema(example = "password123", min_length = 8)]
    pub password: String,
}

/// User update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    /// New display name
    #[serde(default)]
    #[schema(example = "John Updated")]
    pub name: String,
    /// New email address
    #[serde(default)]
    #[validate(custom(function = "email_format"))]
    #[schema(example = "john.updated@example.com")]
    pub email: String,
}

/// Email syntax check that leaves an empty value to the entity's
/// "email is required" rule.
fn email_format(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        return Ok(());
    }

    let mut error = ValidationError::new("email");
    error.message = Some(Cow::Borrowed("Invalid email format"));
    Err(error)
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

/// A path segment that is not a UUID cannot name any stored user.
fn parse_user_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_user(
    ctx: RequestContext,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .user_service
        .create_user(&ctx, payload.name, payload.email, payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// List all users, newest first
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "List of all users", body = Vec<UserResponse>)
    )
)]
pub async fn list_users(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.user_service.list_users(&ctx).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let id = parse_user_id(&id)?;
    let user = state.user_service.get_user(&ctx, id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update user name and email
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let id = parse_user_id(&id)?;
    let user = state
        .user_service
        .update_user(&ctx, id, payload.name, payload.email)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Delete user permanently
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_user_id(&id)?;
    state.user_service.delete_user(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
