//! User domain entity and related types.

use std::fmt;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    MIN_PASSWORD_LENGTH, MSG_EMAIL_REQUIRED, MSG_NAME_REQUIRED, TIMESTAMP_PRECISION_DIGITS,
};
use crate::error::{DomainError, DomainResult};

/// Current time at storage precision.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(TIMESTAMP_PRECISION_DIGITS)
}

/// Name and email must both be present on every user.
fn validate_profile(name: &str, email: &str) -> DomainResult<()> {
    if name.is_empty() {
        return Err(DomainError::validation(MSG_NAME_REQUIRED));
    }
    if email.is_empty() {
        return Err(DomainError::validation(MSG_EMAIL_REQUIRED));
    }
    Ok(())
}

/// A validated user that has not been persisted yet.
///
/// Has no `id`: identifiers are assigned by the repository when the record
/// is stored, which turns this into a [`User`].
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewUser {
    /// Build a new user, enforcing the entity invariants.
    ///
    /// # Errors
    /// Returns a validation error if `name` or `email` is empty, or if
    /// `password` is shorter than [`MIN_PASSWORD_LENGTH`] characters.
    pub fn new(name: String, email: String, password: String) -> DomainResult<Self> {
        validate_profile(&name, &email)?;

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let now = now();
        Ok(Self {
            name,
            email,
            password,
            created_at: now,
            updated_at: now,
        })
    }

    /// Attach the storage-assigned identifier.
    pub fn into_user(self, id: Uuid) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password: self.password,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// User domain entity
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Stored and compared as an opaque string; never serialized
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Passwords never reach logs
impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl User {
    /// Replace name and email in place.
    ///
    /// `updated_at` strictly increases on every successful call, even when
    /// two updates land within the same clock tick. `id`, `password` and
    /// `created_at` are left untouched.
    pub fn update(&mut self, name: String, email: String) -> DomainResult<()> {
        validate_profile(&name, &email)?;

        self.name = name;
        self.email = email;

        let now = now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
        Ok(())
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique user identifier
    pub id: Uuid,
    /// User display name
    pub name: String,
    /// User email address
    pub email: String,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
