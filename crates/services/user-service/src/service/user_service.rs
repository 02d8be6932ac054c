//! User service - Handles user-related business logic.
//!
//! SOLID (SRP): Handles user-related use cases only.
//!
//! The email uniqueness check in [`UserService::create_user`] is a lookup
//! followed by an insert, with nothing holding the two together. Two
//! concurrent creates for the same email can both pass the lookup; the
//! second insert then fails on the `users.email` unique index and surfaces
//! as a database error rather than a conflict.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{NewUser, User, MSG_EMAIL_TAKEN};

use crate::context::OperationContext;
use crate::repository::UserRepository;

/// User service trait for dependency injection.
///
/// Every operation runs its storage calls under `ctx`; cancelling it aborts
/// the call in flight with [`AppError::Cancelled`].
#[async_trait]
pub trait UserService: Send + Sync {
    /// Register a new user with a unique email
    async fn create_user(
        &self,
        ctx: &OperationContext,
        name: String,
        email: String,
        password: String,
    ) -> AppResult<User>;

    /// Get user by ID
    async fn get_user(&self, ctx: &OperationContext, id: Uuid) -> AppResult<User>;

    /// Replace a user's name and email
    async fn update_user(
        &self,
        ctx: &OperationContext,
        id: Uuid,
        name: String,
        email: String,
    ) -> AppResult<User>;

    /// Permanently delete user
    async fn delete_user(&self, ctx: &OperationContext, id: Uuid) -> AppResult<()>;

    /// List all users, newest first
    async fn list_users(&self, ctx: &OperationContext) -> AppResult<Vec<User>>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(
        &self,
        ctx: &OperationContext,
        name: String,
        email: String,
        password: String,
    ) -> AppResult<User> {
        debug!(%email, "Creating user");

        match ctx.run(|| self.repo.get_by_email(&email)).await {
            Ok(existing) => {
                warn!(%email, existing_id = %existing.id, "Email already registered");
                return Err(AppError::conflict(MSG_EMAIL_TAKEN));
            }
            Err(AppError::NotFound) => {}
            Err(e) => return Err(e),
        }

        let new_user = NewUser::new(name, email, password)?;
        let user = ctx.run(|| self.repo.create(new_user)).await?;

        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    async fn get_user(&self, ctx: &OperationContext, id: Uuid) -> AppResult<User> {
        ctx.run(|| self.repo.get(id)).await
    }

    async fn update_user(
        &self,
        ctx: &OperationContext,
        id: Uuid,
        name: String,
        email: String,
    ) -> AppResult<User> {
        debug!(user_id = %id, "Updating user");

        // Read-modify-write: invariants live in User::update, not in storage
        let mut user = ctx.run(|| self.repo.get(id)).await?;
        user.update(name, email)?;
        ctx.run(|| self.repo.update(&user)).await?;

        info!(user_id = %id, "User updated");
        Ok(user)
    }

    async fn delete_user(&self, ctx: &OperationContext, id: Uuid) -> AppResult<()> {
        ctx.run(|| self.repo.delete(id)).await?;

        info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn list_users(&self, ctx: &OperationContext) -> AppResult<Vec<User>> {
        ctx.run(|| self.repo.list()).await
    }
}
