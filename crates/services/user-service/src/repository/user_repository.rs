//! User repository contract and its PostgreSQL implementation.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{AppError, AppResult, OptionExt};
use domain::{NewUser, User};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Implementations must report a missing record as [`AppError::NotFound`],
/// including the zero-rows-affected case of `update` and `delete`. Every
/// other backend failure is returned as a storage error.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user and return it with its assigned identifier
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Find user by ID
    async fn get(&self, id: Uuid) -> AppResult<User>;

    /// Find user by email address
    async fn get_by_email(&self, email: &str) -> AppResult<User>;

    /// Write name, email and updated_at for the user's ID
    async fn update(&self, user: &User) -> AppResult<()>;

    /// Permanently remove user by ID
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// List all users, newest first
    async fn list(&self) -> AppResult<Vec<User>>;
}

/// PostgreSQL implementation of UserRepository.
pub struct UserStore {
    db: Arc<DatabaseConnection>,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(user.name),
            email: Set(user.email),
            password: Set(user.password),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        };

        let model = active_model.insert(self.db.as_ref()).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn get(&self, id: Uuid) -> AppResult<User> {
        UserEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(User::from)
            .ok_or_not_found()
    }

    async fn get_by_email(&self, email: &str) -> AppResult<User> {
        UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await?
            .map(User::from)
            .ok_or_not_found()
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::Name, Expr::value(user.name.clone()))
            .col_expr(user::Column::Email, Expr::value(user.email.clone()))
            .col_expr(user::Column::UpdatedAt, Expr::value(user.updated_at))
            .filter(user::Column::Id.eq(user.id))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        // Deleted between read and write
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }
}
