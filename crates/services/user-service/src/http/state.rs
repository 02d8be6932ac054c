//! Application state for dependency injection.

use std::sync::Arc;

use crate::infra::Database;
use crate::service::UserService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    /// Absent when running against the in-memory store
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Create new app state.
    pub fn new(user_service: Arc<dyn UserService>, database: Option<Arc<Database>>) -> Self {
        Self {
            user_service,
            database,
        }
    }
}
