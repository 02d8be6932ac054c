//! User Service Library
//!
//! User management over a REST API: create, fetch, update, delete and list
//! users, backed by PostgreSQL or an in-memory store.

pub mod config;
pub mod context;
pub mod http;
pub mod infra;
pub mod repository;
pub mod service;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::UserServiceConfig;
use crate::http::{create_router, AppState};
use crate::infra::Database;
use crate::repository::{InMemoryUserStore, UserRepository, UserStore};
use crate::service::UserManager;

/// Storage backend selection for [`run_server`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    InMemory,
}

/// Run the HTTP server until Ctrl-C.
pub async fn run_server(
    host: &str,
    port: u16,
    config: UserServiceConfig,
    backend: StorageBackend,
) -> Result<(), Box<dyn std::error::Error>> {
    let (user_repo, database): (Arc<dyn UserRepository>, Option<Arc<Database>>) = match backend
    {
        StorageBackend::Postgres => {
            let db = Database::connect(&config.database).await?;
            let repo: Arc<dyn UserRepository> = Arc::new(UserStore::new(db.get_connection()));
            (repo, Some(Arc::new(db)))
        }
        StorageBackend::InMemory => {
            warn!("Using in-memory storage; data is lost on shutdown");
            let repo: Arc<dyn UserRepository> = Arc::new(InMemoryUserStore::new());
            (repo, None)
        }
    };

    let user_service = Arc::new(UserManager::new(user_repo));
    let app = create_router(AppState::new(user_service, database));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(
        service = %config.service.service_name,
        "Listening on http://{}", addr
    );
    info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(
    config: UserServiceConfig,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
