//! User Service - REST server for user management.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_service_lib::config::UserServiceConfig;
use user_service_lib::{MigrateAction, StorageBackend};

#[derive(Parser)]
#[command(name = "user-service")]
#[command(about = "User management microservice")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address (defaults to SERVER_HOST)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (defaults to SERVER_PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Keep users in memory instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,
    },
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = UserServiceConfig::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.service.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            in_memory,
        } => {
            let host = host.unwrap_or_else(|| config.service.host.clone());
            let port = port.unwrap_or(config.service.port);
            let backend = if in_memory {
                StorageBackend::InMemory
            } else {
                StorageBackend::Postgres
            };
            user_service_lib::run_server(&host, port, config, backend).await?;
        }
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateCommands::Up => MigrateAction::Up,
                MigrateCommands::Down => MigrateAction::Down,
                MigrateCommands::Status => MigrateAction::Status,
                MigrateCommands::Fresh => MigrateAction::Fresh,
            };
            user_service_lib::run_migrations(config, migrate_action).await?;
        }
    }

    Ok(())
}
