mod config;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use apikit::api::{StackOptions, apply_middleware_stack};
use apikit::logging::init_logging;
use apikit_errors::mask_sensitive_data;
use axum::Router;
use clap::{Parser, Subcommand};
use features::infra::storage::{self, DatabaseConnection};
use features::{FeatureService, SeaOrmFeaturesRepository};

use crate::config::{AppConfig, CliOverrides};

/// Feature Server - CRUD service for product features
#[derive(Parser)]
#[command(name = "feature-server")]
#[command(about = "Feature Server - CRUD service for product features")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use mock database (sqlite::memory:)
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (APP__*, ENVIRONMENT) -> 4) CLI overrides
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(CliOverrides {
        port: cli.port,
        mock: cli.mock,
    });

    init_logging(&config.logging, cli.verbose)?;
    tracing::info!(environment = %config.environment, "Feature server starting");

    if cli.print_config {
        println!("Effective configuration:\n{}", redacted(&config)?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
        Commands::Migrate => migrate_only(&config).await,
    }
}

// Credentials in the DSN must not end up on the terminal.
fn redacted(config: &AppConfig) -> Result<String> {
    Ok(mask_sensitive_data(&config.to_pretty_json()?).into_owned())
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    config.bind_addr()?;
    config.database.resolve_dsn()?;
    println!("Configuration is valid");
    println!("{}", redacted(config)?);
    Ok(())
}

async fn migrate_only(config: &AppConfig) -> Result<()> {
    let dsn = config.database.resolve_dsn()?;
    let db = storage::connect(&dsn, config.database.max_connections)
        .await
        .context("failed to connect to database")?;
    storage::migrate(&db).await.context("migration failed")?;
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    let addr = config.bind_addr()?;
    let dsn = config.database.resolve_dsn()?;

    let db = storage::connect(&dsn, config.database.max_connections)
        .await
        .context("failed to connect to database")?;
    storage::migrate(&db).await.context("migration failed")?;

    let router = build_app(db, &config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server bound on {}", addr);

    serve(listener, router, shutdown_signal()).await
}

fn build_app(db: DatabaseConnection, config: &AppConfig) -> Router {
    let repo = Arc::new(SeaOrmFeaturesRepository::new(db));
    let service = Arc::new(FeatureService::new(repo, config.features.clone()));
    apply_middleware_stack(
        features::router(service),
        StackOptions {
            mode: config.environment,
            body_limit_bytes: config.server.body_limit_bytes,
        },
    )
}

/// Serve `router` until `shutdown` resolves, then drain in-flight requests.
async fn serve(
    listener: tokio::net::TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM. A listener that cannot be installed
/// never fires, so the other one still stops the server.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Shutdown signal received, draining connections");
}
