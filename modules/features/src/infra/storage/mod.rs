//! sea-orm persistence for features.

pub mod entity;
pub mod migrations;
pub mod sea_orm_repo;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DbErr};
use sea_orm_migration::MigratorTrait;

pub use sea_orm::DatabaseConnection;

use self::migrations::Migrator;

/// In-memory SQLite lives inside a single connection.
fn is_in_memory_sqlite(dsn: &str) -> bool {
    dsn.starts_with("sqlite::memory:") || (dsn.starts_with("sqlite:") && dsn.contains("mode=memory"))
}

/// Closing the only connection of an in-memory database drops its data,
/// so that connection must never be recycled.
const IN_MEMORY_CONNECTION_LIFETIME: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

fn pool_options(dsn: &str, max_connections: u32) -> ConnectOptions {
    let mut opts = ConnectOptions::new(dsn.to_owned());
    opts.min_connections(1).sqlx_logging(false);
    if is_in_memory_sqlite(dsn) {
        opts.max_connections(1)
            .max_lifetime(IN_MEMORY_CONNECTION_LIFETIME)
            .idle_timeout(IN_MEMORY_CONNECTION_LIFETIME);
    } else {
        opts.max_connections(max_connections.max(1));
    }
    opts
}

/// Open a connection pool for `dsn`.
///
/// # Errors
/// Returns the driver error when the database cannot be reached.
pub async fn connect(dsn: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let opts = pool_options(dsn, max_connections);
    let backend = dsn.split(':').next().unwrap_or_default();
    tracing::info!(
        backend,
        pool_size = opts.get_max_connections(),
        "Connecting to database"
    );
    Database::connect(opts).await
}

/// Apply all pending migrations.
///
/// # Errors
/// Returns the first migration failure.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
