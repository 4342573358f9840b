use std::{future::Future, time::Duration};

use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::{
    error::{AppError, AppResult},
    migration::Migrator,
};

/// Create a SeaORM connection.
///
/// SQLite databases get a single pooled connection: an in-memory database
/// lives and dies with its connection, and SQLite serializes writers anyway.
pub async fn create_orm_conn(database_url: &str, max_connections: u32) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    if database_url.starts_with("sqlite:") {
        options.max_connections(1).min_connections(1);
    } else {
        options.max_connections(max_connections);
    }
    options
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10));

    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Apply every pending schema migration.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    Migrator::up(conn, None).await?;
    Ok(())
}

/// Bound a unit of work in time. On expiry the future is dropped, which drops
/// any open transaction it holds and rolls it back.
pub async fn within_deadline<T, F>(limit: Duration, work: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, work).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(limit_ms = %limit.as_millis(), "unit of work timed out, rolled back");
            Err(AppError::TransactionTimeout)
        }
    }
}
