use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use thiserror::Error;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to create database pool: {0}")]
    Pool(#[from] r2d2::PoolError),

    #[error("Failed to run database migrations: {0}")]
    Migration(String),
}

/// Sets `statement_timeout` on every connection the pool opens, so Postgres
/// cancels, and rolls back, any statement that outlives it.
#[derive(Debug, Clone, Copy)]
struct StatementTimeout(Duration);

impl r2d2::CustomizeConnection<PgConnection, r2d2::Error> for StatementTimeout {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), r2d2::Error> {
        diesel::sql_query(format!("SET statement_timeout = {}", self.0.as_millis()))
            .execute(conn)
            .map(|_| ())
            .map_err(r2d2::Error::QueryError)
    }
}

/// Connect, then bring the schema up to date.
///
/// The initial connection is established eagerly so that an unreachable
/// database is reported here rather than on the first request.
pub fn create_pool(
    database_url: &str,
    checkout_timeout: Duration,
    statement_timeout: Duration,
) -> Result<DbPool, DbError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .connection_timeout(checkout_timeout)
        .connection_customizer(Box::new(StatementTimeout(statement_timeout)))
        .build(manager)?;

    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DbError::Migration(e.to_string()))?;

    for version in &applied {
        tracing::info!("Applied migration {}", version);
    }

    Ok(pool)
}
