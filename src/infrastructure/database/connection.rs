use std::time::Duration;

use diesel::{
    PgConnection, RunQueryDsl,
    r2d2::{self, ConnectionManager},
    sql_query,
    sql_types::Integer,
};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{info, warn};

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/");

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    ConnectionError(String),
    #[error("Pool error: {0}")]
    PoolError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Migration error: {0}")]
    MigrationError(String),
}

#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_size: u32,
    pub connection_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    pub build_attempts: u32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: 5,
            connection_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(30),
            max_lifetime: Duration::from_secs(300),
            build_attempts: 3,
        }
    }
}

#[derive(diesel::QueryableByName)]
struct TestRow {
    #[diesel(sql_type = Integer)]
    test: i32,
}

/// Builds the pool, retrying a few times. Blocks until the first connection
/// is up or the connect timeout passes.
pub fn create_connection_pool(
    database_url: &str,
    settings: &PoolSettings,
) -> Result<DbPool, DatabaseError> {
    if database_url.trim().is_empty() {
        return Err(DatabaseError::ConfigurationError(
            "database URL is empty".to_string(),
        ));
    }

    let attempts = settings.build_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        let manager = ConnectionManager::<PgConnection>::new(database_url);

        match r2d2::Pool::builder()
            .max_size(settings.max_size)
            .min_idle(Some(1))
            .connection_timeout(settings.connection_timeout)
            .idle_timeout(Some(settings.idle_timeout))
            .max_lifetime(Some(settings.max_lifetime))
            .build(manager)
        {
            Ok(pool) => {
                info!(attempt, "Postgres connection pool ready");
                return Ok(pool);
            }
            Err(e) => {
                warn!(attempt, attempts, error = %e, "Postgres pool creation failed");
                last_error = e.to_string();
            }
        }
    }

    Err(DatabaseError::PoolError(last_error))
}

pub fn get_connection_from_pool(pool: &DbPool) -> Result<DbConnection, DatabaseError> {
    pool.get()
        .map_err(|e| DatabaseError::PoolError(e.to_string()))
}

/// `SELECT 1 AS test` must come back as 1.
pub fn test_connection(conn: &mut PgConnection) -> Result<(), DatabaseError> {
    let row: TestRow = sql_query("SELECT 1 AS test")
        .get_result(conn)
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    if row.test == 1 {
        Ok(())
    } else {
        Err(DatabaseError::ConnectionError(format!(
            "test query returned {}",
            row.test
        )))
    }
}

pub fn run_migrations(conn: &mut PgConnection) -> Result<(), DatabaseError> {
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_settings() {
        let settings = PoolSettings::default();
        assert_eq!(settings.max_size, 5);
        assert_eq!(settings.connection_timeout, Duration::from_secs(30));
        assert_eq!(settings.max_lifetime, Duration::from_secs(300));
        assert_eq!(settings.build_attempts, 3);
    }

    #[test]
    fn test_empty_url_is_a_configuration_error() {
        let result = create_connection_pool("  ", &PoolSettings::default());
        assert!(matches!(result, Err(DatabaseError::ConfigurationError(_))));
    }
}
