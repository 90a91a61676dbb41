//! Postgres connection pool setup.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use super::error::DbError;

fn env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Tunables for the connection pool. Each field falls back to an environment
/// variable, then to a built-in default.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: env_u32("BW_DB_MAX_CONNECTIONS", 20),
            min_connections: env_u32("BW_DB_MIN_CONNECTIONS", 2),
            acquire_timeout: Duration::from_secs(env_u64("BW_DB_ACQUIRE_TIMEOUT_SECS", 30)),
            max_lifetime: Duration::from_secs(env_u64("BW_DB_MAX_LIFETIME_SECS", 1800)),
            idle_timeout: Duration::from_secs(env_u64("BW_DB_IDLE_TIMEOUT_SECS", 600)),
        }
    }
}

/// Shared handle to the Postgres pool.
#[derive(Debug, Clone)]
pub struct DbPool {
    inner: PgPool,
}

impl DbPool {
    /// The underlying sqlx pool, for executing queries.
    pub fn pg(&self) -> &PgPool {
        &self.inner
    }

    /// Runs a trivial query to verify the database is reachable.
    pub async fn is_healthy(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.inner)
            .await
            .is_ok()
    }
}

/// Connects to Postgres with default pool options.
pub async fn create_pool(database_url: &str) -> Result<DbPool, DbError> {
    create_pool_with_options(database_url, PoolOptions::default()).await
}

/// Connects to Postgres with explicit pool options.
pub async fn create_pool_with_options(
    database_url: &str,
    options: PoolOptions,
) -> Result<DbPool, DbError> {
    if !database_url.starts_with("postgres://") && !database_url.starts_with("postgresql://") {
        return Err(DbError::Configuration(format!(
            "unsupported database url scheme: {}",
            database_url.split("://").next().unwrap_or("<none>")
        )));
    }

    let pool = PgPoolOptions::new()
        .max_connections(options.max_connections)
        .min_connections(options.min_connections)
        .acquire_timeout(options.acquire_timeout)
        .max_lifetime(options.max_lifetime)
        .idle_timeout(options.idle_timeout)
        .connect(database_url)
        .await
        .map_err(|e| DbError::Connection(e.to_string()))?;

    info!(
        max_connections = options.max_connections,
        "database pool created"
    );

    Ok(DbPool { inner: pool })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_options() {
        let options = PoolOptions::default();
        assert_eq!(options.max_connections, 20);
        assert_eq!(options.min_connections, 2);
        assert_eq!(options.acquire_timeout, Duration::from_secs(30));
        assert_eq!(options.max_lifetime, Duration::from_secs(1800));
        assert_eq!(options.idle_timeout, Duration::from_secs(600));
    }

    #[tokio::test]
    async fn test_rejects_non_postgres_scheme() {
        let err = create_pool("mysql://localhost/breachward").await.unwrap_err();
        assert!(matches!(err, DbError::Configuration(_)));

        let err = create_pool("sqlite::memory:").await.unwrap_err();
        assert!(matches!(err, DbError::Configuration(_)));
    }
}
