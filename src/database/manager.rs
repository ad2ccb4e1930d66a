use std::time::{Duration, Instant};

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::filter::FilterError;

/// Errors from DatabaseManager and the entity stores
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Owns the process-wide connection pool.
///
/// Admission is bounded twice: the pool itself caps open connections, and
/// `gate` caps how many store calls may be in flight or waiting at once
/// (`max_connections + queue_size`). A call that cannot get a gate permit
/// fails immediately with [`DatabaseError::PoolExhausted`].
#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
    gate: Arc<Semaphore>,
    query_logging: bool,
    slow_query_threshold: Duration,
}

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        if config.url.is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;

        info!(
            max_connections = config.max_connections,
            queue_size = config.queue_size,
            "Created database pool"
        );
        Ok(Self::from_pool(pool, config))
    }

    pub fn from_pool(pool: PgPool, config: &DatabaseConfig) -> Self {
        let permits = config.max_connections as usize + config.queue_size;
        Self {
            pool,
            gate: Arc::new(Semaphore::new(permits)),
            query_logging: config.enable_query_logging,
            slow_query_threshold: Duration::from_millis(config.slow_query_threshold_ms),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Admission ticket for one store call; held until the call returns.
    pub(crate) fn admit(&self) -> Result<SemaphorePermit<'_>, DatabaseError> {
        self.gate.try_acquire().map_err(|_| {
            warn!("Rejecting database call, pool and wait queue are full");
            DatabaseError::PoolExhausted
        })
    }

    pub(crate) fn log_query(&self, sql: &str, started: Instant) {
        let elapsed = started.elapsed();
        if self.query_logging {
            debug!(elapsed_ms = elapsed.as_millis() as u64, "SQL: {}", sql);
        }
        if elapsed >= self.slow_query_threshold {
            warn!(elapsed_ms = elapsed.as_millis() as u64, "Slow query: {}", sql);
        }
    }

    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        let _permit = self.admit()?;
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Waits for checked-out connections to be returned, then closes them
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}
