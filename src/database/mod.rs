use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config;

/// Errors from the connection pool provider
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Process-wide provider for the shared connection pool.
///
/// All tenants live in one database as separate schemas, so a single pool
/// serves both the shared registry and every tenant namespace. The pool is
/// created lazily on first use and closed on shutdown; route handlers never
/// see this type, only the request-scoped handle the resolver gives them.
pub struct Database {
    pool: Arc<RwLock<Option<PgPool>>>,
}

impl Database {
    fn instance() -> &'static Database {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<Database> = OnceLock::new();
        INSTANCE.get_or_init(|| Database {
            pool: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the shared pool, creating it on first use.
    pub async fn shared_pool() -> Result<PgPool, DatabaseError> {
        let this = Self::instance();

        // Fast path: try read lock
        {
            let pool = this.pool.read().await;
            if let Some(pool) = pool.as_ref() {
                return Ok(pool.clone());
            }
        }

        let url = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let db_config = &config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(db_config.max_connections)
            .acquire_timeout(Duration::from_secs(db_config.acquire_timeout_secs))
            .connect(&url)
            .await?;

        {
            let mut slot = this.pool.write().await;
            // Another task may have won the race; keep the first pool
            if let Some(existing) = slot.as_ref() {
                pool.close().await;
                return Ok(existing.clone());
            }
            *slot = Some(pool.clone());
        }

        info!("Created shared database pool");
        Ok(pool)
    }

    /// Pings the shared pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::shared_pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close the pool on shutdown
    pub async fn close() {
        let this = Self::instance();
        let mut slot = this.pool.write().await;
        if let Some(pool) = slot.take() {
            pool.close().await;
            info!("Closed shared database pool");
        }
    }
}
