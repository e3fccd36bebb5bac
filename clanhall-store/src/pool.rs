//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits. Connections are
//! recycled on an idle timeout and a hard lifetime cap so a database
//! restart or network reset never strands dead sockets in the pool.

use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};

use clanhall_core::DatabaseConfig;

use crate::error::{StoreError, StoreResult};

/// Create a PostgreSQL connection pool from the storage configuration.
///
/// The pool lazily opens connections up to `max_connections` and keeps
/// `min_connections` warm. Acquisition blocks up to the configured
/// timeout; running out of connections surfaces as
/// [`StoreError::PoolExhausted`] on the acquiring call, not here.
///
/// # Errors
///
/// Returns an error if the initial connection fails.
pub async fn create_pool(config: &DatabaseConfig) -> StoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url())
        .await
        .map_err(StoreError::from)?;

    tracing::info!(
        max = config.max_connections,
        min = config.min_connections,
        "database pool ready"
    );

    Ok(pool)
}

/// Check out a connection explicitly.
///
/// Most callers just hand the pool to a query; this is for
/// multi-statement units of work. Never hold the connection past one
/// unit of work.
///
/// # Errors
///
/// [`StoreError::PoolExhausted`] when no connection frees up within the
/// acquire timeout.
pub async fn acquire(pool: &PgPool) -> StoreResult<PoolConnection<Postgres>> {
    pool.acquire().await.map_err(StoreError::from)
}

/// Drain and close the pool. Idempotent: closing twice is a no-op.
pub async fn close_pool(pool: &PgPool) {
    if !pool.is_closed() {
        pool.close().await;
        tracing::info!("database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> DatabaseConfig {
        // URL comes from DATABASE_URL; the host fields are placeholders.
        DatabaseConfig {
            host: "localhost".into(),
            port: 5432,
            database: "clanhall".into(),
            username: "clanhall".into(),
            password: String::new(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p clanhall-store -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_acquires_connection() {
        let pool = create_pool(&test_config()).await.expect("pool creation failed");

        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");

        assert_eq!(result.0, 1);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn close_is_idempotent() {
        let pool = create_pool(&test_config()).await.expect("pool creation failed");

        close_pool(&pool).await;
        close_pool(&pool).await;

        assert!(pool.is_closed());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn concurrent_pool_access() {
        let pool = create_pool(&test_config()).await.expect("pool creation failed");

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    let result: (i32,) = sqlx::query_as("SELECT $1::int")
                        .bind(i)
                        .fetch_one(&pool)
                        .await
                        .expect("concurrent query failed");
                    result.0
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let result = handle.await.expect("task panicked");
            assert_eq!(result, i as i32);
        }
    }
}
