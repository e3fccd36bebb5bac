//! Error types for clanhall-store
//!
//! Pool- and schema-level failures are fatal and propagate; migration and
//! cache-rebuild failures are contained where they happen and surface as
//! report entries instead (see `migrate::MigrationReport` and
//! `cache::RebuildReport`).

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// No pooled connection became available within the acquire timeout.
    /// Recoverable: callers may retry with backoff.
    #[error("connection pool exhausted: no connection available within the acquire timeout")]
    PoolExhausted,

    /// DDL failed while provisioning a table. Startup must abort.
    #[error("schema provisioning failed for table '{table}': {source}")]
    Schema {
        table: &'static str,
        source: sqlx::Error,
    },

    /// Any other driver-level failure.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// A single clan or membership upsert failed during legacy migration.
    #[error("migration failed for clan '{clan}': {detail}")]
    MigrationRow { clan: String, detail: String },

    /// A projection read failed during a cache rebuild.
    #[error("cache rebuild failed for {projection}: {source}")]
    CacheRebuild {
        projection: &'static str,
        source: Box<StoreError>,
    },

    /// Legacy document file could not be read or written.
    #[error("legacy store I/O error at {path}: {source}")]
    LegacyIo {
        path: String,
        source: std::io::Error,
    },

    /// Legacy document did not parse as a clan document.
    #[error("legacy store format error at {path}: {reason}")]
    LegacyFormat { path: String, reason: String },
}

impl StoreError {
    pub fn migration_row(clan: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MigrationRow {
            clan: clan.into(),
            detail: detail.into(),
        }
    }

    pub fn cache_rebuild(projection: &'static str, source: StoreError) -> Self {
        Self::CacheRebuild {
            projection,
            source: Box::new(source),
        }
    }

    pub fn legacy_io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::LegacyIo {
            path: path.into(),
            source,
        }
    }

    pub fn legacy_format(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LegacyFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

// PoolTimedOut gets its own variant so callers can tell "database is busy"
// from "database is broken".
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => Self::PoolExhausted,
            other => Self::Database(other),
        }
    }
}
