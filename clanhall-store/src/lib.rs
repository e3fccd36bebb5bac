//! clanhall-store: Postgres persistence and directory cache
//!
//! Startup ordering is explicit: [`ClanStore::connect`] brings the pool
//! up and provisions the schema, [`ClanStore::import_legacy`] optionally
//! folds in a legacy document, and from there the repositories and the
//! directory cache are usable until [`ClanStore::close`].

pub mod cache;
pub mod error;
pub mod legacy;
pub mod migrate;
pub mod pool;
pub mod repos;
pub mod schema;

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use clanhall_core::StorageConfig;

pub use cache::{DirectoryCache, DirectorySource, PgDirectorySource, RebuildReport};
pub use error::{StoreError, StoreResult};
pub use legacy::{LegacyClan, LegacyData, LegacyStore};
pub use migrate::MigrationReport;
pub use pool::{acquire, close_pool, create_pool};
pub use repos::{
    AllianceRepo, BanRepo, ClanRepo, EconomyRepo, HistoryRepo, InviteRepo, MemberRepo, ReportRepo,
};

/// Handle to the clan directory: pool, schema, repositories, cache.
///
/// Cheap to clone; clones share the pool and the cache.
#[derive(Clone)]
pub struct ClanStore {
    pool: PgPool,
    cache: Arc<DirectoryCache<PgDirectorySource>>,
}

impl ClanStore {
    /// Connect and provision: pool ready, then schema ready, then the
    /// (initially stale) cache. Schema failure aborts.
    pub async fn connect(config: &StorageConfig) -> StoreResult<Self> {
        let pool = pool::create_pool(&config.database).await?;
        schema::ensure_schema(&pool).await?;

        let cache = DirectoryCache::new(
            PgDirectorySource::new(pool.clone()),
            Duration::from_secs(config.cache.ttl_secs),
        );

        Ok(Self {
            pool,
            cache: Arc::new(cache),
        })
    }

    /// One-shot legacy import. Clears and persists the document's clan
    /// section only when every row landed; a partial pass leaves the
    /// document untouched so the next startup retries.
    pub async fn import_legacy(&self, legacy: &mut LegacyStore) -> StoreResult<MigrationReport> {
        let report = migrate::migrate(&self.pool, legacy.data()).await?;

        if report.is_complete() && legacy.data().has_clans() {
            legacy.clear_clans();
            legacy.save()?;
            tracing::info!(path = %legacy.path().display(), "legacy clan section cleared");
        }

        Ok(report)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ---- repositories ----

    pub fn clans(&self) -> ClanRepo<'_> {
        ClanRepo::new(&self.pool)
    }

    pub fn members(&self) -> MemberRepo<'_> {
        MemberRepo::new(&self.pool)
    }

    pub fn alliances(&self) -> AllianceRepo<'_> {
        AllianceRepo::new(&self.pool)
    }

    pub fn bans(&self) -> BanRepo<'_> {
        BanRepo::new(&self.pool)
    }

    pub fn reports(&self) -> ReportRepo<'_> {
        ReportRepo::new(&self.pool)
    }

    pub fn economy(&self) -> EconomyRepo<'_> {
        EconomyRepo::new(&self.pool)
    }

    pub fn history(&self) -> HistoryRepo<'_> {
        HistoryRepo::new(&self.pool)
    }

    pub fn invites(&self) -> InviteRepo<'_> {
        InviteRepo::new(&self.pool)
    }

    // ---- directory cache ----

    /// Cached player→clan lookup, case-insensitive. `None` means "not in
    /// a clan", never a failure.
    pub async fn cached_player_clan(&self, player: &str) -> Option<String> {
        self.cache.player_clan(player).await
    }

    /// Cached snapshot of all clan names.
    pub async fn cached_clan_names(&self) -> Vec<String> {
        self.cache.clan_names().await
    }

    /// Force a cache rebuild regardless of freshness.
    pub async fn reload_cache(&self) -> RebuildReport {
        self.cache.reload().await
    }

    /// Drain and close the pool. Idempotent.
    pub async fn close(&self) {
        pool::close_pool(&self.pool).await;
    }
}
