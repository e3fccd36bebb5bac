//! Directory cache: player→clan and clan-name projections
//!
//! Read-through with a fixed TTL. The projections live behind a single
//! `RwLock` so readers always see a complete snapshot, and a separate
//! rebuild mutex collapses concurrent staleness detections into one
//! rebuild; waiters re-check the timestamp and skip.
//!
//! The staleness clock restarts on every rebuild *attempt*, so a
//! struggling database is asked again once per TTL window, not once per
//! lookup.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tokio::sync::{Mutex, RwLock};

use crate::error::{StoreError, StoreResult};

/// Data source the cache rebuilds from.
///
/// Kept as a seam so the rebuild policy is testable without a database;
/// production uses [`PgDirectorySource`].
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// Full membership table: (player, clan) pairs.
    async fn load_memberships(&self) -> StoreResult<Vec<(String, String)>>;

    /// Full clan-name listing.
    async fn load_clan_names(&self) -> StoreResult<Vec<String>>;
}

/// Production source: two independent full-table reads.
pub struct PgDirectorySource {
    pool: PgPool,
}

impl PgDirectorySource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectorySource for PgDirectorySource {
    async fn load_memberships(&self) -> StoreResult<Vec<(String, String)>> {
        let rows = sqlx::query("SELECT username, clan FROM clan_users")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("username"), row.get("clan")))
            .collect())
    }

    async fn load_clan_names(&self) -> StoreResult<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM clans")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.get("name")).collect())
    }
}

/// Outcome of one rebuild attempt.
///
/// A failed projection read keeps its previous snapshot; the typed error
/// lands here so callers can tell "stale because nobody asked" from
/// "stale because the database is failing".
#[derive(Debug, Default)]
pub struct RebuildReport {
    /// Entries in the player→clan projection after the attempt.
    pub players: usize,
    /// Entries in the clan-name projection after the attempt.
    pub clans: usize,
    /// Per-projection failures, as [`StoreError::CacheRebuild`] values.
    pub failures: Vec<StoreError>,
}

impl RebuildReport {
    /// True when both projections were rebuilt from the database.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Projections {
    player_clan: HashMap<String, String>,
    clan_names: HashSet<String>,
    last_attempt: Option<Instant>,
}

impl Projections {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.last_attempt
            .is_some_and(|stamp| stamp.elapsed() < ttl)
    }
}

/// Time-bounded, rebuildable projection of the clan directory.
pub struct DirectoryCache<S> {
    source: S,
    ttl: Duration,
    state: RwLock<Projections>,
    /// Held for the duration of a rebuild; collapses concurrent attempts.
    rebuild: Mutex<()>,
}

impl<S: DirectorySource> DirectoryCache<S> {
    /// A cache that starts stale: the first lookup rebuilds.
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            state: RwLock::new(Projections {
                player_clan: HashMap::new(),
                clan_names: HashSet::new(),
                last_attempt: None,
            }),
            rebuild: Mutex::new(()),
        }
    }

    /// The clan the player is in, matched case-insensitively.
    ///
    /// Absence is a normal `None`, never an error; a rebuild failure on a
    /// stale cache degrades to the previous snapshot.
    pub async fn player_clan(&self, player: &str) -> Option<String> {
        self.ensure_fresh().await;

        let state = self.state.read().await;
        state.player_clan.get(&player.to_lowercase()).cloned()
    }

    /// Snapshot of all known clan names, sorted.
    ///
    /// The returned vector is owned; mutating it does not touch the cache.
    pub async fn clan_names(&self) -> Vec<String> {
        self.ensure_fresh().await;

        let state = self.state.read().await;
        let mut names: Vec<String> = state.clan_names.iter().cloned().collect();
        names.sort();
        names
    }

    /// Unconditional rebuild of both projections.
    pub async fn reload(&self) -> RebuildReport {
        let _guard = self.rebuild.lock().await;
        self.rebuild_projections().await
    }

    async fn ensure_fresh(&self) {
        {
            let state = self.state.read().await;
            if state.is_fresh(self.ttl) {
                return;
            }
        }

        let _guard = self.rebuild.lock().await;

        // Whoever held the lock before us may have already rebuilt.
        {
            let state = self.state.read().await;
            if state.is_fresh(self.ttl) {
                return;
            }
        }

        self.rebuild_projections().await;
    }

    /// Caller must hold the rebuild mutex.
    ///
    /// Loads happen before the write lock is taken, so readers keep the
    /// old snapshot for the whole rebuild and never see a partial one.
    async fn rebuild_projections(&self) -> RebuildReport {
        let memberships = self.source.load_memberships().await;
        let clan_names = self.source.load_clan_names().await;

        let mut report = RebuildReport::default();
        let mut state = self.state.write().await;

        match memberships {
            Ok(rows) => {
                state.player_clan = rows
                    .into_iter()
                    .map(|(player, clan)| (player.to_lowercase(), clan))
                    .collect();
            }
            Err(e) => {
                tracing::warn!(error = %e, "player-clan rebuild failed; keeping previous snapshot");
                report
                    .failures
                    .push(StoreError::cache_rebuild("player-clan projection", e));
            }
        }

        match clan_names {
            Ok(rows) => {
                state.clan_names = rows.into_iter().collect();
            }
            Err(e) => {
                tracing::warn!(error = %e, "clan-name rebuild failed; keeping previous snapshot");
                report
                    .failures
                    .push(StoreError::cache_rebuild("clan-name projection", e));
            }
        }

        // Stamp even on failure, or a down database gets hammered once
        // per lookup instead of once per TTL window.
        state.last_attempt = Some(Instant::now());

        report.players = state.player_clan.len();
        report.clans = state.clan_names.len();
        report
    }
}
