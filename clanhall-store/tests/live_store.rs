//! Live-database integration tests
//!
//! These exercise schema provisioning, legacy migration, and the cache
//! against a real Postgres. Run with:
//!
//!   DATABASE_URL=postgres://... cargo test -p clanhall-store -- --ignored

use std::collections::BTreeMap;

use clanhall_core::{CacheConfig, DatabaseConfig, StorageConfig};
use clanhall_store::{ClanStore, LegacyClan, LegacyData, LegacyStore};

fn test_config() -> StorageConfig {
    // DatabaseConfig::url() prefers DATABASE_URL, so the fields below are
    // placeholders for local runs.
    StorageConfig {
        database: DatabaseConfig {
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
        },
        cache: CacheConfig { ttl_secs: 300 },
    }
}

async fn connect() -> ClanStore {
    std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    ClanStore::connect(&test_config())
        .await
        .expect("store connect failed")
}

fn reds_document() -> LegacyData {
    let mut clans = BTreeMap::new();
    clans.insert(
        "Reds".to_string(),
        LegacyClan {
            founder: "u1".into(),
            leader: "u1".into(),
            money: 100.0,
            privacy: "open".into(),
            users: vec!["u1".into(), "u2".into()],
        },
    );
    LegacyData {
        clans: Some(clans),
        rest: BTreeMap::new(),
    }
}

async fn scrub(store: &ClanStore, clan: &str) {
    store.clans().delete(clan).await.expect("scrub failed");
}

#[tokio::test]
#[ignore = "requires database"]
async fn migrates_reds_scenario() {
    let store = connect().await;
    scrub(&store, "Reds").await;

    let report = clanhall_store::migrate::migrate(store.pool(), &reds_document())
        .await
        .expect("migration failed");

    assert!(report.is_complete());
    assert_eq!(report.clans, 1);
    assert_eq!(report.members, 2);

    let clan = store
        .clans()
        .get("Reds")
        .await
        .expect("query failed")
        .expect("Reds missing");
    assert_eq!(clan.founder, "u1");
    assert_eq!(clan.leader, "u1");
    assert_eq!(clan.money, 100.0);
    assert_eq!(clan.privacy.as_str(), "open");

    let members = store.members().members_of("Reds").await.expect("query failed");
    assert_eq!(members, vec!["u1".to_string(), "u2".to_string()]);

    scrub(&store, "Reds").await;
    store.close().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn migration_without_clans_section_is_a_noop() {
    let store = connect().await;

    let before = store.clans().list_names().await.expect("query failed");

    let report = clanhall_store::migrate::migrate(store.pool(), &LegacyData::default())
        .await
        .expect("migration failed");

    assert!(report.is_complete());
    assert_eq!(report.clans, 0);

    let after = store.clans().list_names().await.expect("query failed");
    assert_eq!(before, after);

    store.close().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn migration_is_idempotent_on_content() {
    let store = connect().await;
    scrub(&store, "Reds").await;

    let doc = reds_document();
    clanhall_store::migrate::migrate(store.pool(), &doc)
        .await
        .expect("first pass failed");

    let clan_first = store.clans().get("Reds").await.unwrap().unwrap();
    let members_first = store.members().members_of("Reds").await.unwrap();

    clanhall_store::migrate::migrate(store.pool(), &doc)
        .await
        .expect("second pass failed");

    let clan_second = store.clans().get("Reds").await.unwrap().unwrap();
    let members_second = store.members().members_of("Reds").await.unwrap();

    assert_eq!(clan_first.founder, clan_second.founder);
    assert_eq!(clan_first.money, clan_second.money);
    assert_eq!(members_first, members_second);

    scrub(&store, "Reds").await;
    store.close().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn import_clears_document_after_complete_pass() {
    let store = connect().await;
    scrub(&store, "Reds").await;

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("data.yml");
    {
        let doc = reds_document();
        std::fs::write(&path, serde_yaml::to_string(&doc).unwrap()).unwrap();
    }

    let mut legacy = LegacyStore::load(&path).expect("legacy load failed");
    let report = store.import_legacy(&mut legacy).await.expect("import failed");
    assert!(report.is_complete());

    // The persisted document must no longer carry the section.
    let reloaded = LegacyStore::load(&path).expect("legacy reload failed");
    assert!(reloaded.data().clans.is_none());

    scrub(&store, "Reds").await;
    store.close().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn cache_reflects_database_after_reload() {
    let store = connect().await;
    scrub(&store, "Cachers").await;

    let clan = clanhall_core::Clan::new("Cachers", "cacher_one");
    store.clans().upsert(&clan).await.expect("upsert failed");
    store.members().add("Cachers", "Cacher_One").await.expect("add failed");

    let report = store.reload_cache().await;
    assert!(report.is_complete());

    // Case-insensitive on the player side.
    assert_eq!(
        store.cached_player_clan("cacher_one").await.as_deref(),
        Some("Cachers")
    );
    assert!(store
        .cached_clan_names()
        .await
        .contains(&"Cachers".to_string()));

    scrub(&store, "Cachers").await;
    store.reload_cache().await;
    store.close().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn repositories_round_trip() {
    let store = connect().await;
    scrub(&store, "RepoReds").await;
    scrub(&store, "RepoBlues").await;

    let clan = clanhall_core::Clan::new("RepoReds", "founder1");
    store.clans().upsert(&clan).await.unwrap();
    store.clans().upsert(&clanhall_core::Clan::new("RepoBlues", "founder2")).await.unwrap();

    // Treasury floor at zero.
    assert_eq!(store.clans().update_money("RepoReds", 50.0).await.unwrap(), Some(50.0));
    assert_eq!(store.clans().update_money("RepoReds", -100.0).await.unwrap(), None);

    // Alliance round trip, read from either ordering.
    store.alliances().request("RepoReds", "RepoBlues").await.unwrap();
    assert!(store.alliances().accept("RepoReds", "RepoBlues").await.unwrap());
    assert!(store.alliances().exists("RepoBlues", "RepoReds").await.unwrap());

    // Economy guard.
    sqlx::query("DELETE FROM economy_players WHERE player = $1")
        .bind("eco_p1")
        .execute(store.pool())
        .await
        .unwrap();
    assert_eq!(store.economy().deposit("eco_p1", 10.0).await.unwrap(), 10.0);
    assert_eq!(store.economy().withdraw("eco_p1", 25.0).await.unwrap(), None);
    assert_eq!(store.economy().withdraw("eco_p1", 4.0).await.unwrap(), Some(6.0));

    // Clan history appends on change only.
    sqlx::query("DELETE FROM player_clan_history WHERE uuid = $1")
        .bind("hist_u1")
        .execute(store.pool())
        .await
        .unwrap();
    store.history().record("hist_u1", Some("Steve"), Some("RepoReds")).await.unwrap();
    store.history().record("hist_u1", Some("Steve"), Some("RepoReds")).await.unwrap();
    store.history().record("hist_u1", Some("Steve"), Some("RepoBlues")).await.unwrap();
    let hist = store.history().get("hist_u1").await.unwrap().unwrap();
    assert_eq!(hist.current_clan.as_deref(), Some("RepoBlues"));
    assert_eq!(hist.history.len(), 2);

    // Invites and expiry sweep.
    store.invites().invite("RepoReds", "invitee").await.unwrap();
    assert!(store.invites().is_invited("RepoReds", "invitee").await.unwrap());
    let purged = store
        .invites()
        .purge_older_than(std::time::Duration::ZERO)
        .await
        .unwrap();
    assert!(purged >= 1);

    scrub(&store, "RepoReds").await;
    scrub(&store, "RepoBlues").await;
    store.close().await;
}
