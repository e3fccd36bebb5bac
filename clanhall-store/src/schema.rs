//! Schema provisioning for the clan directory tables
//!
//! Everything here is `CREATE ... IF NOT EXISTS`, safe to run on every
//! process start. No foreign keys are declared; the creation order is
//! fixed anyway so audits read the same on every deployment.

use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};

/// (table name, DDL) in provisioning order.
const TABLES: &[(&str, &str)] = &[
    (
        "clans",
        r#"
        CREATE TABLE IF NOT EXISTS clans (
            name VARCHAR(36) PRIMARY KEY,
            founder VARCHAR(36),
            leader VARCHAR(36),
            money DOUBLE PRECISION NOT NULL DEFAULT 0,
            privacy VARCHAR(12) NOT NULL DEFAULT 'open'
        )
        "#,
    ),
    (
        "clan_users",
        r#"
        CREATE TABLE IF NOT EXISTS clan_users (
            clan VARCHAR(36),
            username VARCHAR(36),
            PRIMARY KEY (clan, username)
        )
        "#,
    ),
    (
        "alliances",
        r#"
        CREATE TABLE IF NOT EXISTS alliances (
            clan1 VARCHAR(36),
            clan2 VARCHAR(36),
            friendly_fire BOOLEAN NOT NULL DEFAULT FALSE,
            PRIMARY KEY (clan1, clan2)
        )
        "#,
    ),
    (
        "pending_alliances",
        r#"
        CREATE TABLE IF NOT EXISTS pending_alliances (
            requester VARCHAR(36),
            target VARCHAR(36),
            PRIMARY KEY (requester, target)
        )
        "#,
    ),
    (
        "friendlyfire",
        r#"
        CREATE TABLE IF NOT EXISTS friendlyfire (
            clan VARCHAR(36) PRIMARY KEY,
            enabled BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    ),
    (
        "friendlyfire_allies",
        r#"
        CREATE TABLE IF NOT EXISTS friendlyfire_allies (
            clan VARCHAR(36) PRIMARY KEY,
            enabled BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    ),
    (
        "banned_clans",
        r#"
        CREATE TABLE IF NOT EXISTS banned_clans (
            name VARCHAR(36) PRIMARY KEY,
            reason TEXT
        )
        "#,
    ),
    (
        "reports",
        r#"
        CREATE TABLE IF NOT EXISTS reports (
            id BIGSERIAL PRIMARY KEY,
            clan VARCHAR(36),
            reason TEXT
        )
        "#,
    ),
    (
        "economy_players",
        r#"
        CREATE TABLE IF NOT EXISTS economy_players (
            player VARCHAR(36) PRIMARY KEY,
            balance DOUBLE PRECISION NOT NULL DEFAULT 0
        )
        "#,
    ),
    (
        "player_clan_history",
        r#"
        CREATE TABLE IF NOT EXISTS player_clan_history (
            uuid VARCHAR(36) PRIMARY KEY,
            name VARCHAR(16),
            current_clan VARCHAR(32),
            history TEXT
        )
        "#,
    ),
    (
        "clan_invites",
        r#"
        CREATE TABLE IF NOT EXISTS clan_invites (
            clan VARCHAR(36),
            username VARCHAR(36),
            invite_time BIGINT NOT NULL DEFAULT 0,
            PRIMARY KEY (clan, username)
        )
        "#,
    ),
];

/// Bring the schema to the expected shape without touching existing data.
///
/// # Errors
///
/// Any DDL failure maps to [`StoreError::Schema`] naming the table and
/// propagates; the process cannot run against a half-provisioned schema.
pub async fn ensure_schema(pool: &PgPool) -> StoreResult<()> {
    tracing::info!("provisioning clan directory schema");

    for &(table, ddl) in TABLES {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|source| StoreError::Schema { table, source })?;
    }

    create_indexes(pool).await?;

    tracing::info!(tables = TABLES.len(), "schema ready");
    Ok(())
}

async fn create_indexes(pool: &PgPool) -> StoreResult<()> {
    // The cache rebuild scans clan_users whole, but player-side lookups
    // and invite sweeps want these.
    for (table, ddl) in [
        (
            "clan_users",
            "CREATE INDEX IF NOT EXISTS idx_clan_users_username ON clan_users(username)",
        ),
        (
            "reports",
            "CREATE INDEX IF NOT EXISTS idx_reports_clan ON reports(clan)",
        ),
        (
            "clan_invites",
            "CREATE INDEX IF NOT EXISTS idx_clan_invites_username ON clan_invites(username)",
        ),
    ] {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|source| StoreError::Schema { table, source })?;
    }

    Ok(())
}
