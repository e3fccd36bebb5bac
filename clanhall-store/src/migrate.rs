//! One-shot bulk import of legacy clan records
//!
//! Upserts carry replace semantics, so a partially-migrated document can
//! be retried and converges to the same rows. Membership rows for players
//! that have since left the document are deliberately never pruned here.

use sqlx::PgPool;

use clanhall_core::Privacy;

use crate::error::{StoreError, StoreResult};
use crate::legacy::LegacyData;

/// Outcome of one migration pass.
///
/// Row-level failures are contained: the failing clan is recorded and the
/// pass continues. The legacy document must only be cleared when
/// [`is_complete`](Self::is_complete) holds.
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// Clan rows upserted.
    pub clans: usize,
    /// Membership rows upserted.
    pub members: usize,
    /// Per-row failures, as [`StoreError::MigrationRow`] values.
    pub failures: Vec<StoreError>,
}

impl MigrationReport {
    /// True when every row landed and the source document may be cleared.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Import every clan in the document into the relational tables.
///
/// A document without a `Clans` section is a no-op and reports complete.
/// Each clan row and each membership row is an independent statement; one
/// clan failing leaves the others' rows untouched.
///
/// # Errors
///
/// Only infrastructure-level failures propagate ([`StoreError::PoolExhausted`]
/// when no connection can be had at all). Row-level failures land in the
/// report instead.
pub async fn migrate(pool: &PgPool, data: &LegacyData) -> StoreResult<MigrationReport> {
    let mut report = MigrationReport::default();

    let Some(clans) = data.clans.as_ref() else {
        tracing::info!("no legacy clan section, nothing to migrate");
        return Ok(report);
    };

    tracing::info!(clans = clans.len(), "migrating legacy clan records");

    for (name, entry) in clans {
        let privacy = Privacy::from_str(&entry.privacy).unwrap_or_default();

        let clan_result = sqlx::query(
            r#"
            INSERT INTO clans (name, founder, leader, money, privacy)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO UPDATE SET
                founder = EXCLUDED.founder,
                leader = EXCLUDED.leader,
                money = EXCLUDED.money,
                privacy = EXCLUDED.privacy
            "#,
        )
        .bind(name)
        .bind(&entry.founder)
        .bind(&entry.leader)
        .bind(entry.money)
        .bind(privacy.as_str())
        .execute(pool)
        .await;

        if let Err(e) = clan_result {
            if matches!(e, sqlx::Error::PoolTimedOut) {
                return Err(StoreError::PoolExhausted);
            }
            tracing::warn!(clan = %name, error = %e, "legacy clan upsert failed");
            report.failures.push(StoreError::migration_row(name, e.to_string()));
            continue;
        }
        report.clans += 1;

        for user in &entry.users {
            let user_result = sqlx::query(
                r#"
                INSERT INTO clan_users (clan, username)
                VALUES ($1, $2)
                ON CONFLICT (clan, username) DO NOTHING
                "#,
            )
            .bind(name)
            .bind(user)
            .execute(pool)
            .await;

            match user_result {
                Ok(_) => report.members += 1,
                Err(sqlx::Error::PoolTimedOut) => return Err(StoreError::PoolExhausted),
                Err(e) => {
                    tracing::warn!(clan = %name, user = %user, error = %e, "legacy membership upsert failed");
                    report
                        .failures
                        .push(StoreError::migration_row(name, format!("user '{user}': {e}")));
                }
            }
        }
    }

    if report.is_complete() {
        tracing::info!(
            clans = report.clans,
            members = report.members,
            "legacy migration complete"
        );
    } else {
        tracing::warn!(
            clans = report.clans,
            members = report.members,
            failures = report.failures.len(),
            "legacy migration finished with failures; source document kept for retry"
        );
    }

    Ok(report)
}
