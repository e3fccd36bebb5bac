//! Clan invite repository
//!
//! Invites carry an epoch-millis timestamp so stale ones can be swept.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use clanhall_core::ClanInvite;

use crate::error::StoreResult;

pub struct InviteRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> InviteRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Invite a player. Re-inviting refreshes the timestamp.
    pub async fn invite(&self, clan: &str, username: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO clan_invites (clan, username, invite_time)
            VALUES ($1, $2, $3)
            ON CONFLICT (clan, username) DO UPDATE SET invite_time = EXCLUDED.invite_time
            "#,
        )
        .bind(clan)
        .bind(username)
        .bind(Utc::now().timestamp_millis())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    pub async fn revoke(&self, clan: &str, username: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM clan_invites WHERE clan = $1 AND username = $2")
            .bind(clan)
            .bind(username)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn is_invited(&self, clan: &str, username: &str) -> StoreResult<bool> {
        let row = sqlx::query("SELECT 1 AS one FROM clan_invites WHERE clan = $1 AND username = $2")
            .bind(clan)
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Outstanding invites for a player, newest first.
    pub async fn invites_for(&self, username: &str) -> StoreResult<Vec<ClanInvite>> {
        let rows = sqlx::query(
            r#"
            SELECT clan, username, invite_time FROM clan_invites
            WHERE username = $1 ORDER BY invite_time DESC
            "#,
        )
        .bind(username)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ClanInvite {
                clan: row.get("clan"),
                username: row.get("username"),
                invited_at: millis_to_datetime(row.get("invite_time")),
            })
            .collect())
    }

    /// Sweep invites older than `max_age`. Returns the number removed.
    pub async fn purge_older_than(&self, max_age: Duration) -> StoreResult<u64> {
        let cutoff = Utc::now().timestamp_millis() - max_age.as_millis() as i64;

        let result = sqlx::query("DELETE FROM clan_invites WHERE invite_time < $1")
            .bind(cutoff)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}
