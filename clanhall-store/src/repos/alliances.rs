//! Alliance repository: confirmed pacts, pending proposals, and the
//! per-clan friendly-fire toggles.
//!
//! An alliance is an undirected relationship stored as one ordered pair;
//! reads check both orderings, writes store only the ordering given.

use sqlx::{PgPool, Row};

use clanhall_core::{Alliance, PendingAlliance};

use crate::error::StoreResult;

pub struct AllianceRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> AllianceRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a confirmed alliance. Friendly fire starts off.
    pub async fn form(&self, clan1: &str, clan2: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO alliances (clan1, clan2, friendly_fire)
            VALUES ($1, $2, FALSE)
            ON CONFLICT (clan1, clan2) DO NOTHING
            "#,
        )
        .bind(clan1)
        .bind(clan2)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    pub async fn dissolve(&self, clan1: &str, clan2: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM alliances
            WHERE (clan1 = $1 AND clan2 = $2) OR (clan1 = $2 AND clan2 = $1)
            "#,
        )
        .bind(clan1)
        .bind(clan2)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(&self, clan1: &str, clan2: &str) -> StoreResult<bool> {
        let row = sqlx::query(
            r#"
            SELECT 1 AS one FROM alliances
            WHERE (clan1 = $1 AND clan2 = $2) OR (clan1 = $2 AND clan2 = $1)
            "#,
        )
        .bind(clan1)
        .bind(clan2)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// All alliances a clan is part of, from either side of the pair.
    pub async fn allies_of(&self, clan: &str) -> StoreResult<Vec<Alliance>> {
        let rows = sqlx::query(
            "SELECT clan1, clan2, friendly_fire FROM alliances WHERE clan1 = $1 OR clan2 = $1",
        )
        .bind(clan)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Alliance {
                clan1: row.get("clan1"),
                clan2: row.get("clan2"),
                friendly_fire: row.get("friendly_fire"),
            })
            .collect())
    }

    pub async fn set_friendly_fire(
        &self,
        clan1: &str,
        clan2: &str,
        enabled: bool,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE alliances SET friendly_fire = $3
            WHERE (clan1 = $1 AND clan2 = $2) OR (clan1 = $2 AND clan2 = $1)
            "#,
        )
        .bind(clan1)
        .bind(clan2)
        .bind(enabled)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // ---- pending proposals ----

    pub async fn request(&self, requester: &str, target: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO pending_alliances (requester, target)
            VALUES ($1, $2)
            ON CONFLICT (requester, target) DO NOTHING
            "#,
        )
        .bind(requester)
        .bind(target)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    pub async fn withdraw(&self, requester: &str, target: &str) -> StoreResult<bool> {
        let result =
            sqlx::query("DELETE FROM pending_alliances WHERE requester = $1 AND target = $2")
                .bind(requester)
                .bind(target)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn is_requested(&self, requester: &str, target: &str) -> StoreResult<bool> {
        let row = sqlx::query(
            "SELECT 1 AS one FROM pending_alliances WHERE requester = $1 AND target = $2",
        )
        .bind(requester)
        .bind(target)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.is_some())
    }

    pub async fn requests_for(&self, target: &str) -> StoreResult<Vec<PendingAlliance>> {
        let rows = sqlx::query("SELECT requester, target FROM pending_alliances WHERE target = $1")
            .bind(target)
            .fetch_all(self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| PendingAlliance {
                requester: row.get("requester"),
                target: row.get("target"),
            })
            .collect())
    }

    /// Promote a pending proposal into a confirmed alliance.
    pub async fn accept(&self, requester: &str, target: &str) -> StoreResult<bool> {
        if !self.withdraw(requester, target).await? {
            return Ok(false);
        }
        self.form(requester, target).await?;
        Ok(true)
    }

    // ---- per-clan friendly-fire toggles ----

    pub async fn set_clan_friendly_fire(&self, clan: &str, enabled: bool) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO friendlyfire (clan, enabled)
            VALUES ($1, $2)
            ON CONFLICT (clan) DO UPDATE SET enabled = EXCLUDED.enabled
            "#,
        )
        .bind(clan)
        .bind(enabled)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Whether members of this clan may hurt each other. Off by default.
    pub async fn clan_friendly_fire(&self, clan: &str) -> StoreResult<bool> {
        let row = sqlx::query("SELECT enabled FROM friendlyfire WHERE clan = $1")
            .bind(clan)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|row| row.get("enabled")).unwrap_or(false))
    }

    pub async fn set_ally_friendly_fire(&self, clan: &str, enabled: bool) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO friendlyfire_allies (clan, enabled)
            VALUES ($1, $2)
            ON CONFLICT (clan) DO UPDATE SET enabled = EXCLUDED.enabled
            "#,
        )
        .bind(clan)
        .bind(enabled)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    pub async fn ally_friendly_fire(&self, clan: &str) -> StoreResult<bool> {
        let row = sqlx::query("SELECT enabled FROM friendlyfire_allies WHERE clan = $1")
            .bind(clan)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|row| row.get("enabled")).unwrap_or(false))
    }
}
