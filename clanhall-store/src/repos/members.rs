//! Membership repository
//!
//! "A player belongs to at most one clan" is a caller-enforced rule; the
//! schema only guards against duplicate (clan, player) pairs.

use sqlx::{PgPool, Row};

use crate::error::StoreResult;

pub struct MemberRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> MemberRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a player to a clan. Re-adding is a no-op.
    pub async fn add(&self, clan: &str, username: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO clan_users (clan, username)
            VALUES ($1, $2)
            ON CONFLICT (clan, username) DO NOTHING
            "#,
        )
        .bind(clan)
        .bind(username)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    pub async fn remove(&self, clan: &str, username: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM clan_users WHERE clan = $1 AND username = $2")
            .bind(clan)
            .bind(username)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The clan a player belongs to, straight from the database.
    ///
    /// The directory cache answers the hot-path version of this; use this
    /// one when staleness is not acceptable.
    pub async fn clan_of(&self, username: &str) -> StoreResult<Option<String>> {
        let row = sqlx::query("SELECT clan FROM clan_users WHERE username = $1")
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|row| row.get("clan")))
    }

    pub async fn members_of(&self, clan: &str) -> StoreResult<Vec<String>> {
        let rows = sqlx::query("SELECT username FROM clan_users WHERE clan = $1 ORDER BY username")
            .bind(clan)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.get("username")).collect())
    }

    pub async fn count(&self, clan: &str) -> StoreResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM clan_users WHERE clan = $1")
            .bind(clan)
            .fetch_one(self.pool)
            .await?;

        Ok(row.get("n"))
    }
}
