//! Banned-clan repository

use sqlx::{PgPool, Row};

use clanhall_core::BannedClan;

use crate::error::StoreResult;

pub struct BanRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> BanRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Ban a clan name. Re-banning overwrites the reason.
    pub async fn ban(&self, name: &str, reason: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO banned_clans (name, reason)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET reason = EXCLUDED.reason
            "#,
        )
        .bind(name)
        .bind(reason)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    pub async fn unban(&self, name: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM banned_clans WHERE name = $1")
            .bind(name)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn is_banned(&self, name: &str) -> StoreResult<bool> {
        let row = sqlx::query("SELECT 1 AS one FROM banned_clans WHERE name = $1")
            .bind(name)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.is_some())
    }

    pub async fn get(&self, name: &str) -> StoreResult<Option<BannedClan>> {
        let row = sqlx::query("SELECT name, reason FROM banned_clans WHERE name = $1")
            .bind(name)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|row| BannedClan {
            name: row.get("name"),
            reason: row.get::<Option<String>, _>("reason").unwrap_or_default(),
        }))
    }
}
