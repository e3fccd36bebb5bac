//! Clan repository

use sqlx::{PgPool, Row};

use clanhall_core::{Clan, Privacy};

use crate::error::StoreResult;

pub struct ClanRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ClanRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or overwrite a clan row (replace semantics).
    pub async fn upsert(&self, clan: &Clan) -> StoreResult<()> {
        sqlx::query(
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
        .bind(&clan.name)
        .bind(&clan.founder)
        .bind(&clan.leader)
        .bind(clan.money)
        .bind(clan.privacy.as_str())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, name: &str) -> StoreResult<Option<Clan>> {
        let row = sqlx::query(
            "SELECT name, founder, leader, money, privacy FROM clans WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|row| Clan {
            name: row.get("name"),
            founder: row.get::<Option<String>, _>("founder").unwrap_or_default(),
            leader: row.get::<Option<String>, _>("leader").unwrap_or_default(),
            money: row.get("money"),
            privacy: Privacy::from_str(&row.get::<String, _>("privacy")).unwrap_or_default(),
        }))
    }

    pub async fn list_names(&self) -> StoreResult<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM clans ORDER BY name")
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.get("name")).collect())
    }

    pub async fn set_leader(&self, name: &str, leader: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE clans SET leader = $2 WHERE name = $1")
            .bind(name)
            .bind(leader)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_privacy(&self, name: &str, privacy: Privacy) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE clans SET privacy = $2 WHERE name = $1")
            .bind(name)
            .bind(privacy.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Adjust the treasury by `delta` (may be negative) and return the new
    /// balance, or `None` when the clan is missing or the withdrawal would
    /// take the treasury below zero. Single statement, no read-then-write.
    pub async fn update_money(&self, name: &str, delta: f64) -> StoreResult<Option<f64>> {
        let row = sqlx::query(
            r#"
            UPDATE clans SET money = money + $2
            WHERE name = $1 AND money + $2 >= 0
            RETURNING money
            "#,
        )
        .bind(name)
        .bind(delta)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|row| row.get("money")))
    }

    /// Delete a clan and its dependent rows.
    ///
    /// No foreign keys are declared, so the dependent tables are cleaned
    /// up with explicit statements here.
    pub async fn delete(&self, name: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM clans WHERE name = $1")
            .bind(name)
            .execute(self.pool)
            .await?;

        for stmt in [
            "DELETE FROM clan_users WHERE clan = $1",
            "DELETE FROM clan_invites WHERE clan = $1",
            "DELETE FROM alliances WHERE clan1 = $1 OR clan2 = $1",
            "DELETE FROM pending_alliances WHERE requester = $1 OR target = $1",
            "DELETE FROM friendlyfire WHERE clan = $1",
            "DELETE FROM friendlyfire_allies WHERE clan = $1",
        ] {
            sqlx::query(stmt).bind(name).execute(self.pool).await?;
        }

        Ok(result.rows_affected() > 0)
    }
}
