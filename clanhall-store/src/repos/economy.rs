//! Per-player economy balances

use sqlx::{PgPool, Row};

use crate::error::StoreResult;

pub struct EconomyRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> EconomyRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn balance(&self, player: &str) -> StoreResult<Option<f64>> {
        let row = sqlx::query("SELECT balance FROM economy_players WHERE player = $1")
            .bind(player)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|row| row.get("balance")))
    }

    pub async fn set_balance(&self, player: &str, balance: f64) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO economy_players (player, balance)
            VALUES ($1, $2)
            ON CONFLICT (player) DO UPDATE SET balance = EXCLUDED.balance
            "#,
        )
        .bind(player)
        .bind(balance)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Credit a player, creating the row on first deposit. Returns the
    /// new balance.
    pub async fn deposit(&self, player: &str, amount: f64) -> StoreResult<f64> {
        let row = sqlx::query(
            r#"
            INSERT INTO economy_players (player, balance)
            VALUES ($1, $2)
            ON CONFLICT (player) DO UPDATE SET balance = economy_players.balance + EXCLUDED.balance
            RETURNING balance
            "#,
        )
        .bind(player)
        .bind(amount)
        .fetch_one(self.pool)
        .await?;

        Ok(row.get("balance"))
    }

    /// Debit a player. Returns the new balance, or `None` when the player
    /// is unknown or the balance would go negative. Single guarded
    /// statement, no read-then-write window.
    pub async fn withdraw(&self, player: &str, amount: f64) -> StoreResult<Option<f64>> {
        let row = sqlx::query(
            r#"
            UPDATE economy_players SET balance = balance - $2
            WHERE player = $1 AND balance >= $2
            RETURNING balance
            "#,
        )
        .bind(player)
        .bind(amount)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|row| row.get("balance")))
    }
}
