//! Player clan-history repository
//!
//! One row per player; the `history` column holds a JSON array of
//! entries and only ever grows. A row that fails to parse is treated as
//! an empty history rather than poisoning the whole record.

use chrono::Utc;
use sqlx::{PgPool, Row};

use clanhall_core::{HistoryEntry, PlayerClanHistory};

use crate::error::StoreResult;

pub struct HistoryRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> HistoryRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, uuid: &str) -> StoreResult<Option<PlayerClanHistory>> {
        let row = sqlx::query(
            "SELECT uuid, name, current_clan, history FROM player_clan_history WHERE uuid = $1",
        )
        .bind(uuid)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|row| {
            let raw: Option<String> = row.get("history");
            PlayerClanHistory {
                uuid: row.get("uuid"),
                name: row.get("name"),
                current_clan: row.get("current_clan"),
                history: parse_history(uuid, raw.as_deref()),
            }
        }))
    }

    /// Record where a player is now. Appends a history entry whenever the
    /// clan changed (including to "no clan" and back).
    pub async fn record(
        &self,
        uuid: &str,
        name: Option<&str>,
        current_clan: Option<&str>,
    ) -> StoreResult<()> {
        let existing = self.get(uuid).await?;

        let mut history = existing.as_ref().map(|h| h.history.clone()).unwrap_or_default();
        let changed = existing.as_ref().map(|h| h.current_clan.as_deref()) != Some(current_clan);

        if changed {
            if let Some(clan) = current_clan {
                history.push(HistoryEntry {
                    clan: clan.to_string(),
                    joined_at: Utc::now(),
                });
            }
        }

        let serialized = serde_json::to_string(&history).unwrap_or_else(|_| "[]".to_string());

        sqlx::query(
            r#"
            INSERT INTO player_clan_history (uuid, name, current_clan, history)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (uuid) DO UPDATE SET
                name = EXCLUDED.name,
                current_clan = EXCLUDED.current_clan,
                history = EXCLUDED.history
            "#,
        )
        .bind(uuid)
        .bind(name)
        .bind(current_clan)
        .bind(serialized)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

fn parse_history(uuid: &str, raw: Option<&str>) -> Vec<HistoryEntry> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(uuid = %uuid, error = %e, "unreadable clan history, treating as empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_history_tolerates_garbage() {
        assert!(parse_history("u1", None).is_empty());
        assert!(parse_history("u1", Some("not json")).is_empty());
        assert!(parse_history("u1", Some("[]")).is_empty());
    }

    #[test]
    fn parse_history_round_trips() {
        let entries = vec![HistoryEntry {
            clan: "Reds".into(),
            joined_at: Utc::now(),
        }];
        let raw = serde_json::to_string(&entries).unwrap();
        assert_eq!(parse_history("u1", Some(&raw)), entries);
    }
}
