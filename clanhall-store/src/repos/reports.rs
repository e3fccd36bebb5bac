//! Report repository: append-only log of reports filed against clans

use sqlx::{PgPool, Row};

use clanhall_core::Report;

use crate::error::StoreResult;

pub struct ReportRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// File a report, returning its assigned id.
    pub async fn file(&self, clan: &str, reason: &str) -> StoreResult<i64> {
        let row = sqlx::query("INSERT INTO reports (clan, reason) VALUES ($1, $2) RETURNING id")
            .bind(clan)
            .bind(reason)
            .fetch_one(self.pool)
            .await?;

        Ok(row.get("id"))
    }

    pub async fn for_clan(&self, clan: &str) -> StoreResult<Vec<Report>> {
        let rows = sqlx::query("SELECT id, clan, reason FROM reports WHERE clan = $1 ORDER BY id")
            .bind(clan)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(report_from_row).collect())
    }

    /// Most recent reports across all clans, newest first.
    pub async fn recent(&self, limit: i64) -> StoreResult<Vec<Report>> {
        let rows = sqlx::query("SELECT id, clan, reason FROM reports ORDER BY id DESC LIMIT $1")
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(report_from_row).collect())
    }
}

fn report_from_row(row: sqlx::postgres::PgRow) -> Report {
    Report {
        id: row.get("id"),
        clan: row.get::<Option<String>, _>("clan").unwrap_or_default(),
        reason: row.get::<Option<String>, _>("reason").unwrap_or_default(),
    }
}
