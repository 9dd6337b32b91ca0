// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user, per-day budget ledger backed by SQLite.
//!
//! One additive row per user per day; a new day implicitly creates a new
//! row on first spend. All operations go through the single tokio-rusqlite
//! background thread.

use serde::{Deserialize, Serialize};
use tracing::info;

use noema_core::NoemaError;

/// One ledger row: a user's realized spend for one UTC day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLedgerEntry {
    pub user_id: String,
    /// UTC day, "YYYY-MM-DD".
    pub date: String,
    /// Realized spend so far. Only ever increases.
    pub spent_usd: f64,
    pub spent_tokens_in: u64,
    pub spent_tokens_out: u64,
    /// The limit in force for this user.
    pub daily_limit_usd: f64,
}

impl BudgetLedgerEntry {
    /// Remaining budget, clamped at zero.
    pub fn remaining_usd(&self) -> f64 {
        (self.daily_limit_usd - self.spent_usd).max(0.0)
    }

    /// Spend as a fraction of the limit. A zero limit counts as fully used.
    pub fn utilization(&self) -> f64 {
        if self.daily_limit_usd <= 0.0 {
            return 1.0;
        }
        self.spent_usd / self.daily_limit_usd
    }
}

/// A settled spend to be added to the ledger.
#[derive(Debug, Clone)]
pub struct SpendRecord {
    pub user_id: String,
    /// UTC day, "YYYY-MM-DD".
    pub date: String,
    pub cost_usd: f64,
    pub tokens_in: u64,
    pub tokens_out: u64,
}

/// Convert a tokio-rusqlite error into NoemaError::Storage.
fn storage_err(e: tokio_rusqlite::Error) -> NoemaError {
    NoemaError::Storage {
        source: Box::new(e),
    }
}

/// Persistent per-user daily budget ledger.
pub struct BudgetLedger {
    conn: tokio_rusqlite::Connection,
    default_daily_limit_usd: f64,
}

impl BudgetLedger {
    /// Wrap an existing connection and ensure the schema exists.
    pub async fn open(
        conn: tokio_rusqlite::Connection,
        default_daily_limit_usd: f64,
    ) -> Result<Self, NoemaError> {
        conn.call(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS budget_ledger (
                    user_id TEXT NOT NULL,
                    date TEXT NOT NULL,
                    spent_usd REAL NOT NULL DEFAULT 0.0,
                    spent_tokens_in INTEGER NOT NULL DEFAULT 0,
                    spent_tokens_out INTEGER NOT NULL DEFAULT 0,
                    PRIMARY KEY (user_id, date)
                );
                CREATE TABLE IF NOT EXISTS user_limits (
                    user_id TEXT PRIMARY KEY NOT NULL,
                    daily_limit_usd REAL NOT NULL
                );",
            )?;
            Ok(())
        })
        .await
        .map_err(storage_err)?;

        Ok(Self {
            conn,
            default_daily_limit_usd,
        })
    }

    /// Today's UTC date key.
    pub fn today() -> String {
        chrono::Utc::now().format("%Y-%m-%d").to_string()
    }

    /// Set a user's daily limit, overriding the configured default.
    pub async fn set_daily_limit(
        &self,
        user_id: &str,
        daily_limit_usd: f64,
    ) -> Result<(), NoemaError> {
        let user_id = user_id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO user_limits (user_id, daily_limit_usd) VALUES (?1, ?2)
                     ON CONFLICT(user_id) DO UPDATE SET daily_limit_usd = excluded.daily_limit_usd",
                    rusqlite::params![user_id, daily_limit_usd],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// The ledger entry for (user, date). A day with no spend yet reads as
    /// a zero entry; the row itself is created on first spend.
    pub async fn entry(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<BudgetLedgerEntry, NoemaError> {
        let user = user_id.to_string();
        let day = date.to_string();
        let default_limit = self.default_daily_limit_usd;
        self.conn
            .call(move |conn| {
                let limit: f64 = conn
                    .query_row(
                        "SELECT daily_limit_usd FROM user_limits WHERE user_id = ?1",
                        rusqlite::params![user],
                        |row| row.get(0),
                    )
                    .unwrap_or(default_limit);

                let row = conn.query_row(
                    "SELECT spent_usd, spent_tokens_in, spent_tokens_out
                     FROM budget_ledger WHERE user_id = ?1 AND date = ?2",
                    rusqlite::params![user, day],
                    |row| {
                        Ok((
                            row.get::<_, f64>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, i64>(2)?,
                        ))
                    },
                );
                let (spent_usd, tokens_in, tokens_out) = match row {
                    Ok(v) => v,
                    Err(rusqlite::Error::QueryReturnedNoRows) => (0.0, 0, 0),
                    Err(e) => return Err(e.into()),
                };

                Ok(BudgetLedgerEntry {
                    user_id: user,
                    date: day,
                    spent_usd,
                    spent_tokens_in: tokens_in as u64,
                    spent_tokens_out: tokens_out as u64,
                    daily_limit_usd: limit,
                })
            })
            .await
            .map_err(storage_err)
    }

    /// Add realized spend to the user's row for the day, creating it if
    /// needed. Additive only: totals never decrease.
    pub async fn apply_spend(&self, record: SpendRecord) -> Result<(), NoemaError> {
        let logged = record.clone();
        self.conn
            .call(move |conn| {
                Self::apply_spend_tx(conn, &record)?;
                Ok(())
            })
            .await
            .map_err(storage_err)?;

        info!(
            user_id = %logged.user_id,
            date = %logged.date,
            cost_usd = logged.cost_usd,
            tokens_in = logged.tokens_in,
            tokens_out = logged.tokens_out,
            "spend recorded"
        );
        Ok(())
    }

    /// The additive UPSERT, usable inside a caller-owned transaction so the
    /// ledger update can commit together with other writes.
    pub fn apply_spend_tx(
        conn: &rusqlite::Connection,
        record: &SpendRecord,
    ) -> Result<(), rusqlite::Error> {
        conn.execute(
            "INSERT INTO budget_ledger
                 (user_id, date, spent_usd, spent_tokens_in, spent_tokens_out)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id, date) DO UPDATE SET
                 spent_usd = spent_usd + excluded.spent_usd,
                 spent_tokens_in = spent_tokens_in + excluded.spent_tokens_in,
                 spent_tokens_out = spent_tokens_out + excluded.spent_tokens_out",
            rusqlite::params![
                record.user_id,
                record.date,
                record.cost_usd,
                record.tokens_in as i64,
                record.tokens_out as i64,
            ],
        )?;
        Ok(())
    }
}
