// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway persistence: shared result cache and append-only audit log.
//!
//! Both tables live in the same SQLite database as the budget ledger so the
//! spend update and the audit row commit in one transaction. The cache
//! upsert is idempotent by fingerprint and commits *before* the ledger
//! write: a crash between the two leaves a cached result and no charge, so
//! the retried request is served as a hit instead of being re-billed.

use serde::{Deserialize, Serialize};
use tracing::info;

use noema_core::NoemaError;
use noema_cost::{BudgetLedger, SpendRecord};

/// A cached remote result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: String,
    /// JSON-encoded result payload.
    pub result: serde_json::Value,
    pub model: String,
    pub tokens_estimated: u32,
    /// Unix seconds after which the entry no longer counts as a hit.
    pub expires_at: i64,
}

/// One append-only audit row per terminal request path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: String,
    pub user_id: String,
    pub operation: String,
    pub model: String,
    pub request_tokens: u32,
    pub response_tokens: u32,
    pub cost_usd: f64,
    pub latency_ms: u64,
    pub cache_hit: bool,
    pub fingerprint: String,
    /// ISO 8601 timestamp.
    pub created_at: String,
}

impl AuditLogEntry {
    /// Fresh entry with a v4 id and the current timestamp.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: &str,
        operation: &str,
        model: &str,
        request_tokens: u32,
        response_tokens: u32,
        cost_usd: f64,
        latency_ms: u64,
        cache_hit: bool,
        fingerprint: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            operation: operation.to_string(),
            model: model.to_string(),
            request_tokens,
            response_tokens,
            cost_usd,
            latency_ms,
            cache_hit,
            fingerprint: fingerprint.to_string(),
            created_at: chrono::Utc::now()
                .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                .to_string(),
        }
    }
}

/// Convert a tokio-rusqlite error into NoemaError::Storage.
fn storage_err(e: tokio_rusqlite::Error) -> NoemaError {
    NoemaError::Storage {
        source: Box::new(e),
    }
}

/// SQLite-backed store for the gateway's cache and audit tables.
pub struct GatewayStore {
    conn: tokio_rusqlite::Connection,
}

impl GatewayStore {
    /// Wrap an existing connection and ensure the schema exists.
    pub async fn open(conn: tokio_rusqlite::Connection) -> Result<Self, NoemaError> {
        conn.call(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS result_cache (
                    fingerprint TEXT PRIMARY KEY NOT NULL,
                    result TEXT NOT NULL,
                    model TEXT NOT NULL,
                    tokens_estimated INTEGER NOT NULL DEFAULT 0,
                    expires_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS audit_log (
                    id TEXT PRIMARY KEY NOT NULL,
                    user_id TEXT NOT NULL,
                    operation TEXT NOT NULL,
                    model TEXT NOT NULL,
                    request_tokens INTEGER NOT NULL DEFAULT 0,
                    response_tokens INTEGER NOT NULL DEFAULT 0,
                    cost_usd REAL NOT NULL DEFAULT 0.0,
                    latency_ms INTEGER NOT NULL DEFAULT 0,
                    cache_hit INTEGER NOT NULL DEFAULT 0,
                    fingerprint TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_audit_user ON audit_log(user_id);
                CREATE INDEX IF NOT EXISTS idx_audit_fingerprint ON audit_log(fingerprint);",
            )?;
            Ok(())
        })
        .await
        .map_err(storage_err)?;

        Ok(Self { conn })
    }

    /// Read-before-write cache lookup. Expired entries are never returned.
    pub async fn cache_get(&self, fingerprint: &str) -> Result<Option<CacheEntry>, NoemaError> {
        let fingerprint = fingerprint.to_string();
        let now = chrono::Utc::now().timestamp();
        self.conn
            .call(move |conn| {
                let row = conn.query_row(
                    "SELECT fingerprint, result, model, tokens_estimated, expires_at
                     FROM result_cache WHERE fingerprint = ?1 AND expires_at > ?2",
                    rusqlite::params![fingerprint, now],
                    |row| {
                        let result_text: String = row.get(1)?;
                        Ok(CacheEntry {
                            fingerprint: row.get(0)?,
                            result: serde_json::from_str(&result_text)
                                .unwrap_or(serde_json::Value::Null),
                            model: row.get(2)?,
                            tokens_estimated: row.get::<_, i64>(3)? as u32,
                            expires_at: row.get(4)?,
                        })
                    },
                );
                match row {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(storage_err)
    }

    /// Idempotent cache upsert. Retrying the same fingerprint refreshes the
    /// row rather than duplicating it.
    pub async fn cache_put(&self, entry: CacheEntry) -> Result<(), NoemaError> {
        let result_text =
            serde_json::to_string(&entry.result).map_err(NoemaError::storage)?;
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO result_cache
                         (fingerprint, result, model, tokens_estimated, expires_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(fingerprint) DO UPDATE SET
                         result = excluded.result,
                         model = excluded.model,
                         tokens_estimated = excluded.tokens_estimated,
                         expires_at = excluded.expires_at",
                    rusqlite::params![
                        entry.fingerprint,
                        result_text,
                        entry.model,
                        entry.tokens_estimated as i64,
                        entry.expires_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// Append an audit row outside any spend (cache hits, denials).
    pub async fn insert_audit(&self, entry: AuditLogEntry) -> Result<(), NoemaError> {
        self.conn
            .call(move |conn| {
                insert_audit_tx(conn, &entry)?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// Settle a completed remote call: the ledger's additive spend update
    /// and the audit row commit in one transaction -- both or neither.
    pub async fn record_completion(
        &self,
        spend: SpendRecord,
        audit: AuditLogEntry,
    ) -> Result<(), NoemaError> {
        let user_id = audit.user_id.clone();
        let cost_usd = audit.cost_usd;
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                BudgetLedger::apply_spend_tx(&tx, &spend)?;
                insert_audit_tx(&tx, &audit)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(storage_err)?;

        info!(user_id = %user_id, cost_usd, "completion settled");
        Ok(())
    }

    /// Number of audit rows for a fingerprint (test/report helper).
    pub async fn audit_count(&self, fingerprint: &str) -> Result<u64, NoemaError> {
        let fingerprint = fingerprint.to_string();
        self.conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM audit_log WHERE fingerprint = ?1",
                    rusqlite::params![fingerprint],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(storage_err)
    }

    /// All audit rows for a user, oldest first (test/report helper).
    pub async fn audit_for_user(&self, user_id: &str) -> Result<Vec<AuditLogEntry>, NoemaError> {
        let user_id = user_id.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, user_id, operation, model, request_tokens, response_tokens,
                            cost_usd, latency_ms, cache_hit, fingerprint, created_at
                     FROM audit_log WHERE user_id = ?1 ORDER BY created_at",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![user_id], |row| {
                        Ok(AuditLogEntry {
                            id: row.get(0)?,
                            user_id: row.get(1)?,
                            operation: row.get(2)?,
                            model: row.get(3)?,
                            request_tokens: row.get::<_, i64>(4)? as u32,
                            response_tokens: row.get::<_, i64>(5)? as u32,
                            cost_usd: row.get(6)?,
                            latency_ms: row.get::<_, i64>(7)? as u64,
                            cache_hit: row.get::<_, i64>(8)? != 0,
                            fingerprint: row.get(9)?,
                            created_at: row.get(10)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(storage_err)
    }
}

/// The audit INSERT, usable inside a caller-owned transaction.
fn insert_audit_tx(
    conn: &rusqlite::Connection,
    entry: &AuditLogEntry,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO audit_log
             (id, user_id, operation, model, request_tokens, response_tokens,
              cost_usd, latency_ms, cache_hit, fingerprint, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            entry.id,
            entry.user_id,
            entry.operation,
            entry.model,
            entry.request_tokens as i64,
            entry.response_tokens as i64,
            entry.cost_usd,
            entry.latency_ms as i64,
            entry.cache_hit as i64,
            entry.fingerprint,
            entry.created_at,
        ],
    )?;
    Ok(())
}
