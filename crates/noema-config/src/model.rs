// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Noema orchestration layer.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Noema configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NoemaConfig {
    /// Complexity classifier settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Local inference engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Embedding cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Retrieval pipeline settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Cost governor and budget settings.
    #[serde(default)]
    pub cost: CostConfig,

    /// Gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Complexity classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Score threshold above which paying users are routed remotely.
    #[serde(default = "default_paid_threshold")]
    pub paid_remote_threshold: f64,

    /// Score threshold above which free users are routed remotely.
    /// Higher than the paid threshold: free traffic stays local longer.
    #[serde(default = "default_free_threshold")]
    pub free_remote_threshold: f64,

    /// Character count at which the length factor saturates.
    #[serde(default = "default_length_saturation_chars")]
    pub length_saturation_chars: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            paid_remote_threshold: default_paid_threshold(),
            free_remote_threshold: default_free_threshold(),
            length_saturation_chars: default_length_saturation_chars(),
        }
    }
}

fn default_paid_threshold() -> f64 {
    0.6
}

fn default_free_threshold() -> f64 {
    0.75
}

fn default_length_saturation_chars() -> usize {
    2000
}

/// Local inference engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Default maximum summary length in characters.
    #[serde(default = "default_summary_max_length")]
    pub summary_max_length: usize,

    /// Default minimum validation score before summarization falls back
    /// to literal truncation (0.0-1.0).
    #[serde(default = "default_summary_min_quality")]
    pub summary_min_quality: f64,

    /// Default dimensionality for locally produced embeddings.
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,

    /// Maximum number of memoized outputs kept per capability.
    #[serde(default = "default_memo_capacity")]
    pub memo_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            summary_max_length: default_summary_max_length(),
            summary_min_quality: default_summary_min_quality(),
            embedding_dimensions: default_embedding_dimensions(),
            memo_capacity: default_memo_capacity(),
        }
    }
}

fn default_summary_max_length() -> usize {
    400
}

fn default_summary_min_quality() -> f64 {
    0.45
}

fn default_embedding_dimensions() -> usize {
    256
}

fn default_memo_capacity() -> usize {
    512
}

/// Embedding cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum number of cached vectors held in memory.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Default time-to-live for cached vectors, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub default_ttl_secs: u64,

    /// Interval between background expiry sweeps, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Path of the cache snapshot file. `None` keeps the cache memory-only.
    #[serde(default = "default_cache_path")]
    pub snapshot_path: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            default_ttl_secs: default_cache_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            snapshot_path: default_cache_path(),
        }
    }
}

fn default_cache_capacity() -> usize {
    5000
}

fn default_cache_ttl_secs() -> u64 {
    7 * 24 * 3600
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

fn default_cache_path() -> Option<String> {
    dirs::data_dir().map(|p| {
        p.join("noema")
            .join("vector-cache.json")
            .to_string_lossy()
            .into_owned()
    })
}

/// Retrieval pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Number of chunks returned per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Token budget per surviving chunk.
    #[serde(default = "default_chunk_token_budget")]
    pub chunk_token_budget: usize,

    /// Token-Jaccard similarity above which two chunks are considered duplicates.
    #[serde(default = "default_dedup_threshold")]
    pub dedup_threshold: f64,

    /// Enable the proximity/exact-term re-ranking pass.
    #[serde(default = "default_rerank_enabled")]
    pub rerank: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            chunk_token_budget: default_chunk_token_budget(),
            dedup_threshold: default_dedup_threshold(),
            rerank: default_rerank_enabled(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

fn default_chunk_token_budget() -> usize {
    160
}

fn default_dedup_threshold() -> f64 {
    0.8
}

fn default_rerank_enabled() -> bool {
    true
}

/// Cost governor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CostConfig {
    /// Daily spending limit in USD applied to users without an explicit limit.
    #[serde(default = "default_daily_limit_usd")]
    pub default_daily_limit_usd: f64,

    /// Utilization fraction at which a warning is logged.
    #[serde(default = "default_warn_fraction")]
    pub warn_fraction: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            default_daily_limit_usd: default_daily_limit_usd(),
            warn_fraction: default_warn_fraction(),
        }
    }
}

fn default_daily_limit_usd() -> f64 {
    0.50
}

fn default_warn_fraction() -> f64 {
    0.8
}

/// Gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Model used for the first attempt (cheapest tier).
    #[serde(default = "default_initial_model")]
    pub initial_model: String,

    /// Model used when escalation triggers.
    #[serde(default = "default_escalation_model")]
    pub escalation_model: String,

    /// Remote embedding model identifier.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Enable confidence-triggered escalation.
    #[serde(default = "default_escalation_enabled")]
    pub escalation_enabled: bool,

    /// Self-reported confidence below which escalation is considered.
    #[serde(default = "default_confidence_floor")]
    pub confidence_floor: f64,

    /// Result-cache expiry for chat-style operations, in seconds (7 days).
    #[serde(default = "default_result_ttl_secs")]
    pub result_ttl_secs: u64,

    /// Result-cache expiry for embeddings, in seconds (30 days).
    #[serde(default = "default_embedding_ttl_secs")]
    pub embedding_ttl_secs: u64,

    /// Path to the gateway SQLite database.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            initial_model: default_initial_model(),
            escalation_model: default_escalation_model(),
            embedding_model: default_embedding_model(),
            escalation_enabled: default_escalation_enabled(),
            confidence_floor: default_confidence_floor(),
            result_ttl_secs: default_result_ttl_secs(),
            embedding_ttl_secs: default_embedding_ttl_secs(),
            database_path: default_database_path(),
        }
    }
}

fn default_initial_model() -> String {
    "claude-haiku-4-5-20250901".to_string()
}

fn default_escalation_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_embedding_model() -> String {
    "noema-embed-v1".to_string()
}

fn default_escalation_enabled() -> bool {
    true
}

fn default_confidence_floor() -> f64 {
    0.75
}

fn default_result_ttl_secs() -> u64 {
    7 * 24 * 3600
}

fn default_embedding_ttl_secs() -> u64 {
    30 * 24 * 3600
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("noema").join("noema.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("noema.db"))
        .to_string_lossy()
        .into_owned()
}
