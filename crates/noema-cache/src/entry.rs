// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached vector entries and their content-addressed fingerprints.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A cached embedding vector, content-addressed by (text, model).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedVector {
    /// sha-256 of text and model, hex-encoded.
    pub fingerprint: String,
    /// The embedding itself.
    pub vector: Vec<f32>,
    /// Model that produced the vector.
    pub model: String,
    /// Unix seconds at creation.
    pub created_at: i64,
    /// Time-to-live in seconds.
    pub ttl_secs: u64,
    /// Number of cache hits served.
    pub hit_count: u64,
    /// Unix seconds of the last access.
    pub last_accessed_at: i64,
}

impl CachedVector {
    /// Whether the entry has outlived its TTL at `now` (unix seconds).
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.created_at + self.ttl_secs as i64
    }

    /// Eviction score: hits plus a recency bonus. Higher survives longer.
    pub fn retention_score(&self, now: i64) -> f64 {
        let age_secs = (now - self.last_accessed_at).max(0);
        let recency_bonus = if age_secs < 3600 {
            2.0
        } else if age_secs < 86_400 {
            1.0
        } else {
            0.0
        };
        self.hit_count as f64 + recency_bonus
    }
}

/// Content-addressed fingerprint over (text, model).
///
/// Identical logical inputs always collide; that is the point.
pub fn vector_fingerprint(text: &str, model: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update([0x1f]);
    hasher.update(model.as_bytes());
    hex::encode(hasher.finalize())
}
