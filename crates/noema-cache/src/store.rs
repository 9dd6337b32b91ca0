// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory vector cache with TTL expiry, usage-weighted eviction, and
//! snapshot persistence through a [`CacheRepository`].
//!
//! Reads proceed concurrently; mutations take the single write lock. The
//! background sweep holds the lock only for the one mutation step, so it
//! never blocks foreground reads for long and never observes a torn entry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::entry::{vector_fingerprint, CachedVector};
use crate::repository::CacheRepository;

/// Fraction of capacity evicted in one batch under pressure.
const EVICTION_FRACTION: f64 = 0.10;

/// Counters surfaced for observability.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
    pub expirations: AtomicU64,
}

/// Content-addressed (text, model) → vector cache.
pub struct VectorCache {
    entries: RwLock<HashMap<String, CachedVector>>,
    repo: Arc<dyn CacheRepository>,
    capacity: usize,
    default_ttl_secs: u64,
    stats: CacheStats,
}

impl VectorCache {
    /// Open the cache, loading the persisted snapshot. Entries that expired
    /// while the process was down are dropped silently.
    pub fn open(
        repo: Arc<dyn CacheRepository>,
        capacity: usize,
        default_ttl_secs: u64,
    ) -> Self {
        let now = now_secs();
        let loaded = match repo.load() {
            Ok(entries) => entries,
            Err(e) => {
                // Correctness over caching: a broken snapshot is an empty cache.
                warn!(error = %e, "failed to load vector cache snapshot, starting empty");
                Vec::new()
            }
        };
        let before = loaded.len();
        let entries: HashMap<String, CachedVector> = loaded
            .into_iter()
            .filter(|e| !e.is_expired(now))
            .map(|e| (e.fingerprint.clone(), e))
            .collect();
        if entries.len() < before {
            debug!(
                dropped = before - entries.len(),
                "dropped expired entries at startup"
            );
        }
        info!(entries = entries.len(), capacity, "vector cache loaded");
        Self {
            entries: RwLock::new(entries),
            repo,
            capacity: capacity.max(1),
            default_ttl_secs,
            stats: CacheStats::default(),
        }
    }

    /// Look up the vector for (text, model). Expired entries never count
    /// as hits.
    pub fn get(&self, text: &str, model: &str) -> Option<Vec<f32>> {
        let fingerprint = vector_fingerprint(text, model);
        let now = now_secs();

        {
            let entries = self.entries.read().expect("cache lock poisoned");
            match entries.get(&fingerprint) {
                Some(entry) if !entry.is_expired(now) => {}
                _ => {
                    self.stats.misses.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
            }
        }

        // Upgrade to the write lock to bump usage counters.
        let mut entries = self.entries.write().expect("cache lock poisoned");
        let entry = entries.get_mut(&fingerprint)?;
        if entry.is_expired(now) {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        entry.hit_count += 1;
        entry.last_accessed_at = now;
        self.stats.hits.fetch_add(1, Ordering::Relaxed);
        Some(entry.vector.clone())
    }

    /// Insert or refresh a vector. Persists the snapshot; on overflow the
    /// lowest-scoring tenth is evicted first.
    pub fn put(&self, text: &str, vector: Vec<f32>, model: &str, ttl: Option<Duration>) {
        let fingerprint = vector_fingerprint(text, model);
        let now = now_secs();
        let ttl_secs = ttl.map(|d| d.as_secs()).unwrap_or(self.default_ttl_secs);

        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.insert(
            fingerprint.clone(),
            CachedVector {
                fingerprint,
                vector,
                model: model.to_string(),
                created_at: now,
                ttl_secs,
                hit_count: 0,
                last_accessed_at: now,
            },
        );
        if entries.len() > self.capacity {
            self.evict_locked(&mut entries, now);
        }
        self.persist_locked(&entries);
    }

    /// Manually evict the lowest-scoring batch.
    pub fn evict(&self) {
        let now = now_secs();
        let mut entries = self.entries.write().expect("cache lock poisoned");
        self.evict_locked(&mut entries, now);
        self.persist_locked(&entries);
    }

    /// Remove every TTL-expired entry regardless of capacity.
    pub fn cleanup_expired(&self) -> usize {
        let now = now_secs();
        let mut entries = self.entries.write().expect("cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        let removed = before - entries.len();
        if removed > 0 {
            self.stats
                .expirations
                .fetch_add(removed as u64, Ordering::Relaxed);
            debug!(removed, "expired entries swept");
            self.persist_locked(&entries);
        }
        removed
    }

    /// Spawn the periodic expiry sweep on its own timer. The task holds the
    /// write lock only inside individual `cleanup_expired` calls.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.cleanup_expired();
            }
        })
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Evict the lowest-retention tenth of capacity. Usage-weighted, never
    /// pure FIFO: high-hit entries outlive cold ones.
    fn evict_locked(&self, entries: &mut HashMap<String, CachedVector>, now: i64) {
        if entries.is_empty() {
            return;
        }
        let batch = ((self.capacity as f64 * EVICTION_FRACTION).ceil() as usize)
            .clamp(1, entries.len());
        let mut scored: Vec<(String, f64)> = entries
            .values()
            .map(|e| (e.fingerprint.clone(), e.retention_score(now)))
            .collect();
        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        for (fingerprint, _) in scored.into_iter().take(batch) {
            entries.remove(&fingerprint);
        }
        self.stats
            .evictions
            .fetch_add(batch as u64, Ordering::Relaxed);
        debug!(evicted = batch, remaining = entries.len(), "cache eviction");
    }

    /// Persist the current snapshot. Failures are warnings, not errors:
    /// the cache keeps serving from memory.
    fn persist_locked(&self, entries: &HashMap<String, CachedVector>) {
        let snapshot: Vec<CachedVector> = entries.values().cloned().collect();
        if let Err(e) = self.repo.persist(&snapshot) {
            warn!(error = %e, "vector cache persist failed, continuing in memory");
        }
    }
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
