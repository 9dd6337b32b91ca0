// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded memoization cache for local inference outputs.
//!
//! Each engine capability keeps one of these, keyed by a hash of
//! (operation, truncated input, options). Oldest entries are dropped on
//! overflow.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use sha2::{Digest, Sha256};

/// How many leading characters of the input participate in the key.
/// The full input length is mixed in as well, so truncation collisions
/// require identical prefixes and identical lengths.
const KEY_PREFIX_CHARS: usize = 256;

/// Build a memo key from operation name, input text, and a canonical
/// rendering of the options.
pub fn memo_key(operation: &str, input: &str, options: &str) -> String {
    let prefix: String = input.chars().take(KEY_PREFIX_CHARS).collect();
    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    hasher.update([0x1f]);
    hasher.update(prefix.as_bytes());
    hasher.update([0x1f]);
    hasher.update(input.len().to_le_bytes());
    hasher.update([0x1f]);
    hasher.update(options.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

struct MemoInner<T> {
    map: HashMap<String, T>,
    order: VecDeque<String>,
    capacity: usize,
}

/// Thread-safe bounded memo cache with insertion-order eviction.
pub struct MemoCache<T> {
    inner: Mutex<MemoInner<T>>,
}

impl<T: Clone> MemoCache<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(MemoInner {
                map: HashMap::new(),
                order: VecDeque::new(),
                capacity: capacity.max(1),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let inner = self.inner.lock().expect("memo lock poisoned");
        inner.map.get(key).cloned()
    }

    pub fn insert(&self, key: String, value: T) {
        let mut inner = self.inner.lock().expect("memo lock poisoned");
        if inner.map.contains_key(&key) {
            inner.map.insert(key, value);
            return;
        }
        while inner.map.len() >= inner.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.map.remove(&oldest);
                }
                None => break,
            }
        }
        inner.order.push_back(key.clone());
        inner.map.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("memo lock poisoned").map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memo_key_is_deterministic() {
        let a = memo_key("summarize", "some text", "max=400");
        let b = memo_key("summarize", "some text", "max=400");
        assert_eq!(a, b);
    }

    #[test]
    fn memo_key_varies_with_each_component() {
        let base = memo_key("summarize", "some text", "max=400");
        assert_ne!(base, memo_key("categorize", "some text", "max=400"));
        assert_ne!(base, memo_key("summarize", "other text", "max=400"));
        assert_ne!(base, memo_key("summarize", "some text", "max=200"));
    }

    #[test]
    fn memo_key_distinguishes_long_inputs_by_length() {
        let long_a = "x".repeat(300);
        let long_b = "x".repeat(301);
        assert_ne!(
            memo_key("embed", &long_a, ""),
            memo_key("embed", &long_b, "")
        );
    }

    #[test]
    fn cache_round_trip() {
        let cache: MemoCache<u32> = MemoCache::new(4);
        cache.insert("k1".into(), 10);
        assert_eq!(cache.get("k1"), Some(10));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn cache_evicts_oldest_on_overflow() {
        let cache: MemoCache<u32> = MemoCache::new(2);
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        cache.insert("c".into(), 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None, "oldest entry must be evicted");
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn reinserting_existing_key_updates_in_place() {
        let cache: MemoCache<u32> = MemoCache::new(2);
        cache.insert("a".into(), 1);
        cache.insert("a".into(), 9);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a"), Some(9));
    }
}
