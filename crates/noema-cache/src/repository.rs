// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed persistence seam for the vector cache.
//!
//! The cache logic never touches the storage mechanism directly; swapping
//! the JSON file for another backend means implementing one trait.

use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use noema_core::NoemaError;

use crate::entry::CachedVector;

/// Snapshot persistence for the vector cache.
pub trait CacheRepository: Send + Sync {
    /// Load the full snapshot. Missing storage yields an empty snapshot.
    fn load(&self) -> Result<Vec<CachedVector>, NoemaError>;

    /// Replace the stored snapshot with `entries`.
    fn persist(&self, entries: &[CachedVector]) -> Result<(), NoemaError>;
}

/// JSON-file snapshot storage.
pub struct FileCacheRepository {
    path: PathBuf,
}

impl FileCacheRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CacheRepository for FileCacheRepository {
    fn load(&self) -> Result<Vec<CachedVector>, NoemaError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content =
            std::fs::read_to_string(&self.path).map_err(NoemaError::storage)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(NoemaError::storage)
    }

    fn persist(&self, entries: &[CachedVector]) -> Result<(), NoemaError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(NoemaError::storage)?;
        }
        let content = serde_json::to_string(entries).map_err(NoemaError::storage)?;
        std::fs::write(&self.path, content).map_err(NoemaError::storage)?;
        debug!(path = %self.path.display(), entries = entries.len(), "cache snapshot written");
        Ok(())
    }
}

/// In-memory snapshot storage for tests and memory-only configurations.
#[derive(Default)]
pub struct MemoryCacheRepository {
    slot: Mutex<Vec<CachedVector>>,
}

impl MemoryCacheRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheRepository for MemoryCacheRepository {
    fn load(&self) -> Result<Vec<CachedVector>, NoemaError> {
        Ok(self.slot.lock().expect("repository lock poisoned").clone())
    }

    fn persist(&self, entries: &[CachedVector]) -> Result<(), NoemaError> {
        *self.slot.lock().expect("repository lock poisoned") = entries.to_vec();
        Ok(())
    }
}
