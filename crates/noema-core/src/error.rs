// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Noema orchestration layer.

use thiserror::Error;

/// The primary error type used across all Noema crates.
///
/// Deliberately small: budget exhaustion, empty input, and low-quality
/// local output are decisions carried in result types, not errors.
#[derive(Debug, Error)]
pub enum NoemaError {
    /// Configuration errors (invalid TOML, out-of-range thresholds).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Remote model provider errors (API failure, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl NoemaError {
    /// Wrap an arbitrary storage-layer error.
    pub fn storage<E: std::error::Error + Send + Sync + 'static>(source: E) -> Self {
        NoemaError::Storage {
            source: Box::new(source),
        }
    }

    /// Build a provider error from a message alone.
    pub fn provider(message: impl Into<String>) -> Self {
        NoemaError::Provider {
            message: message.into(),
            source: None,
        }
    }
}
