// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as threshold ranges and non-empty paths.

use crate::model::NoemaConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<String>)` with all
/// collected validation errors (does not fail fast).
pub fn validate_config(config: &NoemaConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (name, value) in [
        (
            "classifier.paid_remote_threshold",
            config.classifier.paid_remote_threshold,
        ),
        (
            "classifier.free_remote_threshold",
            config.classifier.free_remote_threshold,
        ),
        (
            "engine.summary_min_quality",
            config.engine.summary_min_quality,
        ),
        ("gateway.confidence_floor", config.gateway.confidence_floor),
        ("retrieval.dedup_threshold", config.retrieval.dedup_threshold),
        ("cost.warn_fraction", config.cost.warn_fraction),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(format!("{name} must be within 0.0..=1.0, got {value}"));
        }
    }

    if config.classifier.paid_remote_threshold > config.classifier.free_remote_threshold {
        errors.push(format!(
            "classifier.paid_remote_threshold ({}) must not exceed classifier.free_remote_threshold ({})",
            config.classifier.paid_remote_threshold, config.classifier.free_remote_threshold
        ));
    }

    if config.cost.default_daily_limit_usd < 0.0 {
        errors.push(format!(
            "cost.default_daily_limit_usd must be non-negative, got {}",
            config.cost.default_daily_limit_usd
        ));
    }

    if config.engine.embedding_dimensions == 0 {
        errors.push("engine.embedding_dimensions must be positive".to_string());
    }

    if config.cache.capacity == 0 {
        errors.push("cache.capacity must be positive".to_string());
    }

    if config.retrieval.top_k == 0 {
        errors.push("retrieval.top_k must be positive".to_string());
    }

    if config.gateway.database_path.trim().is_empty() {
        errors.push("gateway.database_path must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
