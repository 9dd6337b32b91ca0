// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Noema orchestration layer.
//!
//! Layered loading (defaults < system file < XDG user file < local file <
//! `NOEMA_*` env vars) via Figment, with post-load range validation.

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    CacheConfig, ClassifierConfig, CostConfig, EngineConfig, GatewayConfig, NoemaConfig,
    RetrievalConfig,
};
pub use validation::validate_config;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = NoemaConfig::default();
        validate_config(&config).expect("default config must validate");
        assert!(config.classifier.paid_remote_threshold < config.classifier.free_remote_threshold);
        assert_eq!(config.gateway.result_ttl_secs, 7 * 24 * 3600);
        assert_eq!(config.gateway.embedding_ttl_secs, 30 * 24 * 3600);
    }

    #[test]
    fn load_from_str_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [classifier]
            paid_remote_threshold = 0.5

            [cache]
            capacity = 100
            "#,
        )
        .unwrap();
        assert!((config.classifier.paid_remote_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.cache.capacity, 100);
        // Untouched sections keep defaults.
        assert_eq!(config.retrieval.top_k, 5);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = load_config_from_str(
            r#"
            [classifier]
            no_such_key = true
            "#,
        );
        assert!(result.is_err(), "unknown keys must be rejected");
    }

    #[test]
    fn validation_catches_out_of_range_threshold() {
        let mut config = NoemaConfig::default();
        config.gateway.confidence_floor = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("confidence_floor")));
    }

    #[test]
    fn validation_catches_inverted_thresholds() {
        let mut config = NoemaConfig::default();
        config.classifier.paid_remote_threshold = 0.9;
        config.classifier.free_remote_threshold = 0.6;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.contains("paid_remote_threshold")));
    }

    #[test]
    fn validation_catches_zero_capacity() {
        let mut config = NoemaConfig::default();
        config.cache.capacity = 0;
        assert!(validate_config(&config).is_err());
    }
}
