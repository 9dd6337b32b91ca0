// SPDX-FileCopyrightText: 2026 Noema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./noema.toml` > `~/.config/noema/noema.toml` >
//! `/etc/noema/noema.toml` with environment variable overrides via `NOEMA_`
//! prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::NoemaConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/noema/noema.toml` (system-wide)
/// 3. `~/.config/noema/noema.toml` (user XDG config)
/// 4. `./noema.toml` (local directory)
/// 5. `NOEMA_*` environment variables
pub fn load_config() -> Result<NoemaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NoemaConfig::default()))
        .merge(Toml::file("/etc/noema/noema.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("noema/noema.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("noema.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<NoemaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NoemaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<NoemaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NoemaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `NOEMA_CACHE_DEFAULT_TTL_SECS` must map
/// to `cache.default_ttl_secs`, not `cache.default.ttl.secs`.
fn env_provider() -> Env {
    Env::prefixed("NOEMA_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("classifier_", "classifier.", 1)
            .replacen("engine_", "engine.", 1)
            .replacen("cache_", "cache.", 1)
            .replacen("retrieval_", "retrieval.", 1)
            .replacen("cost_", "cost.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}
