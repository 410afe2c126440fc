// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./ventra.toml` > `~/.config/ventra/ventra.toml`
//! > `/etc/ventra/ventra.toml` with environment variable overrides via the
//! `VENTRA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::VentraConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/ventra/ventra.toml` (system-wide)
/// 3. `~/.config/ventra/ventra.toml` (user XDG config)
/// 4. `./ventra.toml` (local directory)
/// 5. `VENTRA_*` environment variables
pub fn load_config() -> Result<VentraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VentraConfig::default()))
        .merge(Toml::file("/etc/ventra/ventra.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("ventra/ventra.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("ventra.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit inline configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<VentraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VentraConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VentraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VentraConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `VENTRA_BUFFER_DEBOUNCE_SECS` must map
/// to `buffer.debounce_secs`, not `buffer.debounce.secs`.
fn env_provider() -> Env {
    Env::prefixed("VENTRA_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: VENTRA_BUFFER_DEBOUNCE_SECS -> "buffer_debounce_secs"
        let key_str = key.as_str();
        let mapped = if let Some(rest) = key_str.strip_prefix("providers_") {
            match rest.split_once('_') {
                Some((section @ ("evolution" | "wppconnect" | "cloud"), field)) => {
                    format!("providers.{section}.{field}")
                }
                _ => format!("providers.{rest}"),
            }
        } else if let Some((section, field)) = key_str.split_once('_')
            && matches!(section, "bot" | "server" | "buffer" | "ai" | "storage")
        {
            format!("{section}.{field}")
        } else {
            key_str.to_string()
        };
        mapped.into()
    })
}
