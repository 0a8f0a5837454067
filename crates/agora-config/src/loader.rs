// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./agora.toml` > `~/.config/agora/agora.toml` > `/etc/agora/agora.toml`
//! with environment variable overrides via `AGORA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use tracing::debug;

use crate::model::AgoraConfig;

pub(crate) const LOCAL_CONFIG: &str = "agora.toml";
pub(crate) const SYSTEM_CONFIG: &str = "/etc/agora/agora.toml";

/// Path of the per-user config file, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("agora/agora.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/agora/agora.toml` (system-wide)
/// 3. `~/.config/agora/agora.toml` (user XDG config)
/// 4. `./agora.toml` (local directory)
/// 5. `AGORA_*` environment variables
pub fn load_config() -> Result<AgoraConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<AgoraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AgoraConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AgoraConfig, figment::Error> {
    debug!(path = %path.display(), "loading config file");
    Figment::new()
        .merge(Serialized::defaults(AgoraConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the XDG lookup, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(AgoraConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider with explicit key mapping.
///
/// Plugin slugs and field names contain underscores, so plugin paths use a
/// double underscore as the separator: `AGORA_PLUGINS__MEMORY_CACHE__ENABLED`
/// maps to `plugins.memory_cache.enabled`. Host keys use the section prefix:
/// `AGORA_HOST_LOG_LEVEL` maps to `host.log_level`.
fn env_provider() -> Env {
    Env::prefixed("AGORA_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    if key.starts_with("plugins__") {
        key.replace("__", ".")
    } else {
        key.replacen("host_", "host.", 1)
    }
}
