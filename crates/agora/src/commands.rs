// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `agora plugins` and `agora check` command implementations.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use agora_config::{AgoraConfig, ConfigError};
use agora_core::{CapabilityKind, Localizer};
use agora_plugin::{MessageCatalog, PluginRegistry, PluginStatus};

use crate::builtin::{build_registry, builtin_catalog};

/// One line of `agora plugins` output.
#[derive(Debug, Clone, Serialize)]
pub struct PluginRow {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub status: String,
    pub capabilities: Vec<String>,
}

/// Rows for every registered plugin, sorted by slug, localized to `lang`.
pub fn plugin_rows(registry: &PluginRegistry, localizer: &dyn Localizer, lang: &str) -> Vec<PluginRow> {
    registry
        .list_all()
        .into_iter()
        .map(|entry| {
            let info = entry.plugin().info().localized(localizer, lang);
            PluginRow {
                slug: info.slug_name,
                name: info.name,
                description: info.description,
                version: info.version,
                status: entry.status().to_string(),
                capabilities: entry
                    .capabilities()
                    .iter()
                    .map(CapabilityKind::to_string)
                    .collect(),
            }
        })
        .collect()
}

/// Plain-text table of `rows`.
pub fn render_table(rows: &[PluginRow]) -> String {
    let slug_width = rows.iter().map(|r| r.slug.len()).max().unwrap_or(0).max(4);
    let caps: Vec<String> = rows.iter().map(|r| r.capabilities.join(",")).collect();
    let caps_width = caps.iter().map(String::len).max().unwrap_or(0).max(12);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<slug_width$}  {:<8}  {:<8}  {:<caps_width$}  NAME",
        "SLUG", "STATUS", "VERSION", "CAPABILITIES"
    );
    for (row, caps) in rows.iter().zip(&caps) {
        let _ = writeln!(
            out,
            "{:<slug_width$}  {:<8}  {:<8}  {:<caps_width$}  {}",
            row.slug, row.status, row.version, caps, row.name
        );
    }
    out
}

/// Loads the built-in catalog, merged with an optional user catalog file.
pub fn load_catalog(extra: Option<&Path>) -> Result<MessageCatalog, ConfigError> {
    let mut catalog = builtin_catalog().map_err(|e| ConfigError::Other(e.to_string()))?;
    if let Some(path) = extra {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Other(format!("cannot read catalog {}: {e}", path.display()))
        })?;
        let user = MessageCatalog::from_toml(&content).map_err(|e| ConfigError::Other(e.to_string()))?;
        catalog.merge(user);
    }
    Ok(catalog)
}

/// Runs `agora plugins`, returning the text to print.
pub fn run_plugins(
    config: &AgoraConfig,
    lang: Option<&str>,
    catalog: Option<&Path>,
    json: bool,
) -> Result<String, Vec<ConfigError>> {
    let registry = build_registry(config)?;
    let catalog = load_catalog(catalog).map_err(|e| vec![e])?;
    let lang = lang.unwrap_or(&config.host.default_lang);
    let rows = plugin_rows(&registry, &catalog, lang);

    if json {
        serde_json::to_string_pretty(&rows)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| vec![ConfigError::Other(format!("failed to encode plugin list: {e}"))])
    } else {
        Ok(render_table(&rows))
    }
}

/// Runs `agora check`, returning a one-line summary.
pub fn run_check(config: &AgoraConfig) -> Result<String, Vec<ConfigError>> {
    let registry = build_registry(config)?;
    let enabled = registry
        .entries()
        .iter()
        .filter(|e| e.status() == PluginStatus::Enabled)
        .count();
    Ok(format!(
        "configuration OK: {} plugins registered, {enabled} enabled\n",
        registry.len()
    ))
}
