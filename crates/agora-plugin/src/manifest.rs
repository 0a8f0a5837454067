// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin manifest parsing from `plugin.toml` files.
//!
//! The manifest carries the descriptive metadata every plugin exposes through
//! [`Plugin::info`](agora_core::Plugin::info). It is parsed once when the plugin
//! is constructed; parse failures surface there, never at `info()` time.

use agora_core::{AgoraError, PluginInfo, Translator};
use serde::{Deserialize, Serialize};

/// Parsed plugin manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Display name used when no translation exists.
    pub name: String,
    /// Durable identity of the plugin (e.g. "memory_cache").
    pub slug_name: String,
    /// Description used when no translation exists.
    pub description: String,
    pub author: String,
    /// Semantic version string.
    pub version: String,
    pub link: String,
}

impl PluginManifest {
    /// Message key for the translated plugin name.
    pub fn name_key(&self) -> String {
        format!("plugin.{}.backend.info.name", self.slug_name)
    }

    /// Message key for the translated plugin description.
    pub fn description_key(&self) -> String {
        format!("plugin.{}.backend.info.description", self.slug_name)
    }

    /// Builds the descriptor returned by `Plugin::info()`.
    pub fn info(&self) -> PluginInfo {
        PluginInfo {
            name: Translator::new(self.name_key(), self.name.clone()),
            slug_name: self.slug_name.clone(),
            description: Translator::new(self.description_key(), self.description.clone()),
            author: self.author.clone(),
            version: self.version.clone(),
            link: self.link.clone(),
        }
    }
}

/// Intermediate TOML deserialization struct for `plugin.toml`.
#[derive(Debug, Deserialize)]
struct PluginManifestFile {
    plugin: PluginSection,
}

/// The `[plugin]` section of a `plugin.toml` file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PluginSection {
    name: String,
    slug_name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    author: String,
    version: String,
    #[serde(default)]
    link: String,
}

/// Whether `slug` is a valid plugin slug: a letter or underscore followed by
/// letters, digits, underscores or hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    let mut chars = slug.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Parse a plugin manifest from TOML content.
///
/// Validates that the name is non-empty, the slug is well-formed, and the
/// version is valid semver.
pub fn parse_plugin_manifest(toml_content: &str) -> Result<PluginManifest, AgoraError> {
    let file: PluginManifestFile = toml::from_str(toml_content)
        .map_err(|e| AgoraError::Config(format!("invalid plugin manifest: {e}")))?;

    let section = file.plugin;

    if section.name.trim().is_empty() {
        return Err(AgoraError::Config(
            "plugin manifest: name must not be empty".to_string(),
        ));
    }

    if !is_valid_slug(&section.slug_name) {
        return Err(AgoraError::Config(format!(
            "plugin manifest: invalid slug_name '{}'. Expected a letter or underscore followed by letters, digits, '_' or '-'",
            section.slug_name
        )));
    }

    if section.version.is_empty() {
        return Err(AgoraError::Config(
            "plugin manifest: version must not be empty".to_string(),
        ));
    }

    semver::Version::parse(&section.version).map_err(|e| {
        AgoraError::Config(format!(
            "plugin manifest: invalid version '{}': {e}",
            section.version
        ))
    })?;

    Ok(PluginManifest {
        name: section.name,
        slug_name: section.slug_name,
        description: section.description,
        author: section.author,
        version: section.version,
        link: section.link,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_manifest() {
        let toml = r#"
[plugin]
name = "Memory Cache"
slug_name = "memory_cache"
description = "In-process cache"
author = "Agora Contributors"
version = "0.1.0"
link = "https://example.com/memory-cache"
"#;
        let manifest = parse_plugin_manifest(toml).unwrap();
        assert_eq!(manifest.name, "Memory Cache");
        assert_eq!(manifest.slug_name, "memory_cache");
        assert_eq!(manifest.version, "0.1.0");
        assert_eq!(manifest.author, "Agora Contributors");
        assert_eq!(manifest.link, "https://example.com/memory-cache");
    }

    #[test]
    fn parse_minimal_manifest() {
        let toml = r#"
[plugin]
name = "minimal"
slug_name = "minimal"
version = "1.0.0"
"#;
        let manifest = parse_plugin_manifest(toml).unwrap();
        assert!(manifest.description.is_empty());
        assert!(manifest.author.is_empty());
        assert!(manifest.link.is_empty());
    }

    #[test]
    fn parse_missing_name() {
        let toml = r#"
[plugin]
name = ""
slug_name = "x"
version = "0.1.0"
"#;
        let err = parse_plugin_manifest(toml).unwrap_err().to_string();
        assert!(err.contains("name must not be empty"));
    }

    #[test]
    fn parse_invalid_slug() {
        let toml = r#"
[plugin]
name = "bad"
slug_name = "9lives"
version = "0.1.0"
"#;
        let err = parse_plugin_manifest(toml).unwrap_err().to_string();
        assert!(err.contains("invalid slug_name"));
    }

    #[test]
    fn parse_invalid_version() {
        let toml = r#"
[plugin]
name = "bad"
slug_name = "bad"
version = "one"
"#;
        let err = parse_plugin_manifest(toml).unwrap_err().to_string();
        assert!(err.contains("invalid version"));
    }

    #[test]
    fn parse_rejects_unknown_field() {
        let toml = r#"
[plugin]
name = "bad"
slug_name = "bad"
version = "0.1.0"
slugname = "typo"
"#;
        assert!(parse_plugin_manifest(toml).is_err());
    }

    #[test]
    fn slug_validation() {
        assert!(is_valid_slug("github_connector"));
        assert!(is_valid_slug("_private"));
        assert!(is_valid_slug("s3-storage"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("-dash"));
        assert!(!is_valid_slug("has space"));
        assert!(!is_valid_slug("dot.name"));
    }

    #[test]
    fn info_uses_manifest_literals_as_fallbacks() {
        let manifest = parse_plugin_manifest(
            r#"
[plugin]
name = "Webhook"
slug_name = "webhook_notification"
description = "Posts notifications to a webhook"
version = "0.2.0"
"#,
        )
        .unwrap();
        let info = manifest.info();
        assert_eq!(info.slug_name, "webhook_notification");
        assert_eq!(info.name.key, "plugin.webhook_notification.backend.info.name");
        assert_eq!(info.name.fallback, "Webhook");
        assert_eq!(info.description.fallback, "Posts notifications to a webhook");
        assert_eq!(info.version, "0.2.0");
    }
}
