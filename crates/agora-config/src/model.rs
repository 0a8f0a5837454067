// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Agora host.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. The per-plugin `config` table is the exception: its
//! shape belongs to the plugin and is checked when the plugin receives it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level Agora host configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment variable
/// overrides. All sections are optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgoraConfig {
    /// Host-wide settings.
    #[serde(default)]
    pub host: HostConfig,

    /// Per-plugin settings keyed by plugin slug.
    #[serde(default)]
    pub plugins: BTreeMap<String, PluginSection>,
}

impl AgoraConfig {
    /// Whether the plugin is enabled. Plugins without a section are enabled.
    pub fn is_enabled(&self, slug: &str) -> bool {
        self.plugins.get(slug).is_none_or(|section| section.enabled)
    }

    /// The JSON object delivered to the plugin, if a section exists.
    pub fn plugin_config(&self, slug: &str) -> Option<serde_json::Value> {
        self.plugins.get(slug).map(PluginSection::config_value)
    }
}

/// Host-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Language used when rendering plugin names and descriptions.
    #[serde(default = "default_lang")]
    pub default_lang: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            default_lang: default_lang(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_lang() -> String {
    "en_US".to_string()
}

/// The `[plugins.<slug>]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginSection {
    /// Whether lookups return this plugin.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Plugin-specific settings, delivered as a JSON object.
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl Default for PluginSection {
    fn default() -> Self {
        Self {
            enabled: true,
            config: serde_json::Map::new(),
        }
    }
}

impl PluginSection {
    pub fn config_value(&self) -> serde_json::Value {
        serde_json::Value::Object(self.config.clone())
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_sections_parse_with_nested_config() {
        let toml_str = r#"
[host]
log_level = "debug"

[plugins.memory_cache]
enabled = false

[plugins.webhook_notification.config]
webhook_url = "https://hooks.example.com/agora"
timeout_secs = 5
notification_types = ["new_question"]
"#;
        let config: AgoraConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.host.log_level, "debug");
        assert_eq!(config.host.default_lang, "en_US");
        assert!(!config.is_enabled("memory_cache"));
        assert!(config.is_enabled("webhook_notification"));
        assert!(config.is_enabled("not_mentioned"));

        let webhook = config.plugin_config("webhook_notification").unwrap();
        assert_eq!(webhook["webhook_url"], "https://hooks.example.com/agora");
        assert_eq!(webhook["timeout_secs"], 5);
        assert_eq!(webhook["notification_types"][0], "new_question");
        assert_eq!(
            config.plugin_config("memory_cache"),
            Some(serde_json::json!({}))
        );
    }

    #[test]
    fn plugin_section_denies_unknown_fields() {
        let toml_str = r#"
[plugins.memory_cache]
enabeld = true
"#;
        assert!(toml::from_str::<AgoraConfig>(toml_str).is_err());
    }

    #[test]
    fn host_denies_unknown_fields() {
        let toml_str = r#"
[host]
log_levl = "debug"
"#;
        assert!(toml::from_str::<AgoraConfig>(toml_str).is_err());
    }

    #[test]
    fn defaults_are_sensible() {
        let config = AgoraConfig::default();
        assert_eq!(config.host.log_level, "info");
        assert_eq!(config.host.default_lang, "en_US");
        assert!(config.plugins.is_empty());
        assert!(PluginSection::default().enabled);
    }
}
