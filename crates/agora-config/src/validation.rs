// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that serde attributes cannot express, such as
//! well-formed plugin slugs and known log levels.

use agora_plugin::is_valid_slug;

use crate::diagnostic::{ConfigError, suggest_key};
use crate::model::AgoraConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or every collected error
/// (does not fail fast).
pub fn validate_config(config: &AgoraConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.host.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "host.log_level `{}` is not one of {}",
                config.host.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.host.default_lang.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "host.default_lang must not be empty".to_string(),
        });
    }

    for slug in config.plugins.keys() {
        if !is_valid_slug(slug) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "plugins.{slug}: a plugin slug starts with a letter or underscore followed by letters, digits, '_' or '-'"
                ),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Reports every `[plugins.<slug>]` section whose slug is not in `known`.
pub fn validate_plugin_slugs(config: &AgoraConfig, known: &[&str]) -> Vec<ConfigError> {
    config
        .plugins
        .keys()
        .filter(|slug| !known.contains(&slug.as_str()))
        .map(|slug| ConfigError::UnknownPlugin {
            slug: slug.clone(),
            suggestion: suggest_key(slug, known),
            known: known.join(", "),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PluginSection;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&AgoraConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = AgoraConfig::default();
        config.host.log_level = "loud".to_string();
        config.host.default_lang = " ".to_string();
        config
            .plugins
            .insert("9bad".to_string(), PluginSection::default());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("host.log_level"))
        ));
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("plugins.9bad"))
        ));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = AgoraConfig::default();
        config.host.log_level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn unknown_plugin_slugs_get_suggestions() {
        let mut config = AgoraConfig::default();
        config
            .plugins
            .insert("memory_cahce".to_string(), PluginSection::default());
        config
            .plugins
            .insert("local_storage".to_string(), PluginSection::default());

        let errors = validate_plugin_slugs(&config, &["memory_cache", "local_storage"]);
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            ConfigError::UnknownPlugin {
                slug, suggestion, ..
            } => {
                assert_eq!(slug, "memory_cahce");
                assert_eq!(suggestion.as_deref(), Some("memory_cache"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
