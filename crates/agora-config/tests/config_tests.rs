// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Agora host configuration.

use std::io::Write;

use agora_config::diagnostic::ConfigError;
use agora_config::model::AgoraConfig;
use agora_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn valid_toml_deserializes_into_agora_config() {
    let toml = r#"
[host]
log_level = "warn"
default_lang = "zh_CN"

[plugins.memory_cache]
enabled = true

[plugins.memory_cache.config]
namespace = "qa"

[plugins.keyword_reviewer.config]
blocked_words = ["spam"]
max_links = 3
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.host.log_level, "warn");
    assert_eq!(config.host.default_lang, "zh_CN");
    assert_eq!(
        config.plugin_config("memory_cache"),
        Some(serde_json::json!({"namespace": "qa"}))
    );
    let reviewer = config.plugin_config("keyword_reviewer").unwrap();
    assert_eq!(reviewer["blocked_words"], serde_json::json!(["spam"]));
    assert_eq!(reviewer["max_links"], 3);
}

#[test]
fn unknown_host_key_produces_suggestion() {
    let toml = r#"
[host]
log_levle = "debug"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            valid_keys,
            ..
        } => {
            assert_eq!(key, "log_levle");
            assert_eq!(suggestion.as_deref(), Some("log_level"));
            assert!(valid_keys.contains("default_lang"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn plugin_config_table_is_free_form() {
    let toml = r#"
[plugins.oauth_connector.config]
anything_goes = { nested = true }
"#;
    let config = load_config_from_str(toml).expect("plugin tables are not checked here");
    assert_eq!(
        config.plugin_config("oauth_connector").unwrap()["anything_goes"]["nested"],
        true
    );
}

#[test]
fn wrong_type_reports_invalid_type() {
    let toml = r#"
[plugins.memory_cache]
enabled = "yes"
"#;
    let errors = load_and_validate_str(toml).expect_err("string is not a bool");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. } | ConfigError::Other(_))),
        "got: {errors:?}"
    );
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("empty TOML should use defaults");
    assert_eq!(config.host.log_level, "info");
    assert_eq!(config.host.default_lang, "en_US");
    assert!(config.plugins.is_empty());
}

#[test]
fn validation_errors_are_returned_after_parse() {
    let toml = r#"
[host]
log_level = "chatty"
"#;
    let errors = load_and_validate_str(toml).expect_err("unknown log level");
    assert!(matches!(&errors[0], ConfigError::Validation { message } if message.contains("chatty")));
}

#[test]
fn dotted_override_reaches_plugin_config() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let toml_content = r#"
[plugins.webhook_notification.config]
webhook_url = "https://hooks.example.com"
"#;

    // Same shape the AGORA_PLUGINS__... env mapping produces.
    let config: AgoraConfig = Figment::new()
        .merge(Serialized::defaults(AgoraConfig::default()))
        .merge(Toml::string(toml_content))
        .merge((
            "plugins.webhook_notification.config.api_key",
            "from-env",
        ))
        .extract()
        .expect("should merge override");

    let webhook = config.plugin_config("webhook_notification").unwrap();
    assert_eq!(webhook["webhook_url"], "https://hooks.example.com");
    assert_eq!(webhook["api_key"], "from-env");
}

#[test]
fn load_from_path_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[host]\nlog_level = \"debug\"").unwrap();

    let config = load_and_validate_path(file.path()).expect("file should load");
    assert_eq!(config.host.log_level, "debug");
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let config = load_and_validate_path(std::path::Path::new("/nonexistent/agora.toml"))
        .expect("missing file should be silently skipped");
    assert_eq!(config.host.log_level, "info");
}
