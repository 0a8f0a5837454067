// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-plugin configuration binding.
//!
//! The host delivers configuration as a JSON object. Each plugin deserializes it
//! into its own explicit struct and keeps it in a [`ConfigSlot`], which swaps the
//! whole struct at once so concurrent readers never observe a partial update.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::AgoraError;
use crate::types::REDACTED;

/// A capability-specific configuration struct.
///
/// `Default` must produce the "unconfigured" value a plugin starts with.
pub trait PluginConfig: DeserializeOwned + Default + Send + Sync + 'static {
    /// Semantic checks that serde cannot express.
    fn validate(&self) -> Result<(), AgoraError> {
        Ok(())
    }

    /// Whether the required fields are present so operations may run.
    fn is_configured(&self) -> bool {
        true
    }

    /// Replaces secrets received as [`REDACTED`] with the `previous` ones.
    fn keep_secrets(&mut self, _previous: &Self) {}
}

/// Restores `incoming` from `previous` when the host echoed the redaction marker.
pub fn keep_secret(incoming: &mut String, previous: &str) {
    if incoming == REDACTED {
        *incoming = previous.to_string();
    }
}

/// Holds the current configuration of one plugin instance.
pub struct ConfigSlot<C> {
    plugin: String,
    current: ArcSwap<C>,
}

impl<C: PluginConfig> ConfigSlot<C> {
    /// Creates a slot holding the unconfigured default.
    pub fn new(plugin: impl Into<String>) -> Self {
        Self::with_config(plugin, C::default())
    }

    pub fn with_config(plugin: impl Into<String>, config: C) -> Self {
        Self {
            plugin: plugin.into(),
            current: ArcSwap::from_pointee(config),
        }
    }

    /// Snapshot of the current configuration, configured or not.
    pub fn load(&self) -> Arc<C> {
        self.current.load_full()
    }

    /// Snapshot of the current configuration, or `NotConfigured`.
    pub fn ready(&self) -> Result<Arc<C>, AgoraError> {
        let config = self.load();
        if config.is_configured() {
            Ok(config)
        } else {
            Err(AgoraError::NotConfigured {
                plugin: self.plugin.clone(),
            })
        }
    }

    /// Validates and installs a new configuration.
    pub fn store(&self, config: C) -> Result<(), AgoraError> {
        config.validate()?;
        self.current.store(Arc::new(config));
        debug!(plugin = %self.plugin, "plugin configuration updated");
        Ok(())
    }

    /// Deserializes host-delivered JSON without installing it. Redacted
    /// secrets are resolved against the current configuration.
    pub fn parse(&self, value: &serde_json::Value) -> Result<C, AgoraError> {
        let mut config = C::deserialize(value).map_err(|e| {
            AgoraError::Config(format!("invalid config for plugin `{}`: {e}", self.plugin))
        })?;
        config.keep_secrets(&self.load());
        Ok(config)
    }

    /// Deserializes host-delivered JSON, validates it and swaps it in.
    ///
    /// On any error the previous configuration stays in place.
    pub fn receive(&self, value: &serde_json::Value) -> Result<(), AgoraError> {
        self.store(self.parse(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct EndpointConfig {
        #[serde(default)]
        endpoint: String,
        #[serde(default)]
        api_key: String,
    }

    impl PluginConfig for EndpointConfig {
        fn validate(&self) -> Result<(), AgoraError> {
            if !self.endpoint.is_empty() && !self.endpoint.starts_with("http") {
                return Err(AgoraError::Config("endpoint must be an http(s) URL".into()));
            }
            Ok(())
        }

        fn is_configured(&self) -> bool {
            !self.endpoint.is_empty()
        }

        fn keep_secrets(&mut self, previous: &Self) {
            keep_secret(&mut self.api_key, &previous.api_key);
        }
    }

    #[test]
    fn default_slot_is_not_ready() {
        let slot: ConfigSlot<EndpointConfig> = ConfigSlot::new("demo");
        let err = slot.ready().unwrap_err();
        assert!(matches!(err, AgoraError::NotConfigured { ref plugin } if plugin == "demo"));
    }

    #[test]
    fn receive_swaps_whole_config() {
        let slot: ConfigSlot<EndpointConfig> = ConfigSlot::new("demo");
        slot.receive(&serde_json::json!({"endpoint": "http://a", "api_key": "k1"}))
            .unwrap();
        let before = slot.ready().unwrap();

        slot.receive(&serde_json::json!({"endpoint": "http://b", "api_key": "k2"}))
            .unwrap();

        // The earlier snapshot is untouched by the swap.
        assert_eq!(before.endpoint, "http://a");
        assert_eq!(before.api_key, "k1");
        let after = slot.ready().unwrap();
        assert_eq!(after.endpoint, "http://b");
        assert_eq!(after.api_key, "k2");
    }

    #[test]
    fn invalid_config_keeps_previous() {
        let slot: ConfigSlot<EndpointConfig> = ConfigSlot::new("demo");
        slot.receive(&serde_json::json!({"endpoint": "http://a"})).unwrap();

        let err = slot
            .receive(&serde_json::json!({"endpoint": "ftp://nope"}))
            .unwrap_err();
        assert!(matches!(err, AgoraError::Config(_)));

        let err = slot
            .receive(&serde_json::json!({"endpont": "http://typo"}))
            .unwrap_err();
        assert!(err.to_string().contains("demo"));

        assert_eq!(slot.load().endpoint, "http://a");
    }

    #[test]
    fn redacted_secret_keeps_the_current_one() {
        let slot: ConfigSlot<EndpointConfig> = ConfigSlot::new("demo");
        slot.receive(&serde_json::json!({"endpoint": "http://a", "api_key": "s3cret"}))
            .unwrap();

        slot.receive(&serde_json::json!({"endpoint": "http://b", "api_key": REDACTED}))
            .unwrap();
        let current = slot.load();
        assert_eq!(current.endpoint, "http://b");
        assert_eq!(current.api_key, "s3cret");

        slot.receive(&serde_json::json!({"endpoint": "http://b", "api_key": ""}))
            .unwrap();
        assert_eq!(slot.load().api_key, "");
    }

    #[test]
    fn concurrent_readers_see_consistent_pairs() {
        let slot = Arc::new(ConfigSlot::<EndpointConfig>::new("demo"));
        slot.receive(&serde_json::json!({"endpoint": "http://0", "api_key": "0"}))
            .unwrap();

        let writer = {
            let slot = Arc::clone(&slot);
            std::thread::spawn(move || {
                for i in 1..200 {
                    slot.receive(&serde_json::json!({
                        "endpoint": format!("http://{i}"),
                        "api_key": i.to_string(),
                    }))
                    .unwrap();
                }
            })
        };

        for _ in 0..500 {
            let cfg = slot.load();
            assert_eq!(cfg.endpoint, format!("http://{}", cfg.api_key));
        }
        writer.join().unwrap();
    }
}
