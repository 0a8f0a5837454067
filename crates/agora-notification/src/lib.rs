// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook notification plugin for the Agora framework.
//!
//! Each notification is POSTed as JSON to the configured endpoint. The plugin
//! never retries on its own: failures come back as `AgoraError::Backend` with
//! the retryable flag set for timeouts, connection errors, 429 and 5xx.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use agora_core::types::{ConfigField, ConfigFieldType, NotificationMessage, NotificationType};
use agora_core::{
    AgoraError, ConfigSlot, Notification, Plugin, PluginConfig, PluginInfo, keep_secret,
};
use agora_plugin::{PluginManifest, parse_plugin_manifest};

const MANIFEST: &str = include_str!("../plugin.toml");

/// Configuration of a [`WebhookNotifier`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    #[serde(default)]
    pub webhook_url: String,
    /// Sent as a bearer token when non-empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Types to deliver; empty delivers every type.
    #[serde(default)]
    pub notification_types: Vec<NotificationType>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            notification_types: Vec::new(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

impl PluginConfig for WebhookConfig {
    fn validate(&self) -> Result<(), AgoraError> {
        if !self.webhook_url.is_empty()
            && !(self.webhook_url.starts_with("http://") || self.webhook_url.starts_with("https://"))
        {
            return Err(AgoraError::Config(format!(
                "webhook_notification: webhook_url `{}` must be an http(s) URL",
                self.webhook_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(AgoraError::Config(
                "webhook_notification: timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn is_configured(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    fn keep_secrets(&mut self, previous: &Self) {
        keep_secret(&mut self.api_key, &previous.api_key);
    }
}

impl WebhookConfig {
    fn accepts(&self, notification_type: NotificationType) -> bool {
        self.notification_types.is_empty() || self.notification_types.contains(&notification_type)
    }
}

/// Notification plugin that forwards messages to a webhook.
pub struct WebhookNotifier {
    manifest: Arc<PluginManifest>,
    config: ConfigSlot<WebhookConfig>,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new() -> Result<Self, AgoraError> {
        let manifest = Arc::new(parse_plugin_manifest(MANIFEST)?);
        Self::from_manifest(manifest)
    }

    pub fn from_manifest(manifest: Arc<PluginManifest>) -> Result<Self, AgoraError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AgoraError::backend_source("failed to build HTTP client", e, false))?;
        let config = ConfigSlot::new(manifest.slug_name.clone());
        Ok(Self {
            manifest,
            config,
            client,
        })
    }
}

impl Plugin for WebhookNotifier {
    fn info(&self) -> PluginInfo {
        self.manifest.info()
    }

    fn slug_name(&self) -> &str {
        &self.manifest.slug_name
    }

    fn config_fields(&self) -> Vec<ConfigField> {
        let config = self.config.load();
        let types: Vec<String> = config
            .notification_types
            .iter()
            .map(ToString::to_string)
            .collect();
        vec![
            ConfigField::new("webhook_url", ConfigFieldType::Input, true)
                .with_value(config.webhook_url.clone()),
            ConfigField::new("api_key", ConfigFieldType::Secret, false)
                .with_secret(&config.api_key),
            ConfigField::new("timeout_secs", ConfigFieldType::Number, false)
                .with_value(config.timeout_secs),
            ConfigField::new("notification_types", ConfigFieldType::TagList, false)
                .with_value(types),
        ]
    }

    fn receive_config(&self, config: &serde_json::Value) -> Result<(), AgoraError> {
        self.config.receive(config)
    }

    fn as_notification(&self) -> Option<&dyn Notification> {
        Some(self)
    }
}

#[async_trait]
impl Notification for WebhookNotifier {
    async fn notify(&self, message: NotificationMessage) -> Result<(), AgoraError> {
        let config = self.config.ready()?;
        if !config.accepts(message.notification_type) {
            debug!(
                notification_type = %message.notification_type,
                "skipping notification type not in allow-list"
            );
            return Ok(());
        }

        let mut request = self
            .client
            .post(&config.webhook_url)
            .timeout(Duration::from_secs(config.timeout_secs))
            .json(&message);
        if !config.api_key.is_empty() {
            request = request.bearer_auth(&config.api_key);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "webhook request failed");
            AgoraError::backend_source("webhook request failed", e, true)
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(
                notification_type = %message.notification_type,
                receiver = %message.receiver_user_id,
                "notification delivered"
            );
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, "webhook rejected notification");
        Err(AgoraError::http_status(status.as_u16(), body))
    }
}
