// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OAuth2 authorization-code connector plugin for the Agora framework.
//!
//! The sender redirects to the provider with a signed `state` bound to the
//! receiver URL. The receiver verifies that state, exchanges the code for an
//! access token, fetches the userinfo document and maps it onto an
//! [`ExternalLoginUserInfo`]. Field names are configurable so the same plugin
//! fits GitHub, GitLab, Google and most self-hosted providers.

mod profile;
mod state;

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use agora_core::types::{CallbackRequest, ConfigField, ConfigFieldType, ExternalLoginUserInfo};
use agora_core::{
    AgoraError, ConfigSlot, Connector, Plugin, PluginConfig, PluginInfo, Translator, keep_secret,
};
use agora_plugin::{PluginManifest, parse_plugin_manifest};

use crate::profile::FieldMap;
use crate::state::StateCodec;

const MANIFEST: &str = include_str!("../plugin.toml");

const DEFAULT_LOGO_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="24" height="24"><path fill="currentColor" d="M12 1a5 5 0 0 0-5 5v3H5v14h14V9h-2V6a5 5 0 0 0-5-5zm-3 5a3 3 0 0 1 6 0v3H9z"/></svg>"#;

/// Configuration of an [`OAuthConnector`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OAuthConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub authorize_url: String,
    #[serde(default)]
    pub token_url: String,
    #[serde(default)]
    pub user_info_url: String,
    /// Space separated scopes; omitted from the redirect when empty.
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How long an issued state stays valid.
    #[serde(default = "default_state_ttl_secs")]
    pub state_ttl_secs: u64,
    #[serde(default)]
    pub logo_svg: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(default = "default_name_field")]
    pub name_field: String,
    #[serde(default = "default_username_field")]
    pub username_field: String,
    #[serde(default = "default_email_field")]
    pub email_field: String,
    #[serde(default = "default_avatar_field")]
    pub avatar_field: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            authorize_url: String::new(),
            token_url: String::new(),
            user_info_url: String::new(),
            scope: String::new(),
            timeout_secs: default_timeout_secs(),
            state_ttl_secs: default_state_ttl_secs(),
            logo_svg: String::new(),
            id_field: default_id_field(),
            name_field: default_name_field(),
            username_field: default_username_field(),
            email_field: default_email_field(),
            avatar_field: default_avatar_field(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_state_ttl_secs() -> u64 {
    600
}

fn default_id_field() -> String {
    "id".to_string()
}

fn default_name_field() -> String {
    "name".to_string()
}

fn default_username_field() -> String {
    "login".to_string()
}

fn default_email_field() -> String {
    "email".to_string()
}

fn default_avatar_field() -> String {
    "avatar_url".to_string()
}

impl PluginConfig for OAuthConfig {
    fn validate(&self) -> Result<(), AgoraError> {
        for (name, url) in [
            ("authorize_url", &self.authorize_url),
            ("token_url", &self.token_url),
            ("user_info_url", &self.user_info_url),
        ] {
            if !url.is_empty() && reqwest::Url::parse(url).is_err() {
                return Err(AgoraError::Config(format!(
                    "oauth_connector: {name} `{url}` is not a valid URL"
                )));
            }
        }
        if self.timeout_secs == 0 || self.state_ttl_secs == 0 {
            return Err(AgoraError::Config(
                "oauth_connector: timeout_secs and state_ttl_secs must be at least 1".to_string(),
            ));
        }
        if self.id_field.trim().is_empty() {
            return Err(AgoraError::Config(
                "oauth_connector: id_field must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn is_configured(&self) -> bool {
        !self.client_id.is_empty()
            && !self.client_secret.is_empty()
            && !self.authorize_url.is_empty()
            && !self.token_url.is_empty()
            && !self.user_info_url.is_empty()
    }

    fn keep_secrets(&mut self, previous: &Self) {
        keep_secret(&mut self.client_secret, &previous.client_secret);
    }
}

impl OAuthConfig {
    fn state_codec(&self) -> StateCodec<'_> {
        StateCodec::new(&self.client_secret, self.state_ttl_secs)
    }

    fn field_map(&self) -> FieldMap<'_> {
        FieldMap {
            id: &self.id_field,
            name: &self.name_field,
            username: &self.username_field,
            email: &self.email_field,
            avatar: &self.avatar_field,
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

fn unix_now() -> Result<u64, AgoraError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| AgoraError::Internal(format!("system clock before Unix epoch: {e}")))
}

/// Connector plugin for OAuth2 authorization-code providers.
pub struct OAuthConnector {
    manifest: Arc<PluginManifest>,
    config: ConfigSlot<OAuthConfig>,
    client: reqwest::Client,
}

impl OAuthConnector {
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

    async fn exchange_code(
        &self,
        config: &OAuthConfig,
        code: &str,
        receiver_url: &str,
    ) -> Result<String, AgoraError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", receiver_url),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
        ];
        let response = self
            .client
            .post(&config.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(Duration::from_secs(config.timeout_secs))
            .form(&form)
            .send()
            .await
            .map_err(|e| AgoraError::backend_source("token exchange failed", e, true))?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            let body = response.text().await.unwrap_or_default();
            return Err(AgoraError::http_status(status.as_u16(), body));
        }
        if !status.is_success() {
            return Err(AgoraError::Authentication(format!(
                "token exchange rejected with {status}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AgoraError::Authentication(format!("token response is not valid JSON: {e}"))
        })?;
        if let Some(error) = token.error {
            return Err(AgoraError::Authentication(format!(
                "token exchange rejected: {error} {}",
                token.error_description.unwrap_or_default()
            )));
        }
        if token.access_token.is_empty() {
            return Err(AgoraError::Authentication(
                "token response carries no access_token".to_string(),
            ));
        }
        Ok(token.access_token)
    }

    async fn fetch_user_info(
        &self,
        config: &OAuthConfig,
        access_token: &str,
    ) -> Result<String, AgoraError> {
        let response = self
            .client
            .get(&config.user_info_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(access_token)
            .timeout(Duration::from_secs(config.timeout_secs))
            .send()
            .await
            .map_err(|e| AgoraError::backend_source("userinfo request failed", e, true))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AgoraError::backend_source("failed to read userinfo body", e, true))?;
        if status.is_server_error() || status.as_u16() == 429 {
            return Err(AgoraError::http_status(status.as_u16(), body));
        }
        if !status.is_success() {
            return Err(AgoraError::Authentication(format!(
                "userinfo request rejected with {status}"
            )));
        }
        Ok(body)
    }
}

impl Plugin for OAuthConnector {
    fn info(&self) -> PluginInfo {
        self.manifest.info()
    }

    fn slug_name(&self) -> &str {
        &self.manifest.slug_name
    }

    fn config_fields(&self) -> Vec<ConfigField> {
        let config = self.config.load();
        vec![
            ConfigField::new("client_id", ConfigFieldType::Input, true)
                .with_value(config.client_id.clone()),
            ConfigField::new("client_secret", ConfigFieldType::Secret, true)
                .with_secret(&config.client_secret),
            ConfigField::new("authorize_url", ConfigFieldType::Input, true)
                .with_value(config.authorize_url.clone()),
            ConfigField::new("token_url", ConfigFieldType::Input, true)
                .with_value(config.token_url.clone()),
            ConfigField::new("user_info_url", ConfigFieldType::Input, true)
                .with_value(config.user_info_url.clone()),
            ConfigField::new("scope", ConfigFieldType::Input, false)
                .with_value(config.scope.clone()),
            ConfigField::new("id_field", ConfigFieldType::Input, false)
                .with_value(config.id_field.clone()),
            ConfigField::new("name_field", ConfigFieldType::Input, false)
                .with_value(config.name_field.clone()),
            ConfigField::new("username_field", ConfigFieldType::Input, false)
                .with_value(config.username_field.clone()),
            ConfigField::new("email_field", ConfigFieldType::Input, false)
                .with_value(config.email_field.clone()),
            ConfigField::new("avatar_field", ConfigFieldType::Input, false)
                .with_value(config.avatar_field.clone()),
            ConfigField::new("timeout_secs", ConfigFieldType::Number, false)
                .with_value(config.timeout_secs),
            ConfigField::new("state_ttl_secs", ConfigFieldType::Number, false)
                .with_value(config.state_ttl_secs),
            ConfigField::new("logo_svg", ConfigFieldType::Input, false)
                .with_value(config.logo_svg.clone()),
        ]
    }

    fn receive_config(&self, config: &serde_json::Value) -> Result<(), AgoraError> {
        self.config.receive(config)
    }

    fn as_connector(&self) -> Option<&dyn Connector> {
        Some(self)
    }
}

#[async_trait]
impl Connector for OAuthConnector {
    fn connector_logo_svg(&self) -> String {
        let config = self.config.load();
        if config.logo_svg.is_empty() {
            DEFAULT_LOGO_SVG.to_string()
        } else {
            config.logo_svg.clone()
        }
    }

    fn connector_name(&self) -> Translator {
        self.manifest.info().name
    }

    fn connector_slug_name(&self) -> String {
        self.manifest.slug_name.clone()
    }

    async fn connector_sender(&self, receiver_url: &str) -> Result<String, AgoraError> {
        let config = self.config.ready()?;
        let state = config.state_codec().issue(receiver_url, unix_now()?)?;

        let mut url = reqwest::Url::parse(&config.authorize_url)
            .map_err(|e| AgoraError::Config(format!("invalid authorize_url: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &config.client_id)
                .append_pair("redirect_uri", receiver_url)
                .append_pair("state", &state);
            if !config.scope.is_empty() {
                query.append_pair("scope", &config.scope);
            }
        }
        debug!(connector = %self.manifest.slug_name, "issued authorization redirect");
        Ok(url.into())
    }

    async fn connector_receiver(
        &self,
        request: &CallbackRequest,
        receiver_url: &str,
    ) -> Result<ExternalLoginUserInfo, AgoraError> {
        let config = self.config.ready()?;

        if let Some(error) = request.param("error") {
            warn!(error, "provider reported an authorization error");
            return Err(AgoraError::Authentication(format!(
                "provider returned `{error}`: {}",
                request.param("error_description").unwrap_or_default()
            )));
        }

        let state = request
            .param("state")
            .ok_or_else(|| AgoraError::Authentication("callback carries no state".to_string()))?;
        if let Err(e) = config.state_codec().verify(state, receiver_url, unix_now()?) {
            warn!(error = %e, "rejected callback state");
            return Err(e);
        }

        let code = request
            .param("code")
            .ok_or_else(|| AgoraError::Authentication("callback carries no code".to_string()))?;

        let access_token = self.exchange_code(&config, code, receiver_url).await?;
        let raw = self.fetch_user_info(&config, &access_token).await?;
        let user = config.field_map().extract(&raw)?;

        info!(
            connector = %self.manifest.slug_name,
            external_id = %user.external_id,
            "external login completed"
        );
        Ok(user)
    }
}
