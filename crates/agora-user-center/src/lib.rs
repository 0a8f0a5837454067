// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory-service user center plugin for the Agora framework.
//!
//! Accounts live in an external directory reached over HTTP:
//!
//! | operation | request |
//! |---|---|
//! | login callback | `GET {endpoint}/tickets/{ticket}` |
//! | sign-up callback | `POST {endpoint}/signups/{ticket}` |
//! | user info / status | `GET {endpoint}/users/{id}` (404 = unknown) |
//! | user list | `POST {endpoint}/users/batch` with `{"ids": [...]}` |
//! | after login | `POST {endpoint}/sessions`, in the background |

mod client;
mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, warn};

use agora_core::types::{
    CallbackRequest, ConfigField, ConfigFieldType, UserCenterBasicUserInfo, UserCenterDesc,
    UserStatus,
};
use agora_core::{
    AgoraError, ConfigSlot, Plugin, PluginConfig, PluginInfo, UserCenter, keep_secret,
};
use agora_plugin::{PluginManifest, parse_plugin_manifest};

use crate::client::DirectoryClient;
use crate::routes::RouteState;

const MANIFEST: &str = include_str!("../plugin.toml");

/// Configuration of a [`RemoteUserCenter`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteUserCenterConfig {
    /// Base URL of the directory API.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Directory page users are sent to for login.
    #[serde(default)]
    pub login_url: String,
    #[serde(default)]
    pub sign_up_url: String,
    #[serde(default)]
    pub profile_url: String,
    /// Keep the host's own username/password login available.
    #[serde(default)]
    pub enabled_original_user_system: bool,
}

impl Default for RemoteUserCenterConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            login_url: String::new(),
            sign_up_url: String::new(),
            profile_url: String::new(),
            enabled_original_user_system: false,
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

impl PluginConfig for RemoteUserCenterConfig {
    fn validate(&self) -> Result<(), AgoraError> {
        if !self.endpoint.is_empty() {
            let url = reqwest::Url::parse(&self.endpoint).map_err(|e| {
                AgoraError::Config(format!("remote_user_center: invalid endpoint: {e}"))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(AgoraError::Config(format!(
                    "remote_user_center: endpoint `{}` must be an http(s) URL",
                    self.endpoint
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(AgoraError::Config(
                "remote_user_center: timeout_secs must be at least 1".to_string(),
            ));
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

/// User center plugin backed by an HTTP directory service.
pub struct RemoteUserCenter {
    manifest: Arc<PluginManifest>,
    config: Arc<ConfigSlot<RemoteUserCenterConfig>>,
    client: DirectoryClient,
}

impl RemoteUserCenter {
    pub fn new() -> Result<Self, AgoraError> {
        let manifest = Arc::new(parse_plugin_manifest(MANIFEST)?);
        Self::from_manifest(manifest)
    }

    pub fn from_manifest(manifest: Arc<PluginManifest>) -> Result<Self, AgoraError> {
        let config = Arc::new(ConfigSlot::new(manifest.slug_name.clone()));
        Ok(Self {
            manifest,
            config,
            client: DirectoryClient::new()?,
        })
    }

    fn route_state(&self) -> RouteState {
        RouteState {
            slug: self.manifest.slug_name.clone(),
            config: Arc::clone(&self.config),
        }
    }

    async fn redeem(
        &self,
        request: &CallbackRequest,
        method: Method,
        collection: &str,
    ) -> Result<UserCenterBasicUserInfo, AgoraError> {
        let config = self.config.ready()?;
        let ticket = request
            .param("ticket")
            .ok_or_else(|| AgoraError::Authentication("callback carries no ticket".to_string()))?;
        let user = self
            .client
            .redeem_ticket(&config, method, collection, ticket)
            .await?;
        debug!(external_id = %user.external_id, collection, "ticket redeemed");
        Ok(user)
    }
}

impl Plugin for RemoteUserCenter {
    fn info(&self) -> PluginInfo {
        self.manifest.info()
    }

    fn slug_name(&self) -> &str {
        &self.manifest.slug_name
    }

    fn config_fields(&self) -> Vec<ConfigField> {
        let config = self.config.load();
        vec![
            ConfigField::new("endpoint", ConfigFieldType::Input, true)
                .with_value(config.endpoint.clone()),
            ConfigField::new("api_key", ConfigFieldType::Secret, false)
                .with_secret(&config.api_key),
            ConfigField::new("timeout_secs", ConfigFieldType::Number, false)
                .with_value(config.timeout_secs),
            ConfigField::new("login_url", ConfigFieldType::Input, false)
                .with_value(config.login_url.clone()),
            ConfigField::new("sign_up_url", ConfigFieldType::Input, false)
                .with_value(config.sign_up_url.clone()),
            ConfigField::new("profile_url", ConfigFieldType::Input, false)
                .with_value(config.profile_url.clone()),
            ConfigField::new("enabled_original_user_system", ConfigFieldType::Switch, false)
                .with_value(config.enabled_original_user_system),
        ]
    }

    fn receive_config(&self, config: &serde_json::Value) -> Result<(), AgoraError> {
        self.config.receive(config)
    }

    fn as_user_center(&self) -> Option<&dyn UserCenter> {
        Some(self)
    }
}

#[async_trait]
impl UserCenter for RemoteUserCenter {
    fn description(&self) -> UserCenterDesc {
        let config = self.config.load();
        UserCenterDesc {
            name: self.manifest.name.clone(),
            description: self.manifest.description.clone(),
            url: config.endpoint.clone(),
            login_redirect_url: config.login_url.clone(),
            sign_up_redirect_url: config.sign_up_url.clone(),
            enabled_original_user_system: config.enabled_original_user_system,
        }
    }

    async fn login_callback(
        &self,
        request: &CallbackRequest,
    ) -> Result<UserCenterBasicUserInfo, AgoraError> {
        self.redeem(request, Method::GET, "tickets").await
    }

    async fn sign_up_callback(
        &self,
        request: &CallbackRequest,
    ) -> Result<UserCenterBasicUserInfo, AgoraError> {
        self.redeem(request, Method::POST, "signups").await
    }

    async fn user_info(
        &self,
        external_id: &str,
    ) -> Result<Option<UserCenterBasicUserInfo>, AgoraError> {
        let config = self.config.ready()?;
        if external_id.is_empty() {
            return Ok(None);
        }
        self.client.user(&config, external_id).await
    }

    async fn user_list(
        &self,
        external_ids: &[String],
    ) -> Result<Vec<UserCenterBasicUserInfo>, AgoraError> {
        let config = self.config.ready()?;
        self.client.users(&config, external_ids).await
    }

    async fn user_status(&self, external_id: &str) -> Result<UserStatus, AgoraError> {
        Ok(self
            .user_info(external_id)
            .await?
            .map_or(UserStatus::Deleted, |user| user.status))
    }

    fn after_login(&self, external_id: &str, access_token: &str) {
        let Ok(config) = self.config.ready() else {
            warn!(
                external_id = %external_id,
                "after_login called before the user center was configured, session not recorded"
            );
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("after_login called outside a tokio runtime, session not recorded");
            return;
        };
        let client = self.client.clone();
        let external_id = external_id.to_string();
        let access_token = access_token.to_string();
        runtime.spawn(async move {
            if let Err(e) = client
                .record_session(&config, &external_id, &access_token)
                .await
            {
                warn!(error = %e, external_id = %external_id, "failed to record session");
            }
        });
    }

    fn register_unauth_router(&self, router: Router) -> Router {
        routes::unauth(router, self.route_state())
    }

    fn register_auth_user_router(&self, router: Router) -> Router {
        routes::auth_user(router, self.route_state())
    }

    fn register_auth_admin_router(&self, router: Router) -> Router {
        routes::auth_admin(router, self.route_state())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use agora_core::CapabilityKind;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;
    use tracing_test::traced_test;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user_center(endpoint: &str) -> RemoteUserCenter {
        let user_center = RemoteUserCenter::new().unwrap();
        user_center
            .receive_config(&serde_json::json!({
                "endpoint": endpoint,
                "api_key": "dir-key",
                "login_url": "https://sso.example.com/login",
                "sign_up_url": "https://sso.example.com/signup",
            }))
            .unwrap();
        user_center
    }

    fn user(id: &str, status: &str) -> serde_json::Value {
        serde_json::json!({
            "external_id": id,
            "username": format!("user-{id}"),
            "display_name": format!("User {id}"),
            "status": status,
        })
    }

    async fn get(router: Router, uri: &str) -> axum::response::Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[test]
    fn declares_user_center_capability() {
        let user_center = RemoteUserCenter::new().unwrap();
        assert_eq!(user_center.capabilities(), vec![CapabilityKind::UserCenter]);
        let desc = user_center.description();
        assert_eq!(desc.name, "Remote User Center");
        assert!(!desc.enabled_original_user_system);
    }

    #[tokio::test]
    async fn login_callback_redeems_ticket() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tickets/t-1"))
            .and(wiremock::matchers::header("authorization", "Bearer dir-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user("42", "available")))
            .expect(1)
            .mount(&server)
            .await;

        let user_center = user_center(&server.uri());
        let request = CallbackRequest::from_pairs([("ticket", "t-1")]);
        let user = user_center.login_callback(&request).await.unwrap();
        assert_eq!(user.external_id, "42");
        assert_eq!(user.username, "user-42");
    }

    #[tokio::test]
    async fn sign_up_callback_posts_ticket() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/signups/s-9"))
            .respond_with(ResponseTemplate::new(201).set_body_json(user("77", "available")))
            .expect(1)
            .mount(&server)
            .await;

        let user_center = user_center(&server.uri());
        let request = CallbackRequest::from_pairs([("ticket", "s-9")]);
        let user = user_center.sign_up_callback(&request).await.unwrap();
        assert_eq!(user.external_id, "77");
    }

    #[tokio::test]
    async fn rejected_or_missing_ticket_is_authentication_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tickets/stale"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let user_center = user_center(&server.uri());

        let stale = CallbackRequest::from_pairs([("ticket", "stale")]);
        assert!(matches!(
            user_center.login_callback(&stale).await,
            Err(AgoraError::Authentication(_))
        ));

        let empty = CallbackRequest::default();
        assert!(matches!(
            user_center.login_callback(&empty).await,
            Err(AgoraError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn unknown_user_is_none_and_deleted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user("7", "suspended")))
            .mount(&server)
            .await;
        let user_center = user_center(&server.uri());

        assert_eq!(user_center.user_info("ghost").await.unwrap(), None);
        assert_eq!(
            user_center.user_status("ghost").await.unwrap(),
            UserStatus::Deleted
        );
        assert_eq!(
            user_center.user_status("7").await.unwrap(),
            UserStatus::Suspended
        );
    }

    #[tokio::test]
    async fn user_list_omits_unknown_ids_and_keeps_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/batch"))
            .and(body_json(serde_json::json!({"ids": ["3", "missing", "1"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "users": [user("1", "available"), user("3", "available")],
            })))
            .expect(1)
            .mount(&server)
            .await;
        let user_center = user_center(&server.uri());

        let ids = vec!["3".to_string(), "missing".to_string(), "1".to_string()];
        let users = user_center.user_list(&ids).await.unwrap();
        let found: Vec<&str> = users.iter().map(|u| u.external_id.as_str()).collect();
        assert_eq!(found, vec!["3", "1"]);

        assert!(user_center.user_list(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn directory_outage_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let err = user_center(&server.uri())
            .user_info("1")
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn after_login_returns_immediately_and_records_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions"))
            .and(body_json(serde_json::json!({"external_id": "42", "access_token": "at"})))
            .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_millis(200)))
            .expect(1)
            .mount(&server)
            .await;
        let user_center = user_center(&server.uri());

        let started = std::time::Instant::now();
        user_center.after_login("42", "at");
        assert!(started.elapsed() < Duration::from_millis(100));

        for _ in 0..50 {
            let received = server.received_requests().await.unwrap_or_default();
            if !received.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn unconfigured_user_center_reports_not_configured() {
        let user_center = RemoteUserCenter::new().unwrap();
        assert!(matches!(
            user_center.user_info("1").await,
            Err(AgoraError::NotConfigured { .. })
        ));
        user_center.after_login("1", "token");
        assert!(logs_contain("before the user center was configured"));
    }

    #[test]
    fn redacted_api_key_is_kept_on_resubmit() {
        let user_center = user_center("https://dir.example.com");
        user_center
            .receive_config(&serde_json::json!({
                "endpoint": "https://dir.example.com",
                "api_key": "dir-key",
            }))
            .unwrap();
        user_center
            .receive_config(&serde_json::json!({
                "endpoint": "https://dir2.example.com",
                "api_key": agora_core::types::REDACTED,
            }))
            .unwrap();
        let config = user_center.config.load();
        assert_eq!(config.endpoint, "https://dir2.example.com");
        assert_eq!(config.api_key, "dir-key");
    }

    #[tokio::test]
    async fn routes_are_split_by_trust_tier() {
        let user_center = user_center("https://dir.example.com");

        let unauth = user_center.register_unauth_router(Router::new());
        let response = get(unauth.clone(), "/user-center/remote_user_center/login").await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://sso.example.com/login"
        );
        let response = get(unauth, "/user-center/remote_user_center/status").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let user = user_center.register_auth_user_router(Router::new());
        let response = get(user, "/user-center/remote_user_center/profile").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let admin = user_center.register_auth_admin_router(Router::new());
        let response = get(admin, "/user-center/remote_user_center/status").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let status: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(status["configured"], true);
        assert_eq!(status["has_api_key"], true);
        assert!(status.get("api_key").is_none());
    }
}
