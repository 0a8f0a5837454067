// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A plugin that declares an arbitrary subset of capabilities.
//!
//! `StubPlugin` implements every capability trait with trivial behavior and
//! exposes through its `as_*` accessors only the kinds it was built with, so
//! registry tests can model any mix of capabilities.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use agora_core::types::{
    CallbackRequest, ExternalLoginUserInfo, FileUpload, NotificationMessage, ReviewContent,
    ReviewResult, SearchBasicCond, SearchContent, SearchPage, UploadFileCondition,
    UploadFileResponse, UserCenterBasicUserInfo, UserCenterDesc, UserStatus,
};
use agora_core::{
    AgoraError, Cache, CapabilityKind, Connector, Notification, Plugin, PluginInfo, Reviewer,
    Search, Storage, Translator, UserCenter,
};

/// Stub plugin with a configurable capability set.
pub struct StubPlugin {
    slug: String,
    connector_slug: Option<String>,
    capabilities: Vec<CapabilityKind>,
    received_config: Mutex<Option<serde_json::Value>>,
    notifications: AtomicUsize,
}

impl StubPlugin {
    pub fn new(slug: &str, capabilities: &[CapabilityKind]) -> Self {
        Self {
            slug: slug.to_string(),
            connector_slug: None,
            capabilities: capabilities.to_vec(),
            received_config: Mutex::new(None),
            notifications: AtomicUsize::new(0),
        }
    }

    /// Overrides the connector slug, which otherwise equals the plugin slug.
    pub fn with_connector_slug(mut self, connector_slug: &str) -> Self {
        self.connector_slug = Some(connector_slug.to_string());
        self
    }

    /// Last configuration delivered through `receive_config`.
    pub fn received_config(&self) -> Option<serde_json::Value> {
        self.received_config
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }

    /// Number of `notify` calls seen.
    pub fn notification_count(&self) -> usize {
        self.notifications.load(Ordering::SeqCst)
    }

    fn has(&self, kind: CapabilityKind) -> bool {
        self.capabilities.contains(&kind)
    }
}

impl Plugin for StubPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: Translator::new(format!("plugin.{}.name", self.slug), self.slug.clone()),
            slug_name: self.slug.clone(),
            description: Translator::new(format!("plugin.{}.description", self.slug), "stub"),
            author: "Agora Contributors".to_string(),
            version: "0.1.0".to_string(),
            link: String::new(),
        }
    }

    fn slug_name(&self) -> &str {
        &self.slug
    }

    fn receive_config(&self, config: &serde_json::Value) -> Result<(), AgoraError> {
        let mut guard = self
            .received_config
            .lock()
            .map_err(|_| AgoraError::Internal("stub config lock poisoned".into()))?;
        *guard = Some(config.clone());
        Ok(())
    }

    fn as_cache(&self) -> Option<&dyn Cache> {
        self.has(CapabilityKind::Cache).then_some(self as &dyn Cache)
    }

    fn as_connector(&self) -> Option<&dyn Connector> {
        self.has(CapabilityKind::Connector)
            .then_some(self as &dyn Connector)
    }

    fn as_notification(&self) -> Option<&dyn Notification> {
        self.has(CapabilityKind::Notification)
            .then_some(self as &dyn Notification)
    }

    fn as_reviewer(&self) -> Option<&dyn Reviewer> {
        self.has(CapabilityKind::Reviewer)
            .then_some(self as &dyn Reviewer)
    }

    fn as_search(&self) -> Option<&dyn Search> {
        self.has(CapabilityKind::Search).then_some(self as &dyn Search)
    }

    fn as_storage(&self) -> Option<&dyn Storage> {
        self.has(CapabilityKind::Storage)
            .then_some(self as &dyn Storage)
    }

    fn as_user_center(&self) -> Option<&dyn UserCenter> {
        self.has(CapabilityKind::UserCenter)
            .then_some(self as &dyn UserCenter)
    }
}

#[async_trait]
impl Cache for StubPlugin {
    async fn get_string(&self, _key: &str) -> Result<Option<String>, AgoraError> {
        Ok(None)
    }

    async fn set_string(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), AgoraError> {
        Ok(())
    }

    async fn get_int64(&self, _key: &str) -> Result<Option<i64>, AgoraError> {
        Ok(None)
    }

    async fn set_int64(&self, _key: &str, _value: i64, _ttl: Duration) -> Result<(), AgoraError> {
        Ok(())
    }

    async fn increase(&self, _key: &str, delta: i64) -> Result<i64, AgoraError> {
        Ok(delta)
    }

    async fn decrease(&self, _key: &str, delta: i64) -> Result<i64, AgoraError> {
        Ok(-delta)
    }

    async fn del(&self, _key: &str) -> Result<(), AgoraError> {
        Ok(())
    }

    async fn flush(&self) -> Result<(), AgoraError> {
        Ok(())
    }
}

#[async_trait]
impl Connector for StubPlugin {
    fn connector_logo_svg(&self) -> String {
        String::new()
    }

    fn connector_name(&self) -> Translator {
        Translator::new(format!("plugin.{}.name", self.slug), self.slug.clone())
    }

    fn connector_slug_name(&self) -> String {
        self.connector_slug.clone().unwrap_or_else(|| self.slug.clone())
    }

    async fn connector_sender(&self, receiver_url: &str) -> Result<String, AgoraError> {
        Ok(format!("{receiver_url}?state=stub"))
    }

    async fn connector_receiver(
        &self,
        request: &CallbackRequest,
        _receiver_url: &str,
    ) -> Result<ExternalLoginUserInfo, AgoraError> {
        if request.param("state") != Some("stub") {
            return Err(AgoraError::Authentication("state mismatch".into()));
        }
        Ok(ExternalLoginUserInfo {
            external_id: format!("stub-{}", self.slug),
            ..Default::default()
        })
    }
}

#[async_trait]
impl Notification for StubPlugin {
    async fn notify(&self, _message: NotificationMessage) -> Result<(), AgoraError> {
        self.notifications.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Reviewer for StubPlugin {
    async fn review(&self, _content: &ReviewContent) -> ReviewResult {
        ReviewResult::approved("stub")
    }
}

#[async_trait]
impl Search for StubPlugin {
    async fn search_contents(&self, _cond: &SearchBasicCond) -> Result<SearchPage, AgoraError> {
        Ok(SearchPage::default())
    }

    async fn update_content(&self, _content: &SearchContent) -> Result<(), AgoraError> {
        Ok(())
    }

    async fn delete_content(&self, _object_id: &str) -> Result<(), AgoraError> {
        Ok(())
    }
}

#[async_trait]
impl Storage for StubPlugin {
    async fn upload_file(
        &self,
        upload: &FileUpload,
        _condition: &UploadFileCondition,
    ) -> Result<UploadFileResponse, AgoraError> {
        Ok(UploadFileResponse {
            full_url: format!("https://stub.invalid/{}", upload.file_name),
            path: upload.file_name.clone(),
        })
    }

    async fn delete_file(&self, _path: &str) -> Result<(), AgoraError> {
        Ok(())
    }

    fn is_unsupported_file_type(&self, _file_name: &str, _condition: &UploadFileCondition) -> bool {
        false
    }

    fn exceed_file_size_limit(&self, _file_size: u64, _condition: &UploadFileCondition) -> bool {
        false
    }
}

#[async_trait]
impl UserCenter for StubPlugin {
    fn description(&self) -> UserCenterDesc {
        UserCenterDesc {
            name: self.slug.clone(),
            ..Default::default()
        }
    }

    async fn login_callback(
        &self,
        _request: &CallbackRequest,
    ) -> Result<UserCenterBasicUserInfo, AgoraError> {
        Ok(UserCenterBasicUserInfo {
            external_id: format!("stub-{}", self.slug),
            ..Default::default()
        })
    }

    async fn sign_up_callback(
        &self,
        request: &CallbackRequest,
    ) -> Result<UserCenterBasicUserInfo, AgoraError> {
        self.login_callback(request).await
    }

    async fn user_info(
        &self,
        _external_id: &str,
    ) -> Result<Option<UserCenterBasicUserInfo>, AgoraError> {
        Ok(None)
    }

    async fn user_list(
        &self,
        _external_ids: &[String],
    ) -> Result<Vec<UserCenterBasicUserInfo>, AgoraError> {
        Ok(Vec::new())
    }

    async fn user_status(&self, _external_id: &str) -> Result<UserStatus, AgoraError> {
        Ok(UserStatus::Available)
    }

    fn after_login(&self, _external_id: &str, _access_token: &str) {}
}
