// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the directory service.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use agora_core::AgoraError;
use agora_core::types::UserCenterBasicUserInfo;

use crate::RemoteUserCenterConfig;

#[derive(Serialize)]
struct BatchRequest<'a> {
    ids: &'a [String],
}

#[derive(Deserialize)]
struct BatchResponse {
    #[serde(default)]
    users: Vec<UserCenterBasicUserInfo>,
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    external_id: &'a str,
    access_token: &'a str,
}

/// Thin wrapper that builds authenticated, time-bounded requests.
#[derive(Clone)]
pub(crate) struct DirectoryClient {
    http: reqwest::Client,
}

impl DirectoryClient {
    pub(crate) fn new() -> Result<Self, AgoraError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AgoraError::backend_source("failed to build HTTP client", e, false))?;
        Ok(Self { http })
    }

    /// `endpoint` joined with percent-encoded path segments.
    fn url(config: &RemoteUserCenterConfig, segments: &[&str]) -> Result<Url, AgoraError> {
        let mut url = Url::parse(&config.endpoint)
            .map_err(|e| AgoraError::Config(format!("invalid endpoint: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| AgoraError::Config("endpoint cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        config: &RemoteUserCenterConfig,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, AgoraError> {
        let mut request = self
            .http
            .request(method, Self::url(config, segments)?)
            .timeout(Duration::from_secs(config.timeout_secs));
        if !config.api_key.is_empty() {
            request = request.bearer_auth(&config.api_key);
        }
        Ok(request)
    }

    async fn send(request: RequestBuilder, what: &str) -> Result<Response, AgoraError> {
        request
            .send()
            .await
            .map_err(|e| AgoraError::backend_source(format!("{what} request failed"), e, true))
    }

    async fn parse_user(response: Response) -> Result<UserCenterBasicUserInfo, AgoraError> {
        response
            .json()
            .await
            .map_err(|e| AgoraError::backend_source("malformed user document", e, false))
    }

    async fn status_error(response: Response) -> AgoraError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        AgoraError::http_status(status, body)
    }

    /// Resolves a login or sign-up ticket into the user it belongs to.
    pub(crate) async fn redeem_ticket(
        &self,
        config: &RemoteUserCenterConfig,
        method: Method,
        collection: &str,
        ticket: &str,
    ) -> Result<UserCenterBasicUserInfo, AgoraError> {
        let request = self.request(config, method, &[collection, ticket])?;
        let response = Self::send(request, collection).await?;
        match response.status() {
            status if status.is_success() => {
                let user = Self::parse_user(response).await?;
                if user.external_id.is_empty() {
                    return Err(AgoraError::Authentication(
                        "directory returned a user without external_id".to_string(),
                    ));
                }
                Ok(user)
            }
            StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
            | StatusCode::GONE => Err(AgoraError::Authentication(format!(
                "ticket rejected by directory ({})",
                response.status()
            ))),
            _ => Err(Self::status_error(response).await),
        }
    }

    pub(crate) async fn user(
        &self,
        config: &RemoteUserCenterConfig,
        external_id: &str,
    ) -> Result<Option<UserCenterBasicUserInfo>, AgoraError> {
        let request = self.request(config, Method::GET, &["users", external_id])?;
        let response = Self::send(request, "user lookup").await?;
        match response.status() {
            status if status.is_success() => Self::parse_user(response).await.map(Some),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(Self::status_error(response).await),
        }
    }

    /// Batch lookup; the result follows request order, without unknown or repeated ids.
    pub(crate) async fn users(
        &self,
        config: &RemoteUserCenterConfig,
        external_ids: &[String],
    ) -> Result<Vec<UserCenterBasicUserInfo>, AgoraError> {
        if external_ids.is_empty() {
            return Ok(Vec::new());
        }
        let request = self
            .request(config, Method::POST, &["users", "batch"])?
            .json(&BatchRequest { ids: external_ids });
        let response = Self::send(request, "batch lookup").await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }
        let batch: BatchResponse = response
            .json()
            .await
            .map_err(|e| AgoraError::backend_source("malformed batch response", e, false))?;

        let mut found: HashMap<String, UserCenterBasicUserInfo> = batch
            .users
            .into_iter()
            .map(|user| (user.external_id.clone(), user))
            .collect();
        let users: Vec<_> = external_ids
            .iter()
            .filter_map(|id| found.remove(id))
            .collect();
        debug!(
            requested = external_ids.len(),
            found = users.len(),
            "batch user lookup"
        );
        Ok(users)
    }

    pub(crate) async fn record_session(
        &self,
        config: &RemoteUserCenterConfig,
        external_id: &str,
        access_token: &str,
    ) -> Result<(), AgoraError> {
        let request = self
            .request(config, Method::POST, &["sessions"])?
            .json(&SessionRequest {
                external_id,
                access_token,
            });
        let response = Self::send(request, "session").await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::status_error(response).await)
        }
    }
}
