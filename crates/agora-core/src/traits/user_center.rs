// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! UserCenter capability: an external identity provider that owns user accounts.

use async_trait::async_trait;
use axum::Router;

use crate::error::AgoraError;
use crate::traits::plugin::Plugin;
use crate::types::{CallbackRequest, UserCenterBasicUserInfo, UserCenterDesc, UserStatus};

/// External identity provider.
///
/// When enabled it supersedes [`Connector`](crate::traits::Connector) plugins for
/// the login flow. `external_id` is the durable join key, as for connectors.
#[async_trait]
pub trait UserCenter: Plugin {
    fn description(&self) -> UserCenterDesc;

    async fn login_callback(
        &self,
        request: &CallbackRequest,
    ) -> Result<UserCenterBasicUserInfo, AgoraError>;

    async fn sign_up_callback(
        &self,
        request: &CallbackRequest,
    ) -> Result<UserCenterBasicUserInfo, AgoraError>;

    /// Point lookup. Unknown ids yield `Ok(None)`.
    async fn user_info(&self, external_id: &str)
    -> Result<Option<UserCenterBasicUserInfo>, AgoraError>;

    /// Batch lookup. Unknown ids are omitted from the result.
    async fn user_list(
        &self,
        external_ids: &[String],
    ) -> Result<Vec<UserCenterBasicUserInfo>, AgoraError>;

    /// Side-effect free status query.
    async fn user_status(&self, external_id: &str) -> Result<UserStatus, AgoraError>;

    /// Post-login hook. Must return immediately; any work runs in the background.
    fn after_login(&self, external_id: &str, access_token: &str);

    /// Attaches endpoints reachable without authentication.
    fn register_unauth_router(&self, router: Router) -> Router {
        router
    }

    /// Attaches endpoints reachable by any authenticated user.
    fn register_auth_user_router(&self, router: Router) -> Router {
        router
    }

    /// Attaches endpoints reachable by administrators only.
    fn register_auth_admin_router(&self, router: Router) -> Router {
        router
    }
}
