// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connector capability: OAuth-style external login.

use async_trait::async_trait;

use crate::error::AgoraError;
use crate::i18n::Translator;
use crate::traits::plugin::Plugin;
use crate::types::{CallbackRequest, ExternalLoginUserInfo};

/// Two-phase external login: redirect to the provider, then handle its callback.
#[async_trait]
pub trait Connector: Plugin {
    /// Logo rendered on the login button.
    fn connector_logo_svg(&self) -> String;

    /// Human-readable connector name.
    fn connector_name(&self) -> Translator;

    /// Stable identifier stored with login records. Never changes across releases.
    fn connector_slug_name(&self) -> String;

    /// Builds the provider authorization URL for a login that will return to `receiver_url`.
    async fn connector_sender(&self, receiver_url: &str) -> Result<String, AgoraError>;

    /// Completes the login from the provider callback.
    ///
    /// Fails with [`AgoraError::Authentication`] when the state does not
    /// correlate with `receiver_url` or the exchange fails. Never substitutes a
    /// default identity.
    async fn connector_receiver(
        &self,
        request: &CallbackRequest,
        receiver_url: &str,
    ) -> Result<ExternalLoginUserInfo, AgoraError>;
}
