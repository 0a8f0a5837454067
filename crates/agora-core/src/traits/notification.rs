// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification capability.

use async_trait::async_trait;

use crate::error::AgoraError;
use crate::traits::plugin::Plugin;
use crate::types::NotificationMessage;

/// Delivers notifications to users through an external channel.
///
/// Implementations make a single bounded attempt; retries belong to the
/// host's delivery layer, guided by [`AgoraError::is_retryable`].
#[async_trait]
pub trait Notification: Plugin {
    async fn notify(&self, message: NotificationMessage) -> Result<(), AgoraError>;
}
