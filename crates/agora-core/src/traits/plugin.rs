// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait that every plugin implements.

use crate::error::AgoraError;
use crate::traits::{Cache, Connector, Notification, Reviewer, Search, Storage, UserCenter};
use crate::types::{CapabilityKind, ConfigField, PluginInfo};

/// The base trait for all Agora plugins.
///
/// A plugin declares the capabilities it implements by overriding the matching
/// `as_*` accessor to return `Some(self)`. That override only compiles when the
/// plugin actually implements the capability trait, so a declaration can never
/// drift from the implementation.
pub trait Plugin: Send + Sync + 'static {
    /// Descriptor for the host's plugin-management UI. Pure and infallible.
    fn info(&self) -> PluginInfo;

    /// Durable identity of this plugin, equal to `info().slug_name`.
    fn slug_name(&self) -> &str;

    /// Fields the plugin accepts in its configuration.
    fn config_fields(&self) -> Vec<ConfigField> {
        Vec::new()
    }

    /// Receives configuration delivered by the host as a JSON object.
    fn receive_config(&self, _config: &serde_json::Value) -> Result<(), AgoraError> {
        Ok(())
    }

    fn as_cache(&self) -> Option<&dyn Cache> {
        None
    }

    fn as_connector(&self) -> Option<&dyn Connector> {
        None
    }

    fn as_notification(&self) -> Option<&dyn Notification> {
        None
    }

    fn as_reviewer(&self) -> Option<&dyn Reviewer> {
        None
    }

    fn as_search(&self) -> Option<&dyn Search> {
        None
    }

    fn as_storage(&self) -> Option<&dyn Storage> {
        None
    }

    fn as_user_center(&self) -> Option<&dyn UserCenter> {
        None
    }

    /// Whether this plugin implements the given capability.
    fn implements(&self, kind: CapabilityKind) -> bool {
        match kind {
            CapabilityKind::Cache => self.as_cache().is_some(),
            CapabilityKind::Connector => self.as_connector().is_some(),
            CapabilityKind::Notification => self.as_notification().is_some(),
            CapabilityKind::Reviewer => self.as_reviewer().is_some(),
            CapabilityKind::Search => self.as_search().is_some(),
            CapabilityKind::Storage => self.as_storage().is_some(),
            CapabilityKind::UserCenter => self.as_user_center().is_some(),
        }
    }

    /// All capabilities this plugin implements, in [`CapabilityKind::ALL`] order.
    fn capabilities(&self) -> Vec<CapabilityKind> {
        CapabilityKind::ALL
            .into_iter()
            .filter(|kind| self.implements(*kind))
            .collect()
    }
}
