// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry for discovering plugins by capability.
//!
//! Registration happens during initialization through a [`RegistryBuilder`],
//! which may be shared across threads. [`RegistryBuilder::build`] freezes the
//! registrations into a [`PluginRegistry`]: after that point the set of plugins
//! never changes and lookups take no locks. Only the per-plugin enabled flag
//! can still be toggled, atomically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use agora_core::{
    AgoraError, Cache, CapabilityKind, Connector, Notification, Plugin, Reviewer, Search, Storage,
    UserCenter,
};
use tracing::{debug, info};

use crate::manifest::is_valid_slug;

/// Status of a plugin in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginStatus {
    /// Plugin is returned by lookups.
    Enabled,
    /// Plugin is registered but hidden from lookups.
    Disabled,
}

impl std::fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginStatus::Enabled => write!(f, "enabled"),
            PluginStatus::Disabled => write!(f, "disabled"),
        }
    }
}

/// A single registered plugin instance.
pub struct PluginEntry {
    plugin: Arc<dyn Plugin>,
    capabilities: Vec<CapabilityKind>,
    enabled: AtomicBool,
}

impl PluginEntry {
    pub fn plugin(&self) -> &Arc<dyn Plugin> {
        &self.plugin
    }

    pub fn slug_name(&self) -> &str {
        self.plugin.slug_name()
    }

    /// Capabilities this instance was registered under.
    pub fn capabilities(&self) -> &[CapabilityKind] {
        &self.capabilities
    }

    pub fn status(&self) -> PluginStatus {
        if self.is_enabled() {
            PluginStatus::Enabled
        } else {
            PluginStatus::Disabled
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEntry")
            .field("slug_name", &self.slug_name())
            .field("capabilities", &self.capabilities)
            .field("status", &self.status())
            .finish()
    }
}

#[derive(Default)]
struct Registrations {
    entries: Vec<PluginEntry>,
    by_kind: HashMap<CapabilityKind, Vec<usize>>,
}

/// Collects plugin instances during process initialization.
///
/// `register` takes `&self`: each call is one atomic append under a single
/// mutex, so plugins may self-register from several threads.
#[derive(Default)]
pub struct RegistryBuilder {
    inner: Mutex<Registrations>,
}

impl RegistryBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin with status `Enabled`.
    pub fn register(&self, plugin: Arc<dyn Plugin>) -> Result<(), AgoraError> {
        self.register_with_status(plugin, PluginStatus::Enabled)
    }

    /// Register a plugin under every capability it declares.
    ///
    /// Fails without registering anything if the plugin declares no
    /// capability, its slug is malformed, the slug is already registered
    /// for one of its capability kinds, or it is a connector whose connector
    /// slug another connector already uses.
    pub fn register_with_status(
        &self,
        plugin: Arc<dyn Plugin>,
        status: PluginStatus,
    ) -> Result<(), AgoraError> {
        let slug = plugin.slug_name().to_string();
        if !is_valid_slug(&slug) {
            return Err(AgoraError::Config(format!("invalid plugin slug `{slug}`")));
        }

        let capabilities = plugin.capabilities();
        if capabilities.is_empty() {
            return Err(AgoraError::Config(format!(
                "plugin `{slug}` implements no capability"
            )));
        }

        let mut inner = self
            .inner
            .lock()
            .map_err(|_| AgoraError::Internal("plugin registry lock poisoned".to_string()))?;

        for kind in &capabilities {
            let taken = inner.by_kind.get(kind).is_some_and(|indices| {
                indices
                    .iter()
                    .any(|&i| inner.entries[i].slug_name() == slug)
            });
            if taken {
                return Err(AgoraError::DuplicatePlugin { kind: *kind, slug });
            }
        }

        // Connector slugs are unique across connectors, whatever the plugin slug.
        if let Some(connector) = plugin.as_connector() {
            let connector_slug = connector.connector_slug_name();
            let clash = inner
                .by_kind
                .get(&CapabilityKind::Connector)
                .map(Vec::as_slice)
                .unwrap_or_default()
                .iter()
                .filter_map(|&i| inner.entries[i].plugin.as_connector())
                .any(|c| c.connector_slug_name() == connector_slug);
            if clash {
                return Err(AgoraError::DuplicatePlugin {
                    kind: CapabilityKind::Connector,
                    slug: connector_slug,
                });
            }
        }

        let index = inner.entries.len();
        for kind in &capabilities {
            inner.by_kind.entry(*kind).or_default().push(index);
        }
        inner.entries.push(PluginEntry {
            plugin,
            capabilities: capabilities.clone(),
            enabled: AtomicBool::new(status == PluginStatus::Enabled),
        });

        info!(slug = %slug, ?capabilities, %status, "plugin registered");
        Ok(())
    }

    /// Returns the number of registered plugins.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    /// Returns true if no plugins are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freezes the registrations.
    pub fn build(self) -> PluginRegistry {
        let inner = self
            .inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        debug!(plugins = inner.entries.len(), "plugin registry frozen");
        PluginRegistry {
            entries: inner.entries,
            by_kind: inner.by_kind,
        }
    }
}

/// Which login mechanism the host should offer.
pub enum LoginFlow<'a> {
    /// An enabled user center owns login; connectors are not offered.
    UserCenter(&'a dyn UserCenter),
    /// Enabled connectors, in registration order (possibly none).
    Connectors(Vec<&'a dyn Connector>),
}

/// Frozen registry of plugin instances, queried by capability kind.
pub struct PluginRegistry {
    entries: Vec<PluginEntry>,
    by_kind: HashMap<CapabilityKind, Vec<usize>>,
}

impl PluginRegistry {
    /// Enabled entries implementing `kind`, in registration order.
    fn enabled(&self, kind: CapabilityKind) -> impl Iterator<Item = &PluginEntry> {
        self.by_kind
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&i| &self.entries[i])
            .filter(|e| e.is_enabled())
    }

    fn enabled_slug(&self, kind: CapabilityKind, slug: &str) -> Option<&PluginEntry> {
        self.enabled(kind).find(|e| e.slug_name() == slug)
    }

    /// Enabled plugins implementing `kind`, in registration order.
    pub fn lookup(&self, kind: CapabilityKind) -> Vec<Arc<dyn Plugin>> {
        self.enabled(kind).map(|e| Arc::clone(&e.plugin)).collect()
    }

    /// The enabled plugin with this slug implementing `kind`.
    pub fn lookup_slug(&self, kind: CapabilityKind, slug: &str) -> Option<Arc<dyn Plugin>> {
        self.enabled_slug(kind, slug).map(|e| Arc::clone(&e.plugin))
    }

    pub fn caches(&self) -> Vec<&dyn Cache> {
        self.enabled(CapabilityKind::Cache)
            .filter_map(|e| e.plugin.as_cache())
            .collect()
    }

    pub fn cache(&self, slug: &str) -> Option<&dyn Cache> {
        self.enabled_slug(CapabilityKind::Cache, slug)
            .and_then(|e| e.plugin.as_cache())
    }

    pub fn connectors(&self) -> Vec<&dyn Connector> {
        self.enabled(CapabilityKind::Connector)
            .filter_map(|e| e.plugin.as_connector())
            .collect()
    }

    /// Connector by its stable connector slug.
    pub fn connector(&self, connector_slug: &str) -> Option<&dyn Connector> {
        self.connectors()
            .into_iter()
            .find(|c| c.connector_slug_name() == connector_slug)
    }

    pub fn notifiers(&self) -> Vec<&dyn Notification> {
        self.enabled(CapabilityKind::Notification)
            .filter_map(|e| e.plugin.as_notification())
            .collect()
    }

    pub fn reviewers(&self) -> Vec<&dyn Reviewer> {
        self.enabled(CapabilityKind::Reviewer)
            .filter_map(|e| e.plugin.as_reviewer())
            .collect()
    }

    /// First enabled search plugin.
    pub fn search(&self) -> Option<&dyn Search> {
        self.enabled(CapabilityKind::Search)
            .find_map(|e| e.plugin.as_search())
    }

    /// First enabled storage plugin.
    pub fn storage(&self) -> Option<&dyn Storage> {
        self.enabled(CapabilityKind::Storage)
            .find_map(|e| e.plugin.as_storage())
    }

    /// First enabled user center.
    pub fn user_center(&self) -> Option<&dyn UserCenter> {
        self.enabled(CapabilityKind::UserCenter)
            .find_map(|e| e.plugin.as_user_center())
    }

    /// Login mechanism to offer: a user center supersedes connectors.
    pub fn login_flow(&self) -> LoginFlow<'_> {
        match self.user_center() {
            Some(user_center) => LoginFlow::UserCenter(user_center),
            None => LoginFlow::Connectors(self.connectors()),
        }
    }

    /// Toggle every registration of a plugin.
    pub fn set_enabled(&self, slug: &str, enabled: bool) -> Result<(), AgoraError> {
        let mut found = false;
        for entry in self.entries.iter().filter(|e| e.slug_name() == slug) {
            entry.enabled.store(enabled, Ordering::Release);
            found = true;
        }
        if !found {
            return Err(AgoraError::PluginNotFound {
                slug: slug.to_string(),
            });
        }
        info!(slug, enabled, "plugin status changed");
        Ok(())
    }

    /// Deliver host configuration to every instance registered under `slug`.
    pub fn configure(&self, slug: &str, config: &serde_json::Value) -> Result<(), AgoraError> {
        let mut delivered: Vec<&Arc<dyn Plugin>> = Vec::new();
        for entry in self.entries.iter().filter(|e| e.slug_name() == slug) {
            if delivered.iter().any(|p| Arc::ptr_eq(p, &entry.plugin)) {
                continue;
            }
            entry.plugin.receive_config(config)?;
            delivered.push(&entry.plugin);
        }
        if delivered.is_empty() {
            return Err(AgoraError::PluginNotFound {
                slug: slug.to_string(),
            });
        }
        Ok(())
    }

    /// Get an entry by slug.
    pub fn get(&self, slug: &str) -> Option<&PluginEntry> {
        self.entries.iter().find(|e| e.slug_name() == slug)
    }

    /// All entries in registration order.
    pub fn entries(&self) -> &[PluginEntry] {
        &self.entries
    }

    /// List all entries, enabled or not, sorted by slug.
    pub fn list_all(&self) -> Vec<&PluginEntry> {
        let mut entries: Vec<&PluginEntry> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.slug_name().cmp(b.slug_name()));
        entries
    }

    /// Returns the number of registered plugins.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no plugins are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
