// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reference plugins shipped with the host, and registry assembly from
//! host configuration.

use std::sync::Arc;

use tracing::{info, warn};

use agora_config::{AgoraConfig, ConfigError, validate_plugin_slugs};
use agora_core::{AgoraError, Plugin};
use agora_plugin::{MessageCatalog, PluginRegistry, PluginStatus, RegistryBuilder};

const BUILTIN_LOCALES: &str = include_str!("../locales.toml");

/// Instantiates every reference plugin compiled into this build, in registration order.
pub fn builtin_plugins() -> Result<Vec<Arc<dyn Plugin>>, AgoraError> {
    let mut plugins: Vec<Arc<dyn Plugin>> = Vec::new();

    #[cfg(feature = "cache")]
    plugins.push(Arc::new(agora_cache::MemoryCache::new()?));
    #[cfg(feature = "connector")]
    plugins.push(Arc::new(agora_connector::OAuthConnector::new()?));
    #[cfg(feature = "notification")]
    plugins.push(Arc::new(agora_notification::WebhookNotifier::new()?));
    #[cfg(feature = "reviewer")]
    plugins.push(Arc::new(agora_reviewer::KeywordReviewer::new()?));
    #[cfg(feature = "search")]
    plugins.push(Arc::new(agora_search::MemorySearch::new()?));
    #[cfg(feature = "storage")]
    plugins.push(Arc::new(agora_storage::LocalStorage::new()?));
    #[cfg(feature = "user-center")]
    plugins.push(Arc::new(agora_user_center::RemoteUserCenter::new()?));

    Ok(plugins)
}

/// Display strings for the reference plugins, falling back to `en_US`.
pub fn builtin_catalog() -> Result<MessageCatalog, AgoraError> {
    Ok(MessageCatalog::from_toml(BUILTIN_LOCALES)?.with_fallback_lang("en_US"))
}

/// Registers the reference plugins with the status the configuration asks
/// for, then delivers each `[plugins.<slug>.config]` table.
///
/// Every problem is collected: unknown plugin sections, registration
/// conflicts, and configs a plugin rejects.
pub fn build_registry(config: &AgoraConfig) -> Result<PluginRegistry, Vec<ConfigError>> {
    let plugins = builtin_plugins().map_err(|e| vec![ConfigError::Other(e.to_string())])?;
    let known: Vec<&str> = plugins.iter().map(|p| p.slug_name()).collect();
    let mut errors = validate_plugin_slugs(config, &known);

    let builder = RegistryBuilder::new();
    for plugin in &plugins {
        let status = if config.is_enabled(plugin.slug_name()) {
            PluginStatus::Enabled
        } else {
            PluginStatus::Disabled
        };
        if let Err(e) = builder.register_with_status(Arc::clone(plugin), status) {
            errors.push(ConfigError::Other(e.to_string()));
        }
    }
    let registry = builder.build();

    for (slug, section) in &config.plugins {
        if registry.get(slug).is_none() {
            continue;
        }
        if let Err(e) = registry.configure(slug, &section.config_value()) {
            warn!(slug = %slug, error = %e, "plugin rejected its configuration");
            errors.push(ConfigError::Plugin {
                slug: slug.clone(),
                message: e.to_string(),
            });
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    info!(plugins = registry.len(), "plugin registry ready");
    Ok(registry)
}
