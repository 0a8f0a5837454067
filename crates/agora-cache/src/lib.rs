// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory cache plugin for the Agora framework.
//!
//! Entries live in a [`MemoryBackend`] that several cache instances may share.
//! Each instance prefixes its keys with a namespace it has claimed on the
//! backend, so `flush` on one instance never touches another's keys.
//! Unconfigured instances claim the plugin slug, or a numbered variant of it
//! when another instance already holds the slug.

pub mod backend;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use agora_core::types::{ConfigField, ConfigFieldType};
use agora_core::{AgoraError, Cache, ConfigSlot, Plugin, PluginConfig, PluginInfo};
use agora_plugin::{PluginManifest, parse_plugin_manifest};

pub use backend::MemoryBackend;

const MANIFEST: &str = include_str!("../plugin.toml");

/// Configuration of a [`MemoryCache`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryCacheConfig {
    /// Key prefix isolating this instance; empty selects the instance's
    /// default namespace. Rejected while another instance holds it.
    #[serde(default)]
    pub namespace: String,
}

impl PluginConfig for MemoryCacheConfig {
    fn validate(&self) -> Result<(), AgoraError> {
        if self.namespace.contains(':') {
            return Err(AgoraError::Config(
                "memory_cache: namespace must not contain ':'".to_string(),
            ));
        }
        Ok(())
    }
}

/// Cache plugin backed by process memory.
pub struct MemoryCache {
    manifest: Arc<PluginManifest>,
    backend: Arc<MemoryBackend>,
    config: ConfigSlot<MemoryCacheConfig>,
    owner: u64,
    default_namespace: String,
}

impl MemoryCache {
    /// Creates an instance with its own private backend.
    pub fn new() -> Result<Self, AgoraError> {
        Self::with_backend(Arc::new(MemoryBackend::new()))
    }

    /// Creates an instance on a backend shared with other instances.
    pub fn with_backend(backend: Arc<MemoryBackend>) -> Result<Self, AgoraError> {
        let manifest = Arc::new(parse_plugin_manifest(MANIFEST)?);
        Ok(Self::from_manifest(manifest, backend))
    }

    pub fn from_manifest(manifest: Arc<PluginManifest>, backend: Arc<MemoryBackend>) -> Self {
        let config = ConfigSlot::new(manifest.slug_name.clone());
        let owner = backend.new_owner();
        let slug = manifest.slug_name.clone();
        let default_namespace = std::iter::once(slug.clone())
            .chain((0u64..).map(|n| format!("{slug}-{owner}-{n}")))
            .find(|candidate| backend.claim(candidate, owner))
            .unwrap_or_else(|| manifest.slug_name.clone());
        debug!(namespace = %default_namespace, "memory cache instance created");
        Self {
            manifest,
            backend,
            config,
            owner,
            default_namespace,
        }
    }

    /// The namespace this instance currently writes under.
    pub fn namespace(&self) -> String {
        let config = self.config.load();
        if config.namespace.is_empty() {
            self.default_namespace.clone()
        } else {
            config.namespace.clone()
        }
    }

    /// Releases `namespace` unless this instance still needs it.
    fn release_unless_kept(&self, namespace: &str, kept: &str) {
        if !namespace.is_empty() && namespace != kept && namespace != self.default_namespace {
            self.backend.release(namespace, self.owner);
        }
    }

    pub fn backend(&self) -> &Arc<MemoryBackend> {
        &self.backend
    }

    /// Drops expired entries from the backend.
    pub fn purge_expired(&self) -> usize {
        let purged = self.backend.purge_expired();
        debug!(purged, "memory cache purged expired entries");
        purged
    }

    fn prefix(&self) -> String {
        let mut prefix = self.namespace();
        prefix.push(':');
        prefix
    }

    fn full_key(&self, key: &str) -> String {
        let mut full = self.prefix();
        full.push_str(key);
        full
    }
}

impl Plugin for MemoryCache {
    fn info(&self) -> PluginInfo {
        self.manifest.info()
    }

    fn slug_name(&self) -> &str {
        &self.manifest.slug_name
    }

    fn config_fields(&self) -> Vec<ConfigField> {
        let config = self.config.load();
        vec![ConfigField::new("namespace", ConfigFieldType::Input, false)
            .with_value(config.namespace.clone())]
    }

    fn receive_config(&self, config: &serde_json::Value) -> Result<(), AgoraError> {
        let next = self.config.parse(config)?;
        next.validate()?;
        if !next.namespace.is_empty() && !self.backend.claim(&next.namespace, self.owner) {
            return Err(AgoraError::Config(format!(
                "memory_cache: namespace `{}` is held by another cache instance",
                next.namespace
            )));
        }

        let previous = self.config.load().namespace.clone();
        let requested = next.namespace.clone();
        if let Err(e) = self.config.store(next) {
            self.release_unless_kept(&requested, &previous);
            return Err(e);
        }
        self.release_unless_kept(&previous, &requested);
        Ok(())
    }

    fn as_cache(&self) -> Option<&dyn Cache> {
        Some(self)
    }
}

impl Drop for MemoryCache {
    fn drop(&mut self) {
        self.backend.release_all(self.owner);
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get_string(&self, key: &str) -> Result<Option<String>, AgoraError> {
        Ok(self.backend.get(&self.full_key(key)))
    }

    async fn set_string(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AgoraError> {
        self.backend.set(self.full_key(key), value.to_string(), ttl);
        Ok(())
    }

    async fn get_int64(&self, key: &str) -> Result<Option<i64>, AgoraError> {
        self.backend
            .get(&self.full_key(key))
            .map(|raw| {
                raw.parse::<i64>().map_err(|_| {
                    AgoraError::Validation(format!("value at `{key}` is not an integer"))
                })
            })
            .transpose()
    }

    async fn set_int64(&self, key: &str, value: i64, ttl: Duration) -> Result<(), AgoraError> {
        self.backend.set(self.full_key(key), value.to_string(), ttl);
        Ok(())
    }

    async fn increase(&self, key: &str, delta: i64) -> Result<i64, AgoraError> {
        self.backend.add(self.full_key(key), delta)
    }

    async fn decrease(&self, key: &str, delta: i64) -> Result<i64, AgoraError> {
        let negated = delta
            .checked_neg()
            .ok_or_else(|| AgoraError::Validation(format!("cannot decrease by {delta}")))?;
        self.backend.add(self.full_key(key), negated)
    }

    async fn del(&self, key: &str) -> Result<(), AgoraError> {
        self.backend.remove(&self.full_key(key));
        Ok(())
    }

    async fn flush(&self) -> Result<(), AgoraError> {
        let prefix = self.prefix();
        let removed = self.backend.remove_prefix(&prefix);
        debug!(namespace = %prefix.trim_end_matches(':'), removed, "memory cache flushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::CapabilityKind;

    fn cache() -> MemoryCache {
        MemoryCache::new().unwrap()
    }

    #[test]
    fn declares_cache_capability_only() {
        let cache = cache();
        assert_eq!(cache.capabilities(), vec![CapabilityKind::Cache]);
        assert_eq!(cache.info().slug_name, "memory_cache");
        assert_eq!(cache.info().version, "0.1.0");
    }

    #[tokio::test(start_paused = true)]
    async fn ttl_expires_entries() {
        let cache = cache();
        cache
            .set_string("session", "abc", Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(
            cache.get_string("session").await.unwrap().as_deref(),
            Some("abc")
        );

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(cache.get_string("session").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_ttl_never_expires() {
        let cache = cache();
        cache.set_int64("n", 7, Duration::ZERO).await.unwrap();
        tokio::time::advance(Duration::from_secs(3600)).await;
        assert_eq!(cache.get_int64("n").await.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn missing_key_is_none_not_error() {
        let cache = cache();
        assert_eq!(cache.get_string("nope").await.unwrap(), None);
        assert_eq!(cache.get_int64("nope").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increases_are_atomic() {
        let cache = Arc::new(cache());
        let mut handles = Vec::new();
        for _ in 0..100 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.increase("views", 1).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(cache.get_int64("views").await.unwrap(), Some(100));
    }

    #[tokio::test]
    async fn decrease_from_missing_key_goes_negative() {
        let cache = cache();
        assert_eq!(cache.decrease("k", 3).await.unwrap(), -3);
        assert_eq!(cache.increase("k", 5).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn increase_on_non_integer_fails_and_keeps_value() {
        let cache = cache();
        cache.set_string("k", "hello", Duration::ZERO).await.unwrap();
        let err = cache.increase("k", 1).await.unwrap_err();
        assert!(matches!(err, AgoraError::Validation(_)));
        assert_eq!(cache.get_string("k").await.unwrap().as_deref(), Some("hello"));
        assert!(cache.get_int64("k").await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn increase_preserves_ttl() {
        let cache = cache();
        cache
            .set_int64("k", 1, Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(cache.increase("k", 1).await.unwrap(), 2);

        tokio::time::advance(Duration::from_millis(60)).await;
        assert_eq!(cache.get_int64("k").await.unwrap(), None);
        // Expired counters restart from zero.
        assert_eq!(cache.increase("k", 1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn del_and_flush_are_idempotent() {
        let cache = cache();
        cache.set_string("a", "1", Duration::ZERO).await.unwrap();
        cache.del("a").await.unwrap();
        cache.del("a").await.unwrap();
        assert_eq!(cache.get_string("a").await.unwrap(), None);

        cache.set_string("b", "2", Duration::ZERO).await.unwrap();
        cache.flush().await.unwrap();
        cache.flush().await.unwrap();
        assert_eq!(cache.get_string("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn flush_is_scoped_to_namespace() {
        let backend = Arc::new(MemoryBackend::new());
        let questions = MemoryCache::with_backend(Arc::clone(&backend)).unwrap();
        let answers = MemoryCache::with_backend(Arc::clone(&backend)).unwrap();
        questions
            .receive_config(&serde_json::json!({"namespace": "questions"}))
            .unwrap();
        answers
            .receive_config(&serde_json::json!({"namespace": "answers"}))
            .unwrap();

        questions.set_string("k", "q", Duration::ZERO).await.unwrap();
        answers.set_string("k", "a", Duration::ZERO).await.unwrap();
        assert_eq!(questions.get_string("k").await.unwrap().as_deref(), Some("q"));

        questions.flush().await.unwrap();
        assert_eq!(questions.get_string("k").await.unwrap(), None);
        assert_eq!(answers.get_string("k").await.unwrap().as_deref(), Some("a"));
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn default_instances_on_shared_backend_are_isolated() {
        let backend = Arc::new(MemoryBackend::new());
        let first = MemoryCache::with_backend(Arc::clone(&backend)).unwrap();
        let second = MemoryCache::with_backend(Arc::clone(&backend)).unwrap();
        assert_eq!(first.namespace(), "memory_cache");
        assert_ne!(first.namespace(), second.namespace());

        first.set_string("k", "first", Duration::ZERO).await.unwrap();
        second.set_string("k", "second", Duration::ZERO).await.unwrap();
        assert_eq!(first.get_string("k").await.unwrap().as_deref(), Some("first"));

        first.flush().await.unwrap();
        assert_eq!(first.get_string("k").await.unwrap(), None);
        assert_eq!(
            second.get_string("k").await.unwrap().as_deref(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn colliding_namespace_is_rejected() {
        let backend = Arc::new(MemoryBackend::new());
        let holder = MemoryCache::with_backend(Arc::clone(&backend)).unwrap();
        let other = MemoryCache::with_backend(Arc::clone(&backend)).unwrap();

        let err = other
            .receive_config(&serde_json::json!({"namespace": "memory_cache"}))
            .unwrap_err();
        assert!(matches!(err, AgoraError::Config(_)));
        assert_ne!(other.namespace(), "memory_cache");

        holder.set_string("k", "held", Duration::ZERO).await.unwrap();
        other.set_string("k", "other", Duration::ZERO).await.unwrap();
        other.flush().await.unwrap();
        assert_eq!(holder.get_string("k").await.unwrap().as_deref(), Some("held"));

        other
            .receive_config(&serde_json::json!({"namespace": "shared"}))
            .unwrap();
        assert!(
            holder
                .receive_config(&serde_json::json!({"namespace": "shared"}))
                .is_err()
        );

        drop(other);
        assert!(!backend.is_claimed("shared"));
        holder
            .receive_config(&serde_json::json!({"namespace": "shared"}))
            .unwrap();
        assert_eq!(holder.namespace(), "shared");
    }

    #[test]
    fn reconfiguring_releases_the_previous_namespace() {
        let backend = Arc::new(MemoryBackend::new());
        let cache = MemoryCache::with_backend(Arc::clone(&backend)).unwrap();
        cache
            .receive_config(&serde_json::json!({"namespace": "first"}))
            .unwrap();
        cache
            .receive_config(&serde_json::json!({"namespace": "second"}))
            .unwrap();
        assert!(!backend.is_claimed("first"));
        assert!(backend.is_claimed("second"));

        cache.receive_config(&serde_json::json!({})).unwrap();
        assert!(!backend.is_claimed("second"));
        assert!(backend.is_claimed("memory_cache"));
        assert_eq!(cache.namespace(), "memory_cache");
    }

    #[test]
    fn rejects_namespace_with_separator() {
        let cache = cache();
        let err = cache
            .receive_config(&serde_json::json!({"namespace": "a:b"}))
            .unwrap_err();
        assert!(matches!(err, AgoraError::Config(_)));
    }
}
