// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory search plugin for the Agora framework.
//!
//! Documents are kept in a `BTreeMap` keyed by object id behind a
//! `tokio::sync::RwLock`. Writers replace whole documents, so a reader sees a
//! document either entirely before or entirely after an update.

mod index;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use agora_core::types::{
    ConfigField, ConfigFieldType, SearchBasicCond, SearchContent, SearchPage, SearchResult,
};
use agora_core::{AgoraError, ConfigSlot, Plugin, PluginConfig, PluginInfo, Search};
use agora_plugin::{PluginManifest, parse_plugin_manifest};

use crate::index::{Hit, IndexedDocument, compare, tokenize};

const MANIFEST: &str = include_str!("../plugin.toml");

/// Configuration of a [`MemorySearch`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemorySearchConfig {
    /// Page size used when a query asks for 0.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    /// Upper bound on any page size.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

impl Default for MemorySearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    20
}

fn default_max_page_size() -> usize {
    100
}

impl PluginConfig for MemorySearchConfig {
    fn validate(&self) -> Result<(), AgoraError> {
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(AgoraError::Config(
                "memory_search: page sizes must be at least 1".to_string(),
            ));
        }
        if self.default_page_size > self.max_page_size {
            return Err(AgoraError::Config(format!(
                "memory_search: default_page_size {} exceeds max_page_size {}",
                self.default_page_size, self.max_page_size
            )));
        }
        Ok(())
    }
}

/// Search plugin backed by an in-process index.
pub struct MemorySearch {
    manifest: Arc<PluginManifest>,
    config: ConfigSlot<MemorySearchConfig>,
    documents: RwLock<BTreeMap<String, IndexedDocument>>,
}

impl MemorySearch {
    pub fn new() -> Result<Self, AgoraError> {
        let manifest = Arc::new(parse_plugin_manifest(MANIFEST)?);
        Ok(Self::from_manifest(manifest))
    }

    pub fn from_manifest(manifest: Arc<PluginManifest>) -> Self {
        let config = ConfigSlot::new(manifest.slug_name.clone());
        Self {
            manifest,
            config,
            documents: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of indexed documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

impl Plugin for MemorySearch {
    fn info(&self) -> PluginInfo {
        self.manifest.info()
    }

    fn slug_name(&self) -> &str {
        &self.manifest.slug_name
    }

    fn config_fields(&self) -> Vec<ConfigField> {
        let config = self.config.load();
        vec![
            ConfigField::new("default_page_size", ConfigFieldType::Number, false)
                .with_value(config.default_page_size),
            ConfigField::new("max_page_size", ConfigFieldType::Number, false)
                .with_value(config.max_page_size),
        ]
    }

    fn receive_config(&self, config: &serde_json::Value) -> Result<(), AgoraError> {
        self.config.receive(config)
    }

    fn as_search(&self) -> Option<&dyn Search> {
        Some(self)
    }
}

#[async_trait]
impl Search for MemorySearch {
    async fn search_contents(&self, cond: &SearchBasicCond) -> Result<SearchPage, AgoraError> {
        let config = self.config.load();
        let words: Vec<String> = cond.words.iter().flat_map(|w| tokenize(w)).collect();
        // A query made only of punctuation matches nothing, not everything.
        if words.is_empty() && cond.words.iter().any(|w| !w.trim().is_empty()) {
            debug!(query = ?cond.words, "memory search query has no searchable terms");
            return Ok(SearchPage::default());
        }

        let documents = self.documents.read().await;
        let mut hits: Vec<Hit<'_>> = documents
            .values()
            .filter(|doc| doc.passes_filters(cond))
            .filter_map(|doc| {
                doc.relevance(&words).map(|relevance| Hit {
                    document: doc,
                    relevance,
                })
            })
            .collect();
        hits.sort_by(|a, b| compare(cond.order, a, b));

        let window = cond.page_window(hits.len(), config.default_page_size, config.max_page_size);
        let results = hits[window]
            .iter()
            .map(|hit| SearchResult {
                id: hit.document.content.object_id.clone(),
                object_type: hit.document.content.object_type,
            })
            .collect();

        debug!(
            words = ?words,
            total = hits.len(),
            page = cond.page,
            "memory search query"
        );
        Ok(SearchPage {
            results,
            total: hits.len() as u64,
        })
    }

    async fn update_content(&self, content: &SearchContent) -> Result<(), AgoraError> {
        if content.object_id.is_empty() {
            return Err(AgoraError::Validation(
                "search content requires an object_id".to_string(),
            ));
        }
        let document = IndexedDocument::new(content.clone());
        self.documents
            .write()
            .await
            .insert(content.object_id.clone(), document);
        Ok(())
    }

    async fn delete_content(&self, object_id: &str) -> Result<(), AgoraError> {
        self.documents.write().await.remove(object_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::CapabilityKind;
    use agora_core::types::{SearchObjectType, SearchOrder};

    fn question(id: usize, title: &str) -> SearchContent {
        SearchContent {
            object_id: format!("q{id:03}"),
            object_type: SearchObjectType::Question,
            title: title.to_string(),
            content: format!("body of question {id}"),
            tags: vec!["rust".to_string()],
            question_id: format!("q{id:03}"),
            user_id: format!("u{}", id % 3),
            views: 0,
            score: id as i64,
            has_accepted: id % 2 == 0,
            created_at: 1_700_000_000 + id as i64,
            active_at: 1_700_000_000 - id as i64,
        }
    }

    async fn seeded(n: usize) -> MemorySearch {
        let search = MemorySearch::new().unwrap();
        for id in 0..n {
            search
                .update_content(&question(id, "How do lifetimes work"))
                .await
                .unwrap();
        }
        search
    }

    fn page(page: usize, page_size: usize) -> SearchBasicCond {
        SearchBasicCond {
            words: vec!["lifetimes".to_string()],
            page,
            page_size,
            ..Default::default()
        }
    }

    #[test]
    fn declares_search_capability() {
        let search = MemorySearch::new().unwrap();
        assert_eq!(search.capabilities(), vec![CapabilityKind::Search]);
    }

    #[tokio::test]
    async fn punctuation_only_query_matches_nothing() {
        let search = seeded(5).await;
        let cond = SearchBasicCond {
            words: vec!["???".to_string(), "--".to_string()],
            ..Default::default()
        };
        let result = search.search_contents(&cond).await.unwrap();
        assert_eq!(result, SearchPage::default());

        let unfiltered = search
            .search_contents(&SearchBasicCond::default())
            .await
            .unwrap();
        assert_eq!(unfiltered.total, 5);
    }

    #[tokio::test]
    async fn paginates_25_matches_as_10_10_5_0() {
        let search = seeded(25).await;
        let mut sizes = Vec::new();
        let mut seen = Vec::new();
        for p in 1..=4 {
            let result = search.search_contents(&page(p, 10)).await.unwrap();
            assert_eq!(result.total, 25);
            sizes.push(result.results.len());
            seen.extend(result.results.into_iter().map(|r| r.id));
        }
        assert_eq!(sizes, vec![10, 10, 5, 0]);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 25, "pages must not overlap");
    }

    #[tokio::test]
    async fn zero_page_size_uses_configured_default() {
        let search = seeded(30).await;
        search
            .receive_config(&serde_json::json!({"default_page_size": 7}))
            .unwrap();
        let result = search.search_contents(&page(0, 0)).await.unwrap();
        assert_eq!(result.results.len(), 7);
        assert_eq!(result.total, 30);
    }

    #[tokio::test]
    async fn page_size_is_capped() {
        let search = seeded(150).await;
        let result = search.search_contents(&page(1, 1000)).await.unwrap();
        assert_eq!(result.results.len(), 100);
        assert_eq!(result.total, 150);
    }

    #[tokio::test]
    async fn update_is_idempotent_upsert() {
        let search = MemorySearch::new().unwrap();
        let doc = question(1, "Original title");
        search.update_content(&doc).await.unwrap();
        search.update_content(&doc).await.unwrap();
        assert_eq!(search.len().await, 1);

        let renamed = SearchContent {
            title: "Renamed title".to_string(),
            ..doc
        };
        search.update_content(&renamed).await.unwrap();
        let cond = SearchBasicCond {
            words: vec!["original".to_string()],
            ..Default::default()
        };
        assert_eq!(search.search_contents(&cond).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_visible_immediately() {
        let search = seeded(3).await;
        search.delete_content("q001").await.unwrap();
        search.delete_content("q001").await.unwrap();
        search.delete_content("never-existed").await.unwrap();

        let result = search.search_contents(&page(1, 10)).await.unwrap();
        assert_eq!(result.total, 2);
        assert!(result.results.iter().all(|r| r.id != "q001"));
    }

    #[tokio::test]
    async fn words_match_case_insensitively_and_all_must_match() {
        let search = MemorySearch::new().unwrap();
        search
            .update_content(&question(1, "Async Rust with Tokio"))
            .await
            .unwrap();
        search
            .update_content(&question(2, "Async Python"))
            .await
            .unwrap();

        let cond = SearchBasicCond {
            words: vec!["ASYNC tokio".to_string()],
            ..Default::default()
        };
        let result = search.search_contents(&cond).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.results[0].id, "q001");
    }

    #[tokio::test]
    async fn filters_and_orders() {
        let search = seeded(6).await;
        let mut answer = question(100, "Lifetimes answer");
        answer.object_type = SearchObjectType::Answer;
        answer.question_id = "q001".to_string();
        search.update_content(&answer).await.unwrap();

        let answers = search.search_answers(&page(1, 10)).await.unwrap();
        assert_eq!(answers.total, 1);
        assert_eq!(answers.results[0].object_type, SearchObjectType::Answer);

        let questions = search.search_questions(&page(1, 10)).await.unwrap();
        assert_eq!(questions.total, 6);

        let accepted = SearchBasicCond {
            question_accepted: Some(true),
            object_type: Some(SearchObjectType::Question),
            ..page(1, 10)
        };
        assert_eq!(search.search_contents(&accepted).await.unwrap().total, 3);

        let newest = SearchBasicCond {
            order: SearchOrder::Newest,
            object_type: Some(SearchObjectType::Question),
            ..page(1, 2)
        };
        let ids: Vec<String> = search
            .search_contents(&newest)
            .await
            .unwrap()
            .results
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["q005", "q004"]);

        let active = SearchBasicCond {
            order: SearchOrder::Active,
            object_type: Some(SearchObjectType::Question),
            ..page(1, 1)
        };
        let top = search.search_contents(&active).await.unwrap();
        assert_eq!(top.results[0].id, "q000");
    }

    #[tokio::test]
    async fn rejects_inconsistent_page_config() {
        let search = MemorySearch::new().unwrap();
        let err = search
            .receive_config(&serde_json::json!({"default_page_size": 50, "max_page_size": 10}))
            .unwrap_err();
        assert!(matches!(err, AgoraError::Config(_)));
    }

    #[tokio::test]
    async fn rejects_document_without_id() {
        let search = MemorySearch::new().unwrap();
        let mut doc = question(1, "x");
        doc.object_id.clear();
        assert!(matches!(
            search.update_content(&doc).await,
            Err(AgoraError::Validation(_))
        ));
    }
}
