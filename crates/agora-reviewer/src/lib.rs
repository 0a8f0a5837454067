// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule-based content reviewer plugin for the Agora framework.
//!
//! Rules are checked in a fixed order and the first hit decides the verdict:
//!
//! 1. a blocked word → `DeleteDirectly`
//! 2. a review word → `NeedReview`
//! 3. content longer than `max_content_length` → `NeedReview`
//! 4. more links than `max_links` → `NeedReview`
//!
//! Word matching is case-insensitive over the title, content and tags.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use agora_core::types::{ConfigField, ConfigFieldType, ReviewContent, ReviewResult, ReviewStatus};
use agora_core::{AgoraError, ConfigSlot, Plugin, PluginConfig, PluginInfo, Reviewer};
use agora_plugin::{PluginManifest, parse_plugin_manifest};

const MANIFEST: &str = include_str!("../plugin.toml");

static LINK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<>()]+").ok());

/// Configuration of a [`KeywordReviewer`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordReviewerConfig {
    #[serde(default)]
    pub blocked_words: Vec<String>,
    #[serde(default)]
    pub review_words: Vec<String>,
    /// Maximum content length in characters; 0 disables the rule.
    #[serde(default)]
    pub max_content_length: usize,
    /// Maximum number of links; absent disables the rule.
    #[serde(default)]
    pub max_links: Option<usize>,
}

impl PluginConfig for KeywordReviewerConfig {
    fn validate(&self) -> Result<(), AgoraError> {
        let blank = self
            .blocked_words
            .iter()
            .chain(&self.review_words)
            .any(|w| w.trim().is_empty());
        if blank {
            return Err(AgoraError::Config(
                "keyword_reviewer: word lists must not contain blank entries".to_string(),
            ));
        }
        Ok(())
    }

    fn is_configured(&self) -> bool {
        !self.blocked_words.is_empty()
            || !self.review_words.is_empty()
            || self.max_content_length > 0
            || self.max_links.is_some()
    }
}

/// Reviewer plugin applying keyword and size rules.
pub struct KeywordReviewer {
    manifest: Arc<PluginManifest>,
    config: ConfigSlot<KeywordReviewerConfig>,
}

impl KeywordReviewer {
    pub fn new() -> Result<Self, AgoraError> {
        let manifest = Arc::new(parse_plugin_manifest(MANIFEST)?);
        Ok(Self::from_manifest(manifest))
    }

    pub fn from_manifest(manifest: Arc<PluginManifest>) -> Self {
        let config = ConfigSlot::new(manifest.slug_name.clone());
        Self { manifest, config }
    }
}

fn first_match<'a>(haystack: &str, words: &'a [String]) -> Option<&'a str> {
    words
        .iter()
        .find(|w| haystack.contains(&w.trim().to_lowercase()))
        .map(String::as_str)
}

fn count_links(content: &ReviewContent) -> Option<usize> {
    let link = LINK.as_ref()?;
    Some(link.find_iter(&content.title).count() + link.find_iter(&content.content).count())
}

/// Applies the rules in order; `None` means every rule passed.
fn evaluate(
    config: &KeywordReviewerConfig,
    content: &ReviewContent,
) -> Result<Option<ReviewResult>, AgoraError> {
    let haystack = format!(
        "{}\n{}\n{}",
        content.title,
        content.content,
        content.tags.join(" ")
    )
    .to_lowercase();

    if let Some(word) = first_match(&haystack, &config.blocked_words) {
        return Ok(Some(ReviewResult::delete_directly(format!(
            "contains blocked word `{word}`"
        ))));
    }
    if let Some(word) = first_match(&haystack, &config.review_words) {
        return Ok(Some(ReviewResult::need_review(format!(
            "contains review word `{word}`"
        ))));
    }

    let length = content.content.chars().count();
    if config.max_content_length > 0 && length > config.max_content_length {
        return Ok(Some(ReviewResult::need_review(format!(
            "content length {length} exceeds {}",
            config.max_content_length
        ))));
    }

    if let Some(max_links) = config.max_links {
        let links = count_links(content)
            .ok_or_else(|| AgoraError::Internal("link pattern failed to compile".to_string()))?;
        if links > max_links {
            return Ok(Some(ReviewResult::need_review(format!(
                "{links} links exceed the limit of {max_links}"
            ))));
        }
    }

    Ok(None)
}

impl Plugin for KeywordReviewer {
    fn info(&self) -> PluginInfo {
        self.manifest.info()
    }

    fn slug_name(&self) -> &str {
        &self.manifest.slug_name
    }

    fn config_fields(&self) -> Vec<ConfigField> {
        let config = self.config.load();
        vec![
            ConfigField::new("blocked_words", ConfigFieldType::TagList, false)
                .with_value(config.blocked_words.clone()),
            ConfigField::new("review_words", ConfigFieldType::TagList, false)
                .with_value(config.review_words.clone()),
            ConfigField::new("max_content_length", ConfigFieldType::Number, false)
                .with_value(config.max_content_length),
            ConfigField::new("max_links", ConfigFieldType::Number, false)
                .with_value(config.max_links),
        ]
    }

    fn receive_config(&self, config: &serde_json::Value) -> Result<(), AgoraError> {
        self.config.receive(config)
    }

    fn as_reviewer(&self) -> Option<&dyn Reviewer> {
        Some(self)
    }
}

#[async_trait]
impl Reviewer for KeywordReviewer {
    async fn review(&self, content: &ReviewContent) -> ReviewResult {
        let config = match self.config.ready() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "reviewer unavailable, holding content for review");
                return ReviewResult::need_review(e.to_string());
            }
        };

        let verdict = match evaluate(&config, content) {
            Ok(Some(verdict)) => verdict,
            Ok(None) => ReviewResult::approved("no rule matched"),
            Err(e) => {
                warn!(error = %e, "review failed, holding content for review");
                ReviewResult::need_review(e.to_string())
            }
        };
        if verdict.review_status != ReviewStatus::Approved {
            debug!(
                status = %verdict.review_status,
                reason = %verdict.reason,
                author = %content.author,
                "content flagged"
            );
        }
        verdict
    }
}
