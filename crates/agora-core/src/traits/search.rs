// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search capability: full-text index over questions and answers.

use async_trait::async_trait;

use crate::error::AgoraError;
use crate::traits::plugin::Plugin;
use crate::types::{SearchBasicCond, SearchContent, SearchObjectType, SearchPage};

/// Search index provider.
///
/// Pages are 1-indexed, a page never holds more than the effective page
/// size, and `total` counts all matches regardless of pagination. Once
/// `delete_content` returns, the document no longer appears in results.
#[async_trait]
pub trait Search: Plugin {
    async fn search_contents(&self, cond: &SearchBasicCond) -> Result<SearchPage, AgoraError>;

    async fn search_questions(&self, cond: &SearchBasicCond) -> Result<SearchPage, AgoraError> {
        let cond = SearchBasicCond {
            object_type: Some(SearchObjectType::Question),
            ..cond.clone()
        };
        self.search_contents(&cond).await
    }

    async fn search_answers(&self, cond: &SearchBasicCond) -> Result<SearchPage, AgoraError> {
        let cond = SearchBasicCond {
            object_type: Some(SearchObjectType::Answer),
            ..cond.clone()
        };
        self.search_contents(&cond).await
    }

    /// Inserts or replaces the document with `content.object_id`.
    async fn update_content(&self, content: &SearchContent) -> Result<(), AgoraError>;

    /// Removes a document. Removing a missing document succeeds.
    async fn delete_content(&self, object_id: &str) -> Result<(), AgoraError>;
}
