// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document matching and ranking.

use std::cmp::Ordering;
use std::collections::HashMap;

use agora_core::types::{SearchBasicCond, SearchContent, SearchOrder};

/// Splits text into lowercase alphanumeric tokens.
pub(crate) fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// A stored document with its token counts.
#[derive(Debug, Clone)]
pub(crate) struct IndexedDocument {
    pub(crate) content: SearchContent,
    title_terms: HashMap<String, u32>,
    body_terms: HashMap<String, u32>,
}

impl IndexedDocument {
    pub(crate) fn new(content: SearchContent) -> Self {
        let title_terms = count_terms(&content.title);
        let body_terms = count_terms(&content.content);
        Self {
            content,
            title_terms,
            body_terms,
        }
    }

    /// Relevance of this document for `words`, or `None` if any word is absent.
    ///
    /// Title hits weigh twice as much as body hits.
    pub(crate) fn relevance(&self, words: &[String]) -> Option<u32> {
        words.iter().try_fold(0u32, |score, word| {
            let title = self.title_terms.get(word).copied().unwrap_or(0);
            let body = self.body_terms.get(word).copied().unwrap_or(0);
            (title + body > 0).then(|| score.saturating_add(title * 2 + body))
        })
    }

    /// Whether the non-text filters of `cond` accept this document.
    pub(crate) fn passes_filters(&self, cond: &SearchBasicCond) -> bool {
        let doc = &self.content;
        cond.object_type.is_none_or(|t| t == doc.object_type)
            && cond.user_id.as_ref().is_none_or(|u| *u == doc.user_id)
            && cond.question_id.as_ref().is_none_or(|q| *q == doc.question_id)
            && cond.question_accepted.is_none_or(|a| a == doc.has_accepted)
            && cond.tag_ids.iter().all(|tag| doc.tags.contains(tag))
    }
}

fn count_terms(text: &str) -> HashMap<String, u32> {
    let mut terms = HashMap::new();
    for token in tokenize(text) {
        *terms.entry(token).or_insert(0) += 1;
    }
    terms
}

/// A matching document paired with its relevance.
pub(crate) struct Hit<'a> {
    pub(crate) document: &'a IndexedDocument,
    pub(crate) relevance: u32,
}

/// Total order for hits; ties fall back to `object_id` so pages are stable.
pub(crate) fn compare(order: SearchOrder, a: &Hit<'_>, b: &Hit<'_>) -> Ordering {
    let (x, y) = (&a.document.content, &b.document.content);
    let primary = match order {
        SearchOrder::Relevance => b.relevance.cmp(&a.relevance),
        SearchOrder::Newest => y.created_at.cmp(&x.created_at),
        SearchOrder::Active => y.active_at.cmp(&x.active_at),
        SearchOrder::Score => y.score.cmp(&x.score),
    };
    primary.then_with(|| x.object_id.cmp(&y.object_id))
}
