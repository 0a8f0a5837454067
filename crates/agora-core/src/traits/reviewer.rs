// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reviewer capability: content moderation.

use async_trait::async_trait;

use crate::traits::plugin::Plugin;
use crate::types::{ReviewContent, ReviewResult};

/// Decides whether submitted content is published.
///
/// Always returns a verdict. Identical content under identical configuration
/// yields the same verdict. Internal failures yield
/// [`ReviewStatus::NeedReview`](crate::types::ReviewStatus::NeedReview).
#[async_trait]
pub trait Reviewer: Plugin {
    async fn review(&self, content: &ReviewContent) -> ReviewResult;
}
