// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache capability: key/value storage with TTL and atomic counters.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AgoraError;
use crate::traits::plugin::Plugin;

/// Key/value cache scoped to one plugin instance.
///
/// A `ttl` of [`Duration::ZERO`] means the entry never expires. A missing or
/// expired key reads as `None`.
#[async_trait]
pub trait Cache: Plugin {
    async fn get_string(&self, key: &str) -> Result<Option<String>, AgoraError>;

    async fn set_string(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AgoraError>;

    async fn get_int64(&self, key: &str) -> Result<Option<i64>, AgoraError>;

    async fn set_int64(&self, key: &str, value: i64, ttl: Duration) -> Result<(), AgoraError>;

    /// Atomically adds `delta` and returns the new value. A missing key counts as 0.
    async fn increase(&self, key: &str, delta: i64) -> Result<i64, AgoraError>;

    /// Atomically subtracts `delta` and returns the new value. A missing key counts as 0.
    async fn decrease(&self, key: &str, delta: i64) -> Result<i64, AgoraError>;

    /// Removes a key. Removing a missing key succeeds.
    async fn del(&self, key: &str) -> Result<(), AgoraError>;

    /// Removes every key owned by this instance, and only those.
    async fn flush(&self) -> Result<(), AgoraError>;
}
