// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared in-memory key space with lazy expiry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;

use agora_core::AgoraError;

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: (!ttl.is_zero()).then(|| Instant::now() + ttl),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Key space that several cache instances may share.
///
/// Keys are stored fully qualified; namespacing is the caller's job.
/// Read-modify-write operations hold the key's shard lock for their whole
/// duration.
///
/// Each namespace is claimed by at most one live instance at a time.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: DashMap<String, StoredValue>,
    claims: DashMap<String, u64>,
    next_owner: AtomicU64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Some(entry.value.clone());
            }
        } else {
            return None;
        }
        // Expired: drop it unless a writer replaced it in between.
        self.entries.remove_if(key, |_, v| v.is_expired(now));
        None
    }

    pub(crate) fn set(&self, key: String, value: String, ttl: Duration) {
        self.entries.insert(key, StoredValue::new(value, ttl));
    }

    /// Adds `delta` to the integer at `key`, treating a missing or expired key
    /// as 0. Keeps the key's expiry. A non-integer value is left untouched.
    pub(crate) fn add(&self, key: String, delta: i64) -> Result<i64, AgoraError> {
        let now = Instant::now();
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(StoredValue::new(delta.to_string(), Duration::ZERO));
                    return Ok(delta);
                }
                let current: i64 = occupied.get().value.parse().map_err(|_| {
                    AgoraError::Validation(format!(
                        "value at `{}` is not an integer",
                        occupied.key()
                    ))
                })?;
                let next = current.checked_add(delta).ok_or_else(|| {
                    AgoraError::Validation(format!("integer overflow at `{}`", occupied.key()))
                })?;
                occupied.get_mut().value = next.to_string();
                Ok(next)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(StoredValue::new(delta.to_string(), Duration::ZERO));
                Ok(delta)
            }
        }
    }

    pub(crate) fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Removes every key starting with `prefix`. Returns how many were removed.
    pub(crate) fn remove_prefix(&self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| !k.starts_with(prefix));
        before.saturating_sub(self.entries.len())
    }

    /// Drops all expired entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, v| !v.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// A fresh owner id for a new instance.
    pub(crate) fn new_owner(&self) -> u64 {
        self.next_owner.fetch_add(1, Ordering::Relaxed)
    }

    /// Claims `namespace` for `owner`. Succeeds if it is free or already
    /// held by `owner`.
    pub(crate) fn claim(&self, namespace: &str, owner: u64) -> bool {
        match self.claims.entry(namespace.to_string()) {
            Entry::Occupied(held) => *held.get() == owner,
            Entry::Vacant(free) => {
                free.insert(owner);
                true
            }
        }
    }

    pub(crate) fn release(&self, namespace: &str, owner: u64) {
        self.claims.remove_if(namespace, |_, held| *held == owner);
    }

    pub(crate) fn release_all(&self, owner: u64) {
        self.claims.retain(|_, held| *held != owner);
    }

    /// Whether a live instance holds `namespace`.
    pub fn is_claimed(&self, namespace: &str) -> bool {
        self.claims.contains_key(namespace)
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
