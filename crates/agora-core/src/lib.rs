// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Agora plugin framework.
//!
//! This crate defines the seven capability contracts plugins implement
//! (cache, connector, notification, reviewer, search, storage, user center),
//! the [`Plugin`] base trait used for registration and capability detection,
//! configuration binding, and the shared error and value types.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod i18n;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use config::{ConfigSlot, PluginConfig, keep_secret};
pub use error::AgoraError;
pub use i18n::{Localizer, NoLocalizer, Translator};
pub use types::{CapabilityKind, PluginInfo};

// Re-export all capability traits at crate root.
pub use traits::{Cache, Connector, Notification, Plugin, Reviewer, Search, Storage, UserCenter};
