// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability trait definitions for the Agora plugin architecture.
//!
//! Every capability extends the [`Plugin`] base trait and uses
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod cache;
pub mod connector;
pub mod notification;
pub mod plugin;
pub mod reviewer;
pub mod search;
pub mod storage;
pub mod user_center;

pub use cache::Cache;
pub use connector::Connector;
pub use notification::Notification;
pub use plugin::Plugin;
pub use reviewer::Reviewer;
pub use search::Search;
pub use storage::Storage;
pub use user_center::UserCenter;
