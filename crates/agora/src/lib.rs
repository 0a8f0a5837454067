// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host-side assembly for the Agora plugin framework: the reference plugin
//! set, the `agora` command implementations and the plugin crate generator.

pub mod builtin;
pub mod commands;
pub mod scaffold;

pub use builtin::{build_registry, builtin_catalog, builtin_plugins};
