// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry, manifest parser, and message catalog.
//!
//! Plugins are constructed from a manifest describing their metadata, then
//! registered into a [`RegistryBuilder`] during initialization. The builder is
//! frozen into a [`PluginRegistry`] that the host shares by reference and
//! queries by capability kind.

pub mod i18n;
pub mod manifest;
pub mod registry;

pub use i18n::MessageCatalog;
pub use manifest::{PluginManifest, is_valid_slug, parse_plugin_manifest};
pub use registry::{LoginFlow, PluginEntry, PluginRegistry, PluginStatus, RegistryBuilder};
