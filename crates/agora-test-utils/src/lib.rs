// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Agora registry and integration tests.
//!
//! # Components
//!
//! - [`StubPlugin`] - a plugin that can declare any subset of capabilities
//! - [`MapLocalizer`] - an in-memory [`Localizer`](agora_core::Localizer)

pub mod localizer;
pub mod stub_plugin;

pub use localizer::MapLocalizer;
pub use stub_plugin::StubPlugin;
