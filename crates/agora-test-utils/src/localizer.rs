// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory localizer for tests.

use std::collections::HashMap;

use agora_core::Localizer;

/// Localizer backed by a `(lang, key) -> text` map.
#[derive(Debug, Default, Clone)]
pub struct MapLocalizer {
    entries: HashMap<(String, String), String>,
}

impl MapLocalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, lang: &str, key: &str, text: &str) -> Self {
        self.entries
            .insert((lang.to_string(), key.to_string()), text.to_string());
        self
    }
}

impl Localizer for MapLocalizer {
    fn translate(&self, lang: &str, key: &str) -> Option<String> {
        self.entries
            .get(&(lang.to_string(), key.to_string()))
            .cloned()
    }
}
