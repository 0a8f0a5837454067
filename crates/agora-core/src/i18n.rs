// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Localization seam: message-key handles and the translator collaborator.

use serde::{Deserialize, Serialize};

/// Supplies translated display strings for message keys.
///
/// Implemented by the host. Returning `None` makes callers fall back to the
/// untranslated text carried by the [`Translator`].
pub trait Localizer: Send + Sync {
    /// Looks up `key` for the given language tag (e.g. `en_US`).
    fn translate(&self, lang: &str, key: &str) -> Option<String>;
}

/// A deferred translation: a message key plus the text shown when no translation exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translator {
    pub key: String,
    pub fallback: String,
}

impl Translator {
    pub fn new(key: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fallback: fallback.into(),
        }
    }

    /// Resolves the text for `lang`, falling back to the literal text.
    pub fn translate(&self, localizer: &dyn Localizer, lang: &str) -> String {
        localizer
            .translate(lang, &self.key)
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// A [`Localizer`] that knows no translations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocalizer;

impl Localizer for NoLocalizer {
    fn translate(&self, _lang: &str, _key: &str) -> Option<String> {
        None
    }
}
