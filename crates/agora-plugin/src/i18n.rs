// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TOML-backed message catalog implementing [`Localizer`].
//!
//! The catalog format is one table per language with flat message keys:
//!
//! ```toml
//! [en_US]
//! "plugin.memory_cache.backend.info.name" = "Memory Cache"
//!
//! [zh_CN]
//! "plugin.memory_cache.backend.info.name" = "内存缓存"
//! ```

use std::collections::HashMap;

use agora_core::{AgoraError, Localizer};

/// Translations keyed by language, then message key.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    languages: HashMap<String, HashMap<String, String>>,
    fallback_lang: Option<String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a catalog from TOML content.
    pub fn from_toml(toml_content: &str) -> Result<Self, AgoraError> {
        let languages: HashMap<String, HashMap<String, String>> = toml::from_str(toml_content)
            .map_err(|e| AgoraError::Config(format!("invalid message catalog: {e}")))?;
        Ok(Self {
            languages,
            fallback_lang: None,
        })
    }

    /// Language consulted when a key is missing for the requested language.
    pub fn with_fallback_lang(mut self, lang: impl Into<String>) -> Self {
        self.fallback_lang = Some(lang.into());
        self
    }

    /// Adds or replaces one translation.
    pub fn insert(&mut self, lang: &str, key: &str, text: &str) {
        self.languages
            .entry(lang.to_string())
            .or_default()
            .insert(key.to_string(), text.to_string());
    }

    /// Merges another catalog into this one; entries in `other` win.
    pub fn merge(&mut self, other: MessageCatalog) {
        for (lang, entries) in other.languages {
            self.languages.entry(lang).or_default().extend(entries);
        }
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&String> {
        self.languages.get(lang).and_then(|entries| entries.get(key))
    }
}

impl Localizer for MessageCatalog {
    fn translate(&self, lang: &str, key: &str) -> Option<String> {
        self.lookup(lang, key)
            .or_else(|| {
                self.fallback_lang
                    .as_deref()
                    .and_then(|fallback| self.lookup(fallback, key))
            })
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::Translator;

    const CATALOG: &str = r#"
[en_US]
"plugin.memory_cache.backend.info.name" = "Memory Cache"
"plugin.memory_cache.backend.info.description" = "Keeps cache entries in process memory"

[zh_CN]
"plugin.memory_cache.backend.info.name" = "内存缓存"
"#;

    #[test]
    fn translates_per_language() {
        let catalog = MessageCatalog::from_toml(CATALOG).unwrap();
        assert_eq!(
            catalog.translate("zh_CN", "plugin.memory_cache.backend.info.name"),
            Some("内存缓存".to_string())
        );
        assert_eq!(
            catalog.translate("en_US", "plugin.memory_cache.backend.info.name"),
            Some("Memory Cache".to_string())
        );
    }

    #[test]
    fn falls_back_to_configured_language() {
        let catalog = MessageCatalog::from_toml(CATALOG)
            .unwrap()
            .with_fallback_lang("en_US");
        assert_eq!(
            catalog.translate("zh_CN", "plugin.memory_cache.backend.info.description"),
            Some("Keeps cache entries in process memory".to_string())
        );
        assert_eq!(catalog.translate("fr_FR", "missing.key"), None);
    }

    #[test]
    fn translator_falls_back_to_literal_text() {
        let catalog = MessageCatalog::from_toml(CATALOG).unwrap();
        let t = Translator::new("plugin.unknown.backend.info.name", "Unknown");
        assert_eq!(t.translate(&catalog, "zh_CN"), "Unknown");
    }

    #[test]
    fn merge_overrides_entries() {
        let mut catalog = MessageCatalog::from_toml(CATALOG).unwrap();
        let mut other = MessageCatalog::new();
        other.insert("en_US", "plugin.memory_cache.backend.info.name", "In-Memory Cache");
        catalog.merge(other);
        assert_eq!(
            catalog.translate("en_US", "plugin.memory_cache.backend.info.name"),
            Some("In-Memory Cache".to_string())
        );
    }

    #[test]
    fn rejects_malformed_catalog() {
        assert!(MessageCatalog::from_toml("en_US = 3").is_err());
    }
}
