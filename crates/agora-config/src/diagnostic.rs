// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with fuzzy match suggestions.
//!
//! Converts Figment deserialization errors into miette diagnostics with source
//! spans, valid key listings, and "did you mean?" suggestions using
//! Jaro-Winkler string similarity.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(agora::config::unknown_key),
        help("{}", format_suggestion_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A `[plugins.<slug>]` section names a plugin the host does not ship.
    #[error("unknown plugin `{slug}`")]
    #[diagnostic(
        code(agora::config::unknown_plugin),
        help("{}", format_suggestion_help(suggestion.as_deref(), known))
    )]
    UnknownPlugin {
        slug: String,
        suggestion: Option<String>,
        known: String,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(agora::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(agora::config::missing_key),
        help("add `{key} = <value>` to your agora.toml")
    )]
    MissingKey { key: String },

    /// A validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(agora::config::validation))]
    Validation { message: String },

    /// A plugin rejected its `config` table.
    #[error("plugin `{slug}` rejected its configuration: {message}")]
    #[diagnostic(
        code(agora::config::plugin),
        help("check the [plugins.{slug}.config] table")
    )]
    Plugin { slug: String, message: String },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(agora::config::other))]
    Other(String),
}

fn format_suggestion_help(suggestion: Option<&str>, valid: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid values: {valid}"),
        None => format!("valid values: {valid}"),
    }
}

/// Convert a `figment::Error` into a list of `ConfigError` diagnostics.
///
/// `toml_sources` holds `(path, content)` pairs for every TOML layer, used to
/// point the report at the offending line.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    let sources = Sources(toml_sources);
    err.into_iter().map(|e| sources.convert(&e)).collect()
}

struct Sources<'a>(&'a [(String, String)]);

impl Sources<'_> {
    fn convert(&self, error: &figment::Error) -> ConfigError {
        use figment::error::Kind;

        match &error.kind {
            Kind::UnknownField(field, expected) => {
                let (span, src) = self.locate(error, &error.path, field);
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, expected),
                    valid_keys: expected.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: dotted(&error.path, field),
            },
            Kind::InvalidType(actual, expected) => {
                let (span, src) = match error.path.split_last() {
                    Some((key, table)) => self.locate(error, table, key),
                    None => (None, None),
                };
                ConfigError::InvalidType {
                    key: error.path.join("."),
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                    span,
                    src,
                }
            }
            _ => ConfigError::Other(error.to_string()),
        }
    }

    /// The TOML layer an error came from. Inline strings carry no path, so a
    /// lone source is assumed to be the one.
    fn origin(&self, error: &figment::Error) -> Option<&(String, String)> {
        let file = error
            .metadata
            .as_ref()
            .and_then(|m| m.source.as_ref())
            .and_then(|s| match s {
                figment::Source::File(path) => Some(path.display().to_string()),
                _ => None,
            });
        match (file, self.0) {
            (Some(file), all) => all.iter().find(|(path, _)| *path == file),
            (None, [only]) => Some(only),
            (None, _) => None,
        }
    }

    fn locate(
        &self,
        error: &figment::Error,
        table: &[String],
        key: &str,
    ) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
        self.origin(error)
            .and_then(|(path, content)| {
                let offset = find_key_offset(content, table, key)?;
                Some((
                    Some(SourceSpan::new(offset.into(), key.len())),
                    Some(NamedSource::new(path, content.clone())),
                ))
            })
            .unwrap_or((None, None))
    }
}

fn dotted(table: &[String], key: &str) -> String {
    table
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(key))
        .collect::<Vec<_>>()
        .join(".")
}

/// Byte offset of `field` inside the `[table]` named by `path`.
///
/// An empty `path` means the root table, which ends at the first header.
/// The search never crosses into a following table.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let header = (!path.is_empty()).then(|| format!("[{}]", path.join(".")));
    let mut inside = header.is_none();
    let mut line_start = 0;

    for line in content.split_inclusive('\n') {
        let start = line_start;
        line_start += line.len();

        let body = line.trim();
        if body.starts_with('[') {
            match &header {
                Some(h) => inside = body == h,
                None => return None,
            }
            continue;
        }
        if !inside {
            continue;
        }

        let indent = line.len() - line.trim_start().len();
        if let Some(rest) = line[indent..].strip_prefix(field)
            && rest.trim_start().starts_with('=')
        {
            return Some(start + indent);
        }
    }

    None
}

/// Suggest a similar name using Jaro-Winkler string similarity.
pub fn suggest_key<S: AsRef<str>>(unknown: &str, valid_keys: &[S]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key.as_ref()), key.as_ref()))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render `errors` as one report string.
pub fn render_report(handler: &miette::GraphicalReportHandler, errors: &[ConfigError]) -> String {
    let mut out = String::new();
    for error in errors {
        let before = out.len();
        if handler.render_report(&mut out, error as &dyn Diagnostic).is_err() {
            out.truncate(before);
            out.push_str(&format!("Error: {error}\n"));
        }
    }
    out
}

/// Print `errors` to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    eprint!("{}", render_report(&miette::GraphicalReportHandler::new(), errors));
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Format;

    #[test]
    fn suggest_enabled_for_typo() {
        let valid = &["enabled", "config"];
        assert_eq!(suggest_key("enabeld", valid), Some("enabled".to_string()));
    }

    #[test]
    fn suggest_plugin_slug() {
        let valid = &["memory_cache", "memory_search", "local_storage"];
        assert_eq!(
            suggest_key("memory_cahce", valid),
            Some("memory_cache".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["log_level", "default_lang"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn find_key_offset_in_dotted_table() {
        let content = "[host]\nlog_level = \"info\"\n\n[plugins.memory_cache]\nenabeld = true\n";
        let path = vec!["plugins".to_string(), "memory_cache".to_string()];
        let offset = find_key_offset(content, &path, "enabeld").unwrap();
        assert_eq!(&content[offset..offset + 7], "enabeld");
    }

    #[test]
    fn find_key_offset_handles_crlf() {
        let content = "[host]\r\nlog_levl = \"info\"\r\n";
        let path = vec!["host".to_string()];
        let offset = find_key_offset(content, &path, "log_levl").unwrap();
        assert_eq!(&content[offset..offset + 8], "log_levl");
    }

    #[test]
    fn find_key_offset_stays_inside_its_table() {
        let content = "[host]\nlog_level = \"info\"\n\n[plugins.memory_cache]\nenabled = true\n";
        let host = vec!["host".to_string()];
        assert_eq!(find_key_offset(content, &host, "enabled"), None);
        assert_eq!(find_key_offset(content, &[], "log_level"), None);
    }

    #[test]
    fn invalid_type_points_at_the_value_key() {
        let content = "[host]\nlog_level = 3\n".to_string();
        let err = figment::Figment::new()
            .merge(figment::providers::Toml::string(&content))
            .extract::<crate::AgoraConfig>()
            .unwrap_err();
        let errors = figment_to_config_errors(err, &[("agora.toml".to_string(), content)]);
        match &errors[0] {
            ConfigError::InvalidType { key, span, .. } => {
                assert_eq!(key, "host.log_level");
                assert_eq!(span.map(|s| s.offset()), Some(7));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn report_names_every_error() {
        let errors = [
            ConfigError::Validation {
                message: "bad level".into(),
            },
            ConfigError::Plugin {
                slug: "keyword_reviewer".into(),
                message: "empty word".into(),
            },
        ];
        let handler = miette::GraphicalReportHandler::new_themed(miette::GraphicalTheme::none());
        let report = render_report(&handler, &errors);
        assert!(report.contains("bad level"));
        assert!(report.contains("keyword_reviewer"));
    }

    #[test]
    fn unknown_plugin_help_lists_suggestion() {
        let err = ConfigError::UnknownPlugin {
            slug: "memory_cahce".into(),
            suggestion: Some("memory_cache".into()),
            known: "memory_cache, local_storage".into(),
        };
        let help = err.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("did you mean `memory_cache`"));
    }
}
