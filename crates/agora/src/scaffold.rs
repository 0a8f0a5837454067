// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin crate generator for `agora plugin init`.
//!
//! Writes a new crate implementing one capability:
//! ```text
//! {dir}/agora-{name}/
//! +-- Cargo.toml     # workspace-inherited package and dependencies
//! +-- plugin.toml    # manifest read by `Plugin::info`
//! +-- src/
//!     +-- lib.rs     # plugin struct, ConfigSlot config, capability impl
//! ```
//!
//! Templates use `{{placeholder}}` markers filled from [`PluginNames`].

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use agora_core::CapabilityKind;
use agora_plugin::is_valid_slug;

/// Errors raised while generating a plugin crate.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error(
        "invalid plugin name `{0}`: start with a letter or underscore, then use letters, digits, `_` or `-`"
    )]
    InvalidName(String),

    #[error("directory `{}` already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("failed to write `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Names derived from the user-supplied plugin name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginNames {
    /// `snake_case` slug, e.g. `redis_cache`.
    pub slug: String,
    /// Cargo package name, e.g. `agora-redis-cache`.
    pub crate_name: String,
    /// Rust type of the plugin, e.g. `RedisCache`.
    pub type_name: String,
    /// Human readable name for the manifest, e.g. `Redis Cache`.
    pub display_name: String,
}

impl PluginNames {
    /// Derives every name from `name` (`camelCase`, `kebab-case` and
    /// `snake_case` input are all accepted).
    pub fn derive(name: &str, kind: CapabilityKind) -> Result<Self, ScaffoldError> {
        if !is_valid_slug(name) {
            return Err(ScaffoldError::InvalidName(name.to_string()));
        }
        let slug = snake_case(name);
        let words: Vec<&str> = slug.split('_').filter(|w| !w.is_empty()).collect();
        if words.is_empty() {
            return Err(ScaffoldError::InvalidName(name.to_string()));
        }

        let pascal: String = words.iter().map(|w| capitalize(w)).collect();
        let kind_name = kind.to_string();
        let type_name = if pascal == kind_name {
            format!("{pascal}Plugin")
        } else if pascal.ends_with(&kind_name) {
            pascal
        } else {
            format!("{pascal}{kind_name}")
        };

        Ok(Self {
            crate_name: format!("agora-{}", words.join("-")),
            display_name: words
                .iter()
                .map(|w| capitalize(w))
                .collect::<Vec<_>>()
                .join(" "),
            slug,
            type_name,
        })
    }
}

/// Parses a capability name as typed on the command line.
///
/// Case, `-` and `_` are ignored, so `user-center`, `user_center` and
/// `UserCenter` all name the same kind.
pub fn parse_capability(input: &str) -> Result<CapabilityKind, String> {
    let wanted: String = input
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();
    CapabilityKind::ALL
        .into_iter()
        .find(|kind| kind.to_string().to_ascii_lowercase() == wanted)
        .ok_or_else(|| {
            let known: Vec<String> = CapabilityKind::ALL
                .iter()
                .map(|k| snake_case(&k.to_string()))
                .collect();
            format!("unknown capability `{input}` (expected one of: {})", known.join(", "))
        })
}

/// Generates a plugin crate for `kind` under `target_dir`.
///
/// Returns the directory of the new crate. Nothing is written if the
/// name is invalid or the directory already exists.
pub fn scaffold_plugin(
    kind: CapabilityKind,
    name: &str,
    target_dir: &Path,
) -> Result<PathBuf, ScaffoldError> {
    let names = PluginNames::derive(name, kind)?;
    let crate_dir = target_dir.join(&names.crate_name);
    if crate_dir.exists() {
        return Err(ScaffoldError::AlreadyExists(crate_dir));
    }

    let src_dir = crate_dir.join("src");
    std::fs::create_dir_all(&src_dir).map_err(|source| ScaffoldError::Io {
        path: src_dir.clone(),
        source,
    })?;

    let capability = Capability::of(kind);
    let vars = [
        ("crate_name", names.crate_name.as_str()),
        ("slug", names.slug.as_str()),
        ("type_name", names.type_name.as_str()),
        ("display_name", names.display_name.as_str()),
        ("kind", capability.kind_label),
        ("trait_name", capability.trait_name),
        ("accessor", capability.accessor),
        ("type_imports", capability.type_imports),
        ("std_imports", capability.std_imports),
        ("helpers", capability.helpers),
        ("body", capability.body),
    ];

    write_file(&crate_dir.join("Cargo.toml"), &render(CARGO_TOML, &vars))?;
    write_file(&crate_dir.join("plugin.toml"), &render(PLUGIN_TOML, &vars))?;
    write_file(&src_dir.join("lib.rs"), &render(LIB_RS, &vars))?;

    info!(
        slug = %names.slug,
        capability = %kind,
        path = %crate_dir.display(),
        "plugin crate generated"
    );
    Ok(crate_dir)
}

/// Runs `agora plugin init`, returning the text to print.
pub fn run_init(kind: CapabilityKind, name: &str, target_dir: &Path) -> Result<String, ScaffoldError> {
    let crate_dir = scaffold_plugin(kind, name, target_dir)?;
    let names = PluginNames::derive(name, kind)?;
    Ok(format!(
        "created {kind} plugin `{slug}` in {dir}\n\
         next steps:\n  \
         1. add `{krate} = {{ path = \"crates/{krate}\" }}` to [workspace.dependencies]\n  \
         2. register `{module}::{ty}::new()?` in the host's builtin plugin list\n  \
         3. add name and description entries for `{slug}` to the message catalog\n",
        slug = names.slug,
        dir = crate_dir.display(),
        krate = names.crate_name,
        module = names.crate_name.replace('-', "_"),
        ty = names.type_name,
    ))
}

fn write_file(path: &Path, content: &str) -> Result<(), ScaffoldError> {
    std::fs::write(path, content).map_err(|source| ScaffoldError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |out, (key, value)| {
        out.replace(&format!("{{{{{key}}}}}"), value)
    })
}

/// `fooBar`, `foo-bar` and `Foo_Bar` all become `foo_bar`.
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut after_lower = false;
    for c in name.chars() {
        if c == '-' || c == '_' {
            out.push('_');
            after_lower = false;
        } else if c.is_ascii_uppercase() {
            if after_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            after_lower = false;
        } else {
            out.push(c);
            after_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Per-capability template fragments.
struct Capability {
    kind_label: &'static str,
    trait_name: &'static str,
    accessor: &'static str,
    helpers: &'static str,
    std_imports: &'static str,
    type_imports: &'static str,
    body: &'static str,
}

impl Capability {
    fn of(kind: CapabilityKind) -> Self {
        match kind {
            CapabilityKind::Cache => Self {
                kind_label: "cache",
                trait_name: "Cache",
                accessor: "as_cache",
                std_imports: "use std::sync::Arc;\nuse std::time::Duration;\n",
                type_imports: "ConfigField, ConfigFieldType",
                body: CACHE_BODY,
                helpers: NOT_IMPLEMENTED_HELPER,
            },
            CapabilityKind::Connector => Self {
                kind_label: "connector",
                trait_name: "Connector",
                accessor: "as_connector",
                std_imports: "use std::sync::Arc;\n",
                type_imports: "CallbackRequest, ConfigField, ConfigFieldType, ExternalLoginUserInfo",
                body: CONNECTOR_BODY,
                helpers: NOT_IMPLEMENTED_HELPER,
            },
            CapabilityKind::Notification => Self {
                kind_label: "notification",
                trait_name: "Notification",
                accessor: "as_notification",
                std_imports: "use std::sync::Arc;\n",
                type_imports: "ConfigField, ConfigFieldType, NotificationMessage",
                body: NOTIFICATION_BODY,
                helpers: NOT_IMPLEMENTED_HELPER,
            },
            CapabilityKind::Reviewer => Self {
                kind_label: "reviewer",
                trait_name: "Reviewer",
                accessor: "as_reviewer",
                std_imports: "use std::sync::Arc;\n",
                type_imports: "ConfigField, ConfigFieldType, ReviewContent, ReviewResult",
                body: REVIEWER_BODY,
                helpers: "",
            },
            CapabilityKind::Search => Self {
                kind_label: "search",
                trait_name: "Search",
                accessor: "as_search",
                std_imports: "use std::sync::Arc;\n",
                type_imports: "ConfigField, ConfigFieldType, SearchBasicCond, SearchContent, SearchPage",
                body: SEARCH_BODY,
                helpers: NOT_IMPLEMENTED_HELPER,
            },
            CapabilityKind::Storage => Self {
                kind_label: "storage",
                trait_name: "Storage",
                accessor: "as_storage",
                std_imports: "use std::sync::Arc;\n",
                type_imports: "ConfigField, ConfigFieldType, FileUpload, UploadFileCondition, UploadFileResponse",
                body: STORAGE_BODY,
                helpers: NOT_IMPLEMENTED_HELPER,
            },
            CapabilityKind::UserCenter => Self {
                kind_label: "user center",
                trait_name: "UserCenter",
                accessor: "as_user_center",
                std_imports: "use std::sync::Arc;\n",
                type_imports: "CallbackRequest, ConfigField, ConfigFieldType, UserCenterBasicUserInfo, UserCenterDesc, UserStatus",
                body: USER_CENTER_BODY,
                helpers: NOT_IMPLEMENTED_HELPER,
            },
        }
    }
}

const CARGO_TOML: &str = r##"[package]
name = "{{crate_name}}"
version.workspace = true
edition.workspace = true
license.workspace = true
repository.workspace = true
authors.workspace = true
publish = false
description = "{{display_name}} {{kind}} plugin for the Agora framework"

[dependencies]
agora-core.workspace = true
agora-plugin.workspace = true
async-trait.workspace = true
serde.workspace = true
serde_json.workspace = true
tracing.workspace = true
"##;

const PLUGIN_TOML: &str = r##"[plugin]
name = "{{display_name}}"
slug_name = "{{slug}}"
description = "{{display_name}} {{kind}} plugin"
author = ""
version = "0.1.0"
link = ""
"##;

const LIB_RS: &str = r##"//! {{display_name}} {{kind}} plugin for the Agora framework.

{{std_imports}}
use async_trait::async_trait;
use serde::Deserialize;

use agora_core::types::{{{type_imports}}};
use agora_core::{
    AgoraError, ConfigSlot, Plugin, PluginConfig, PluginInfo, {{trait_name}}, keep_secret,
};
use agora_plugin::{PluginManifest, parse_plugin_manifest};

const MANIFEST: &str = include_str!("../plugin.toml");

/// Configuration of a [`{{type_name}}`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct {{type_name}}Config {
    #[serde(default)]
    pub api_key: String,
}

impl PluginConfig for {{type_name}}Config {
    fn keep_secrets(&mut self, previous: &Self) {
        keep_secret(&mut self.api_key, &previous.api_key);
    }
}

pub struct {{type_name}} {
    manifest: Arc<PluginManifest>,
    config: ConfigSlot<{{type_name}}Config>,
}

impl {{type_name}} {
    pub fn new() -> Result<Self, AgoraError> {
        let manifest = Arc::new(parse_plugin_manifest(MANIFEST)?);
        Ok(Self::from_manifest(manifest))
    }

    pub fn from_manifest(manifest: Arc<PluginManifest>) -> Self {
        let config = ConfigSlot::new(manifest.slug_name.clone());
        Self { manifest, config }
    }
{{helpers}}}

impl Plugin for {{type_name}} {
    fn info(&self) -> PluginInfo {
        self.manifest.info()
    }

    fn slug_name(&self) -> &str {
        &self.manifest.slug_name
    }

    fn config_fields(&self) -> Vec<ConfigField> {
        let config = self.config.load();
        vec![ConfigField::new("api_key", ConfigFieldType::Secret, false).with_secret(&config.api_key)]
    }

    fn receive_config(&self, config: &serde_json::Value) -> Result<(), AgoraError> {
        self.config.receive(config)
    }

    fn {{accessor}}(&self) -> Option<&dyn {{trait_name}}> {
        Some(self)
    }
}

#[async_trait]
impl {{trait_name}} for {{type_name}} {
{{body}}}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::CapabilityKind;

    #[test]
    fn declares_one_capability() {
        let plugin = {{type_name}}::new().unwrap();
        assert_eq!(plugin.capabilities(), vec![CapabilityKind::{{trait_name}}]);
        assert_eq!(plugin.slug_name(), "{{slug}}");
    }
}
"##;

const NOT_IMPLEMENTED_HELPER: &str = r##"
    fn not_implemented(&self, operation: &str) -> AgoraError {
        AgoraError::Internal(format!(
            "{}: {operation} is not implemented",
            self.manifest.slug_name
        ))
    }
"##;

const CACHE_BODY: &str = r##"    async fn get_string(&self, _key: &str) -> Result<Option<String>, AgoraError> {
        Err(self.not_implemented("get_string"))
    }

    async fn set_string(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), AgoraError> {
        Err(self.not_implemented("set_string"))
    }

    async fn get_int64(&self, _key: &str) -> Result<Option<i64>, AgoraError> {
        Err(self.not_implemented("get_int64"))
    }

    async fn set_int64(&self, _key: &str, _value: i64, _ttl: Duration) -> Result<(), AgoraError> {
        Err(self.not_implemented("set_int64"))
    }

    async fn increase(&self, _key: &str, _delta: i64) -> Result<i64, AgoraError> {
        Err(self.not_implemented("increase"))
    }

    async fn decrease(&self, _key: &str, _delta: i64) -> Result<i64, AgoraError> {
        Err(self.not_implemented("decrease"))
    }

    async fn del(&self, _key: &str) -> Result<(), AgoraError> {
        Err(self.not_implemented("del"))
    }

    async fn flush(&self) -> Result<(), AgoraError> {
        Err(self.not_implemented("flush"))
    }
"##;

const CONNECTOR_BODY: &str = r##"    fn connector_logo_svg(&self) -> String {
        String::new()
    }

    fn connector_name(&self) -> agora_core::Translator {
        self.manifest.info().name
    }

    fn connector_slug_name(&self) -> String {
        self.manifest.slug_name.clone()
    }

    async fn connector_sender(&self, _receiver_url: &str) -> Result<String, AgoraError> {
        Err(self.not_implemented("connector_sender"))
    }

    async fn connector_receiver(
        &self,
        _request: &CallbackRequest,
        _receiver_url: &str,
    ) -> Result<ExternalLoginUserInfo, AgoraError> {
        Err(self.not_implemented("connector_receiver"))
    }
"##;

const NOTIFICATION_BODY: &str = r##"    async fn notify(&self, message: NotificationMessage) -> Result<(), AgoraError> {
        tracing::debug!(?message, "notification received");
        Err(self.not_implemented("notify"))
    }
"##;

const REVIEWER_BODY: &str = r##"    async fn review(&self, content: &ReviewContent) -> ReviewResult {
        if content.content.chars().count() > 50 {
            ReviewResult::need_review("content is longer than 50 characters")
        } else {
            ReviewResult::approved("")
        }
    }
"##;

const SEARCH_BODY: &str = r##"    async fn search_contents(&self, _cond: &SearchBasicCond) -> Result<SearchPage, AgoraError> {
        Err(self.not_implemented("search_contents"))
    }

    async fn update_content(&self, _content: &SearchContent) -> Result<(), AgoraError> {
        Err(self.not_implemented("update_content"))
    }

    async fn delete_content(&self, _object_id: &str) -> Result<(), AgoraError> {
        Err(self.not_implemented("delete_content"))
    }
"##;

const STORAGE_BODY: &str = r##"    async fn upload_file(
        &self,
        _upload: &FileUpload,
        _condition: &UploadFileCondition,
    ) -> Result<UploadFileResponse, AgoraError> {
        Err(self.not_implemented("upload_file"))
    }

    async fn delete_file(&self, _path: &str) -> Result<(), AgoraError> {
        Err(self.not_implemented("delete_file"))
    }

    fn is_unsupported_file_type(&self, file_name: &str, condition: &UploadFileCondition) -> bool {
        let ext = file_name.rsplit_once('.').map(|(_, ext)| ext);
        !condition
            .authorized_extensions()
            .iter()
            .any(|allowed| ext.is_some_and(|ext| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext)))
    }

    fn exceed_file_size_limit(&self, file_size: u64, condition: &UploadFileCondition) -> bool {
        file_size > condition.size_limit_bytes()
    }
"##;

const USER_CENTER_BODY: &str = r##"    fn description(&self) -> UserCenterDesc {
        UserCenterDesc {
            name: self.manifest.name.clone(),
            description: self.manifest.description.clone(),
            ..Default::default()
        }
    }

    async fn login_callback(
        &self,
        _request: &CallbackRequest,
    ) -> Result<UserCenterBasicUserInfo, AgoraError> {
        Err(self.not_implemented("login_callback"))
    }

    async fn sign_up_callback(
        &self,
        _request: &CallbackRequest,
    ) -> Result<UserCenterBasicUserInfo, AgoraError> {
        Err(self.not_implemented("sign_up_callback"))
    }

    async fn user_info(
        &self,
        _external_id: &str,
    ) -> Result<Option<UserCenterBasicUserInfo>, AgoraError> {
        Err(self.not_implemented("user_info"))
    }

    async fn user_list(
        &self,
        _external_ids: &[String],
    ) -> Result<Vec<UserCenterBasicUserInfo>, AgoraError> {
        Err(self.not_implemented("user_list"))
    }

    async fn user_status(&self, _external_id: &str) -> Result<UserStatus, AgoraError> {
        Err(self.not_implemented("user_status"))
    }

    fn after_login(&self, _external_id: &str, _access_token: &str) {}
"##;
