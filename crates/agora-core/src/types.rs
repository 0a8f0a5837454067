// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the capability traits and the registry.

use std::collections::HashMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::i18n::{Localizer, Translator};

/// Identifies one capability contract in the plugin registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
pub enum CapabilityKind {
    Cache,
    Connector,
    Notification,
    Reviewer,
    Search,
    Storage,
    UserCenter,
}

impl CapabilityKind {
    /// All capability kinds, in declaration order.
    pub const ALL: [CapabilityKind; 7] = [
        CapabilityKind::Cache,
        CapabilityKind::Connector,
        CapabilityKind::Notification,
        CapabilityKind::Reviewer,
        CapabilityKind::Search,
        CapabilityKind::Storage,
        CapabilityKind::UserCenter,
    ];
}

/// Descriptor a plugin exposes to the host's plugin-management UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: Translator,
    pub slug_name: String,
    pub description: Translator,
    pub author: String,
    pub version: String,
    pub link: String,
}

impl PluginInfo {
    /// Renders the translatable fields for one language.
    pub fn localized(&self, localizer: &dyn Localizer, lang: &str) -> LocalizedInfo {
        LocalizedInfo {
            name: self.name.translate(localizer, lang),
            slug_name: self.slug_name.clone(),
            description: self.description.translate(localizer, lang),
            author: self.author.clone(),
            version: self.version.clone(),
            link: self.link.clone(),
        }
    }
}

/// [`PluginInfo`] with the name and description resolved to display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedInfo {
    pub name: String,
    pub slug_name: String,
    pub description: String,
    pub author: String,
    pub version: String,
    pub link: String,
}

// --- Configuration descriptors ---

/// Input widget the host renders for a config field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConfigFieldType {
    Input,
    Secret,
    Number,
    Switch,
    TagList,
}

/// Value shown in place of a configured secret.
pub const REDACTED: &str = "********";

/// One field of a plugin's configuration form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigField {
    pub name: String,
    pub field_type: ConfigFieldType,
    pub title: Translator,
    pub description: Translator,
    pub required: bool,
    /// Current value, with secrets redacted.
    pub value: serde_json::Value,
}

impl ConfigField {
    pub fn new(name: &str, field_type: ConfigFieldType, required: bool) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            title: Translator::new(format!("config.{name}.title"), name),
            description: Translator::new(format!("config.{name}.description"), ""),
            required,
            value: serde_json::Value::Null,
        }
    }

    pub fn with_value(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Sets the value of a secret field to [`REDACTED`] when non-empty.
    ///
    /// A host that posts the form back unchanged sends the marker, which the
    /// plugin's config resolves to the secret it already holds.
    pub fn with_secret(mut self, secret: &str) -> Self {
        let shown = if secret.is_empty() { "" } else { REDACTED };
        self.value = serde_json::Value::String(shown.to_string());
        self
    }
}

// --- Connector types ---

/// Query parameters of an OAuth-style callback invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackRequest {
    pub query: HashMap<String, String>,
}

impl CallbackRequest {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            query: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Returns a non-empty query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Normalized identity returned by a connector after a successful callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLoginUserInfo {
    /// Durable, unique id of the external account; the host's join key.
    pub external_id: String,
    pub display_name: String,
    pub username: String,
    pub email: String,
    pub avatar: String,
    /// Raw provider document, kept for auditing.
    pub meta_info: String,
}

// --- Notification types ---

/// Event that triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationType {
    UpdateQuestion,
    AnswerTheQuestion,
    UpdateAnswer,
    AcceptAnswer,
    CommentQuestion,
    CommentAnswer,
    ReplyToYou,
    MentionedYou,
    InvitedYouToAnswer,
    NewQuestion,
    NewQuestionFollowedTag,
}

/// A notification addressed to one receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub receiver_user_id: String,
    #[serde(default)]
    pub receiver_external_id: String,
    #[serde(default)]
    pub receiver_lang: String,
    #[serde(default)]
    pub trigger_user_id: String,
    #[serde(default)]
    pub trigger_user_display_name: String,
    #[serde(default)]
    pub question_title: String,
    #[serde(default)]
    pub question_url: String,
    #[serde(default)]
    pub answer_url: String,
    #[serde(default)]
    pub comment_url: String,
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

impl NotificationMessage {
    pub fn new(notification_type: NotificationType, receiver_user_id: impl Into<String>) -> Self {
        Self {
            notification_type,
            receiver_user_id: receiver_user_id.into(),
            receiver_external_id: String::new(),
            receiver_lang: String::new(),
            trigger_user_id: String::new(),
            trigger_user_display_name: String::new(),
            question_title: String::new(),
            question_url: String::new(),
            answer_url: String::new(),
            comment_url: String::new(),
            extra: HashMap::new(),
        }
    }
}

// --- Reviewer types ---

/// Content submitted for moderation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewContent {
    pub object_type: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub author: String,
    pub ip: String,
    pub user_agent: String,
}

/// Moderation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReviewStatus {
    Approved,
    NeedReview,
    DeleteDirectly,
}

/// Verdict returned by a reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub approved: bool,
    pub review_status: ReviewStatus,
    pub reason: String,
}

impl ReviewResult {
    pub fn approved(reason: impl Into<String>) -> Self {
        Self {
            approved: true,
            review_status: ReviewStatus::Approved,
            reason: reason.into(),
        }
    }

    pub fn need_review(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            review_status: ReviewStatus::NeedReview,
            reason: reason.into(),
        }
    }

    pub fn delete_directly(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            review_status: ReviewStatus::DeleteDirectly,
            reason: reason.into(),
        }
    }
}

// --- Search types ---

/// Kind of indexed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SearchObjectType {
    Question,
    Answer,
}

/// A document pushed into the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchContent {
    /// Identity of the document; upserts are keyed on it.
    pub object_id: String,
    pub object_type: SearchObjectType,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub question_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub has_accepted: bool,
    /// Creation time, seconds since the Unix epoch.
    #[serde(default)]
    pub created_at: i64,
    /// Last activity time, seconds since the Unix epoch.
    #[serde(default)]
    pub active_at: i64,
}

/// Sort order for search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SearchOrder {
    #[default]
    Relevance,
    Newest,
    Active,
    Score,
}

/// Search query with filters and 1-indexed pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBasicCond {
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub question_id: Option<String>,
    #[serde(default)]
    pub object_type: Option<SearchObjectType>,
    #[serde(default)]
    pub question_accepted: Option<bool>,
    #[serde(default)]
    pub order: SearchOrder,
    /// 1-indexed page number; 0 is treated as 1.
    #[serde(default)]
    pub page: usize,
    /// Maximum results per page; 0 selects the plugin default.
    #[serde(default)]
    pub page_size: usize,
}

impl SearchBasicCond {
    /// Range of `total` sorted matches that makes up the requested page.
    ///
    /// The returned range is empty when the page lies beyond the last match,
    /// and never longer than the effective page size.
    pub fn page_window(&self, total: usize, default_size: usize, max_size: usize) -> Range<usize> {
        let size = match self.page_size {
            0 => default_size,
            n => n,
        }
        .clamp(1, max_size.max(1));
        let page = self.page.max(1);
        let start = (page - 1).saturating_mul(size).min(total);
        let end = start.saturating_add(size).min(total);
        start..end
    }
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub object_type: SearchObjectType,
}

/// One page of search hits with the full match count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    /// Number of matches across all pages.
    pub total: u64,
}

// --- Storage types ---

/// Where an uploaded file is used; selects the applicable limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UploadSource {
    Avatar,
    Content,
    Branding,
    PostAttachment,
}

impl UploadSource {
    /// Whether uploads from this source are images (as opposed to attachments).
    pub fn is_image(self) -> bool {
        !matches!(self, UploadSource::PostAttachment)
    }
}

/// Site policy an upload is checked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFileCondition {
    pub source: UploadSource,
    pub max_image_size_mib: u64,
    pub max_attachment_size_mib: u64,
    pub authorized_image_extensions: Vec<String>,
    pub authorized_attachment_extensions: Vec<String>,
}

impl UploadFileCondition {
    /// Byte limit for this condition's source.
    pub fn size_limit_bytes(&self) -> u64 {
        let mib = if self.source.is_image() {
            self.max_image_size_mib
        } else {
            self.max_attachment_size_mib
        };
        mib.saturating_mul(1024 * 1024)
    }

    /// Extensions (lowercase, without dot) allowed for this condition's source.
    pub fn authorized_extensions(&self) -> &[String] {
        if self.source.is_image() {
            &self.authorized_image_extensions
        } else {
            &self.authorized_attachment_extensions
        }
    }
}

/// A file handed to a storage plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Location of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFileResponse {
    /// Publicly resolvable URL.
    pub full_url: String,
    /// Plugin-relative path, accepted by `delete_file`.
    pub path: String,
}

// --- UserCenter types ---

/// Account state reported by an identity provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Available,
    Suspended,
    Deleted,
}

/// User record returned by a user center.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCenterBasicUserInfo {
    pub external_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub rank: i64,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub status: UserStatus,
}

/// How the host should present the user center on its login pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCenterDesc {
    pub name: String,
    pub description: String,
    pub url: String,
    pub login_redirect_url: String,
    pub sign_up_redirect_url: String,
    /// Whether local username/password login stays available alongside the user center.
    pub enabled_original_user_system: bool,
}
