// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps a provider's userinfo document onto [`ExternalLoginUserInfo`].

use serde_json::Value;

use agora_core::AgoraError;
use agora_core::types::ExternalLoginUserInfo;

/// Where each identity attribute lives in the userinfo document.
///
/// A field starting with `/` is a JSON pointer (`/data/id`); anything else is
/// a top-level key.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldMap<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub avatar: &'a str,
}

fn lookup<'v>(document: &'v Value, field: &str) -> Option<&'v Value> {
    if field.is_empty() {
        None
    } else if field.starts_with('/') {
        document.pointer(field)
    } else {
        document.get(field)
    }
}

fn text(document: &Value, field: &str) -> String {
    match lookup(document, field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

impl FieldMap<'_> {
    /// Extracts the identity; a missing or empty id is an authentication failure.
    pub(crate) fn extract(&self, raw: &str) -> Result<ExternalLoginUserInfo, AgoraError> {
        let document: Value = serde_json::from_str(raw).map_err(|e| {
            AgoraError::Authentication(format!("userinfo response is not JSON: {e}"))
        })?;

        let external_id = text(&document, self.id);
        if external_id.trim().is_empty() {
            return Err(AgoraError::Authentication(format!(
                "userinfo response has no `{}`",
                self.id
            )));
        }

        Ok(ExternalLoginUserInfo {
            external_id,
            display_name: text(&document, self.name),
            username: text(&document, self.username),
            email: text(&document, self.email),
            avatar: text(&document, self.avatar),
            meta_info: raw.to_string(),
        })
    }
}
