// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Agora plugin framework.

use thiserror::Error;

use crate::types::CapabilityKind;

/// The primary error type returned by every capability operation and by the registry.
///
/// Absence (missing key, unknown user, deleted document) is never an error:
/// capability operations signal it with `Option` or an empty collection.
#[derive(Debug, Error)]
pub enum AgoraError {
    /// Invalid configuration (bad manifest, malformed plugin config, invalid slug).
    #[error("configuration error: {0}")]
    Config(String),

    /// The plugin was invoked before a usable configuration was delivered.
    #[error("plugin `{plugin}` is not configured")]
    NotConfigured { plugin: String },

    /// Backend failure (network, disk, remote API). The host may retry when `retryable` is set.
    #[error("backend error: {message}")]
    Backend {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        retryable: bool,
    },

    /// A validation gate rejected the input (unsupported file type, oversized file, unsafe path).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An external identity exchange could not be completed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A plugin with the same slug is already registered for this capability.
    #[error("duplicate plugin: {kind}/{slug}")]
    DuplicatePlugin { kind: CapabilityKind, slug: String },

    /// No plugin with this slug is registered.
    #[error("plugin not found: {slug}")]
    PluginNotFound { slug: String },

    /// Operation exceeded the caller-supplied deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AgoraError {
    /// A backend failure that is safe to retry.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
            retryable: true,
        }
    }

    /// A backend failure that will not go away on retry (bad request, malformed response).
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
            retryable: false,
        }
    }

    /// Wraps a source error as a backend failure.
    pub fn backend_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
        retryable: bool,
    ) -> Self {
        Self::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
            retryable,
        }
    }

    /// A non-success HTTP status from a remote service.
    ///
    /// 429 and 5xx are retryable; everything else is permanent.
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            message: format!("remote returned {status}: {}", message.into()),
            source: None,
            retryable: status == 429 || status >= 500,
        }
    }

    /// Whether the host's delivery layer may retry the failed operation.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Backend { retryable, .. } => *retryable,
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}
