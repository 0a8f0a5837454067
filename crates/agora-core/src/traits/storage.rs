// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage capability: object storage for uploaded files.

use async_trait::async_trait;

use crate::error::AgoraError;
use crate::traits::plugin::Plugin;
use crate::types::{FileUpload, UploadFileCondition, UploadFileResponse};

/// Object storage for avatars, post images and attachments.
///
/// The host checks [`is_unsupported_file_type`](Storage::is_unsupported_file_type)
/// and [`exceed_file_size_limit`](Storage::exceed_file_size_limit) before
/// calling [`upload_file`](Storage::upload_file); see
/// [`checked_upload`](crate::dispatch::checked_upload).
#[async_trait]
pub trait Storage: Plugin {
    async fn upload_file(
        &self,
        upload: &FileUpload,
        condition: &UploadFileCondition,
    ) -> Result<UploadFileResponse, AgoraError>;

    /// Removes a stored object. Removing a missing object succeeds.
    async fn delete_file(&self, path: &str) -> Result<(), AgoraError>;

    fn is_unsupported_file_type(&self, file_name: &str, condition: &UploadFileCondition) -> bool;

    fn exceed_file_size_limit(&self, file_size: u64, condition: &UploadFileCondition) -> bool;
}
