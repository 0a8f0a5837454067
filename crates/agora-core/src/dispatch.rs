// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpers the host uses when invoking capability operations.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::AgoraError;
use crate::traits::Storage;
use crate::types::{FileUpload, UploadFileCondition, UploadFileResponse};

/// Runs a capability operation under a deadline.
///
/// The operation's future is dropped when the deadline passes, which cancels
/// any in-flight work, and the caller gets [`AgoraError::Timeout`].
pub async fn with_deadline<T, F>(duration: Duration, operation: F) -> Result<T, AgoraError>
where
    F: Future<Output = Result<T, AgoraError>>,
{
    match tokio::time::timeout(duration, operation).await {
        Ok(result) => result,
        Err(_) => {
            warn!(?duration, "capability operation exceeded deadline");
            Err(AgoraError::Timeout { duration })
        }
    }
}

/// Uploads a file after running both storage validation gates.
///
/// A file flagged by either gate never reaches `upload_file`.
pub async fn checked_upload(
    storage: &dyn Storage,
    upload: &FileUpload,
    condition: &UploadFileCondition,
) -> Result<UploadFileResponse, AgoraError> {
    if storage.is_unsupported_file_type(&upload.file_name, condition) {
        return Err(AgoraError::Validation(format!(
            "file type of `{}` is not supported for {}",
            upload.file_name, condition.source
        )));
    }
    if storage.exceed_file_size_limit(upload.bytes.len() as u64, condition) {
        return Err(AgoraError::Validation(format!(
            "file `{}` exceeds the {} size limit",
            upload.file_name, condition.source
        )));
    }
    storage.upload_file(upload, condition).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn with_deadline_times_out_slow_operation() {
        let result: Result<(), AgoraError> = with_deadline(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(AgoraError::Timeout { .. })));
    }

    #[tokio::test]
    async fn with_deadline_passes_through_result() {
        let ok = with_deadline(Duration::from_secs(1), async { Ok::<_, AgoraError>(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err = with_deadline(Duration::from_secs(1), async {
            Err::<(), _>(AgoraError::Authentication("denied".into()))
        })
        .await;
        assert!(matches!(err, Err(AgoraError::Authentication(_))));
    }
}
