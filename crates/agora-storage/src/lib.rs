// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local filesystem storage plugin for the Agora framework.
//!
//! Objects are written to `{root_dir}/{source}/{uuid}.{ext}` and served from
//! `{public_base_url}/{source}/{uuid}.{ext}`. Each upload is written to a
//! temporary file in the target directory and renamed into place, so a failed
//! upload never leaves a partial object under its final name.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use agora_core::types::{
    ConfigField, ConfigFieldType, FileUpload, UploadFileCondition, UploadFileResponse,
};
use agora_core::{AgoraError, ConfigSlot, Plugin, PluginConfig, PluginInfo, Storage};
use agora_plugin::{PluginManifest, parse_plugin_manifest};

const MANIFEST: &str = include_str!("../plugin.toml");

/// Configuration of a [`LocalStorage`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalStorageConfig {
    /// Directory objects are written under.
    #[serde(default)]
    pub root_dir: String,
    /// URL prefix the host serves `root_dir` from.
    #[serde(default)]
    pub public_base_url: String,
}

impl PluginConfig for LocalStorageConfig {
    fn validate(&self) -> Result<(), AgoraError> {
        if !self.public_base_url.is_empty()
            && !(self.public_base_url.starts_with("http://")
                || self.public_base_url.starts_with("https://")
                || self.public_base_url.starts_with('/'))
        {
            return Err(AgoraError::Config(format!(
                "local_storage: public_base_url `{}` must be an http(s) URL or an absolute path",
                self.public_base_url
            )));
        }
        Ok(())
    }

    fn is_configured(&self) -> bool {
        !self.root_dir.is_empty() && !self.public_base_url.is_empty()
    }
}

/// Lowercase extension of `file_name`, without the dot.
fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
}

/// Resolves an object path against `root`, rejecting anything that could
/// escape it.
fn resolve(root: &Path, object_path: &str) -> Result<PathBuf, AgoraError> {
    let relative = Path::new(object_path);
    let safe = !object_path.is_empty()
        && relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !safe {
        return Err(AgoraError::Validation(format!(
            "unsafe storage path `{object_path}`"
        )));
    }
    Ok(root.join(relative))
}

fn io_error(message: String, e: std::io::Error) -> AgoraError {
    AgoraError::backend_source(message, e, false)
}

/// Storage plugin writing to a local directory.
pub struct LocalStorage {
    manifest: Arc<PluginManifest>,
    config: ConfigSlot<LocalStorageConfig>,
}

impl LocalStorage {
    pub fn new() -> Result<Self, AgoraError> {
        let manifest = Arc::new(parse_plugin_manifest(MANIFEST)?);
        Ok(Self::from_manifest(manifest))
    }

    pub fn from_manifest(manifest: Arc<PluginManifest>) -> Self {
        let config = ConfigSlot::new(manifest.slug_name.clone());
        Self { manifest, config }
    }
}

impl Plugin for LocalStorage {
    fn info(&self) -> PluginInfo {
        self.manifest.info()
    }

    fn slug_name(&self) -> &str {
        &self.manifest.slug_name
    }

    fn config_fields(&self) -> Vec<ConfigField> {
        let config = self.config.load();
        vec![
            ConfigField::new("root_dir", ConfigFieldType::Input, true)
                .with_value(config.root_dir.clone()),
            ConfigField::new("public_base_url", ConfigFieldType::Input, true)
                .with_value(config.public_base_url.clone()),
        ]
    }

    fn receive_config(&self, config: &serde_json::Value) -> Result<(), AgoraError> {
        self.config.receive(config)
    }

    fn as_storage(&self) -> Option<&dyn Storage> {
        Some(self)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_file(
        &self,
        upload: &FileUpload,
        condition: &UploadFileCondition,
    ) -> Result<UploadFileResponse, AgoraError> {
        let config = self.config.ready()?;
        // Never store a type this plugin reports as unsupported.
        if self.is_unsupported_file_type(&upload.file_name, condition) {
            return Err(AgoraError::Validation(format!(
                "file type of `{}` is not supported",
                upload.file_name
            )));
        }
        let ext = extension(&upload.file_name).unwrap_or_default();

        let id = Uuid::new_v4();
        let object_path = format!("{}/{id}.{ext}", condition.source);
        let dir = Path::new(&config.root_dir).join(condition.source.to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_error(format!("cannot create `{}`", dir.display()), e))?;

        let target = dir.join(format!("{id}.{ext}"));
        let staging = dir.join(format!(".{id}.part"));
        if let Err(e) = write_then_rename(&staging, &target, &upload.bytes).await {
            // Best effort; the staging name is never served.
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }

        debug!(
            path = %object_path,
            bytes = upload.bytes.len(),
            source = %condition.source,
            "file stored"
        );
        Ok(UploadFileResponse {
            full_url: format!(
                "{}/{object_path}",
                config.public_base_url.trim_end_matches('/')
            ),
            path: object_path,
        })
    }

    async fn delete_file(&self, path: &str) -> Result<(), AgoraError> {
        let config = self.config.ready()?;
        let target = resolve(Path::new(&config.root_dir), path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                debug!(path, "file deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!(path, error = %e, "file delete failed");
                Err(io_error(format!("cannot delete `{path}`"), e))
            }
        }
    }

    fn is_unsupported_file_type(&self, file_name: &str, condition: &UploadFileCondition) -> bool {
        let Some(ext) = extension(file_name) else {
            return true;
        };
        !condition
            .authorized_extensions()
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    }

    fn exceed_file_size_limit(&self, file_size: u64, condition: &UploadFileCondition) -> bool {
        file_size > condition.size_limit_bytes()
    }
}

async fn write_then_rename(staging: &Path, target: &Path, bytes: &[u8]) -> Result<(), AgoraError> {
    let mut file = tokio::fs::File::create(staging)
        .await
        .map_err(|e| io_error(format!("cannot create `{}`", staging.display()), e))?;
    file.write_all(bytes)
        .await
        .map_err(|e| io_error(format!("cannot write `{}`", staging.display()), e))?;
    file.sync_all()
        .await
        .map_err(|e| io_error(format!("cannot sync `{}`", staging.display()), e))?;
    drop(file);
    tokio::fs::rename(staging, target)
        .await
        .map_err(|e| io_error(format!("cannot move into `{}`", target.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::dispatch::checked_upload;
    use agora_core::types::UploadSource;

    fn storage(root: &Path) -> LocalStorage {
        let storage = LocalStorage::new().unwrap();
        storage
            .receive_config(&serde_json::json!({
                "root_dir": root.display().to_string(),
                "public_base_url": "https://cdn.example.com/uploads/",
            }))
            .unwrap();
        storage
    }

    fn condition(source: UploadSource) -> UploadFileCondition {
        UploadFileCondition {
            source,
            max_image_size_mib: 1,
            max_attachment_size_mib: 2,
            authorized_image_extensions: vec!["png".into(), "jpg".into()],
            authorized_attachment_extensions: vec!["zip".into()],
        }
    }

    #[tokio::test]
    async fn upload_writes_object_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        let upload = FileUpload {
            file_name: "Avatar.PNG".into(),
            bytes: b"not really a png".to_vec(),
        };

        let response = storage
            .upload_file(&upload, &condition(UploadSource::Avatar))
            .await
            .unwrap();
        assert!(response.path.starts_with("avatar/"));
        assert!(response.path.ends_with(".png"));
        assert_eq!(
            response.full_url,
            format!("https://cdn.example.com/uploads/{}", response.path)
        );

        let stored = std::fs::read(dir.path().join(&response.path)).unwrap();
        assert_eq!(stored, upload.bytes);
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("avatar"))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        let response = storage
            .upload_file(
                &FileUpload {
                    file_name: "a.zip".into(),
                    bytes: vec![1, 2, 3],
                },
                &condition(UploadSource::PostAttachment),
            )
            .await
            .unwrap();

        storage.delete_file(&response.path).await.unwrap();
        storage.delete_file(&response.path).await.unwrap();
        storage.delete_file("post_attachment/never.zip").await.unwrap();
        assert!(!dir.path().join(&response.path).exists());
    }

    #[tokio::test]
    async fn delete_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        for bad in ["../etc/passwd", "/etc/passwd", "avatar/../../x", "", "./a"] {
            let err = storage.delete_file(bad).await.unwrap_err();
            assert!(matches!(err, AgoraError::Validation(_)), "accepted {bad:?}");
        }
    }

    #[test]
    fn validators_follow_condition() {
        let storage = LocalStorage::new().unwrap();
        let image = condition(UploadSource::Content);
        assert!(!storage.is_unsupported_file_type("photo.JPG", &image));
        assert!(storage.is_unsupported_file_type("archive.zip", &image));
        assert!(storage.is_unsupported_file_type("no_extension", &image));
        let attachment = condition(UploadSource::PostAttachment);
        assert!(!storage.is_unsupported_file_type("archive.zip", &attachment));

        assert!(!storage.exceed_file_size_limit(1024 * 1024, &image));
        assert!(storage.exceed_file_size_limit(1024 * 1024 + 1, &image));
        assert!(!storage.exceed_file_size_limit(2 * 1024 * 1024, &attachment));
    }

    #[tokio::test]
    async fn checked_upload_never_stores_gated_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        let wrong_type = FileUpload {
            file_name: "script.exe".into(),
            bytes: vec![0; 10],
        };
        let err = checked_upload(&storage, &wrong_type, &condition(UploadSource::Avatar))
            .await
            .unwrap_err();
        assert!(matches!(err, AgoraError::Validation(_)));

        let too_big = FileUpload {
            file_name: "big.png".into(),
            bytes: vec![0; 1024 * 1024 + 1],
        };
        let err = checked_upload(&storage, &too_big, &condition(UploadSource::Avatar))
            .await
            .unwrap_err();
        assert!(matches!(err, AgoraError::Validation(_)));

        assert!(!dir.path().join("avatar").exists());
    }

    #[tokio::test]
    async fn direct_upload_of_unsupported_type_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        let err = storage
            .upload_file(
                &FileUpload {
                    file_name: "script.exe".into(),
                    bytes: vec![0; 10],
                },
                &condition(UploadSource::Avatar),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AgoraError::Validation(_)));
    }

    #[tokio::test]
    async fn unconfigured_storage_reports_not_configured() {
        let storage = LocalStorage::new().unwrap();
        let err = storage
            .upload_file(
                &FileUpload {
                    file_name: "a.png".into(),
                    bytes: vec![],
                },
                &condition(UploadSource::Avatar),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AgoraError::NotConfigured { .. }));
        assert!(matches!(
            storage.delete_file("avatar/a.png").await,
            Err(AgoraError::NotConfigured { .. })
        ));
    }
}
