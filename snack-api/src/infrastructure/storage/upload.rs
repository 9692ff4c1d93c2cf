use std::path::{Path, PathBuf};

use axum::body::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::AppError;

/// An image part received from a snack form.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub data: Bytes,
}

/// Local-disk image storage served back under `url_prefix`.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    url_prefix: String,
}

impl UploadStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            url_prefix: format!("/{}", config.url_prefix.trim_matches('/')),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub async fn ensure_dir(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Writes `image` to disk and returns its public path.
    pub async fn save(&self, image: &UploadedImage) -> Result<String, AppError> {
        let file_name = format!(
            "snack-{}-{}{}",
            Utc::now().timestamp_millis(),
            &Uuid::new_v4().simple().to_string()[..8],
            extension_of(image.file_name.as_deref())
        );

        self.ensure_dir().await?;
        tokio::fs::write(self.dir.join(&file_name), &image.data).await?;

        tracing::debug!(file = %file_name, bytes = image.data.len(), "stored upload");
        Ok(format!("{}/{}", self.url_prefix, file_name))
    }

    /// Deletes a file previously returned by [`save`](Self::save).
    /// Paths outside the upload prefix are left alone.
    pub async fn remove(&self, public_path: &str) {
        let Some(file_name) = public_path
            .strip_prefix(&self.url_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return;
        };

        if file_name.is_empty() || file_name.contains('/') || file_name.contains("..") {
            return;
        }

        if let Err(e) = tokio::fs::remove_file(self.dir.join(file_name)).await {
            tracing::warn!(path = %public_path, error = %e, "failed to remove upload");
        }
    }
}

fn extension_of(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}
