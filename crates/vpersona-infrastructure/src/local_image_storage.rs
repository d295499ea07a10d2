//! Durable headshot storage on the local file system.
//!
//! Image backends hand out short-lived URLs. The image is downloaded into the
//! media directory and served from `public_base_url` (or as a `file://` URL).

use std::path::{Path, PathBuf};

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio::fs;
use url::Url;
use uuid::Uuid;
use vpersona_core::error::{Result, VpError};
use vpersona_core::generation::ImageStorage;

/// Downloads remote images into a local media directory.
pub struct LocalImageStorage {
    client: Client,
    media_dir: PathBuf,
    public_base_url: Option<String>,
}

impl LocalImageStorage {
    pub fn new(media_dir: impl AsRef<Path>) -> Self {
        Self {
            client: Client::new(),
            media_dir: media_dir.as_ref().to_path_buf(),
            public_base_url: None,
        }
    }

    /// URL prefix under which the media directory is served.
    pub fn with_public_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.public_base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    async fn stored_url(&self, file_name: &str, path: &Path) -> Result<String> {
        if let Some(base) = &self.public_base_url {
            return Ok(format!("{base}/{file_name}"));
        }

        let absolute = fs::canonicalize(path).await?;
        let url = Url::from_file_path(&absolute)
            .map_err(|_| VpError::io(format!("Cannot express {} as a URL", absolute.display())))?;
        Ok(url.to_string())
    }
}

/// Stable file name for a source URL: the same image is never stored twice.
fn file_name_for(remote_url: &str, content_type: Option<&str>) -> String {
    let stem = Uuid::new_v5(&Uuid::NAMESPACE_URL, remote_url.as_bytes());
    let extension = match content_type.map(|ct| ct.split(';').next().unwrap_or("").trim()) {
        Some("image/jpeg") | Some("image/jpg") => "jpg",
        Some("image/webp") => "webp",
        Some("image/gif") => "gif",
        _ => "png",
    };
    format!("{stem}.{extension}")
}

#[async_trait::async_trait]
impl ImageStorage for LocalImageStorage {
    async fn upload_from_url(&self, remote_url: &str) -> Result<String> {
        let response = self.client.get(remote_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VpError::Http {
                status: Some(status.as_u16()),
                message: format!("Image download failed for {remote_url}"),
                retryable: status.is_server_error(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(VpError::generation(format!(
                "Image download returned no data for {remote_url}"
            )));
        }

        fs::create_dir_all(&self.media_dir).await?;
        let file_name = file_name_for(remote_url, content_type.as_deref());
        let path = self.media_dir.join(&file_name);
        fs::write(&path, &bytes).await?;

        tracing::debug!("Stored {} bytes at {}", bytes.len(), path.display());
        self.stored_url(&file_name, &path).await
    }
}
