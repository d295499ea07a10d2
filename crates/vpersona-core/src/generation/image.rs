//! Image generation and storage capabilities.

use crate::error::Result;

/// One image request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureRequest {
    pub query: String,
    /// Aspect ratio such as `"1:1"`
    pub aspect_ratio: String,
}

/// An image-generation backend.
#[async_trait::async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generates a picture and returns its (temporary) remote URL.
    ///
    /// `Ok(None)` means the backend answered without an image.
    async fn get_picture(&self, request: &PictureRequest) -> Result<Option<String>>;
}

/// Durable storage for generated images.
#[async_trait::async_trait]
pub trait ImageStorage: Send + Sync {
    /// Copies the image at `remote_url` into durable storage and returns the
    /// stored URL.
    async fn upload_from_url(&self, remote_url: &str) -> Result<String>;
}
