//! OpenAiImageGenerator - headshots through the OpenAI Images API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use vpersona_core::error::{Result, VpError};
use vpersona_core::generation::{ImageGenerator, PictureRequest};
use vpersona_core::settings::{ImageBackend, ImageGenerationSettings, ImageStyle};

use crate::http::{map_http_error, request_failed};

const BASE_URL: &str = "https://api.openai.com/v1";

/// Image generator configured from [`ImageGenerationSettings`].
#[derive(Clone)]
pub struct OpenAiImageGenerator {
    client: Client,
    api_key: String,
    settings: ImageGenerationSettings,
    base_url: String,
}

impl OpenAiImageGenerator {
    /// Creates a generator; fails when the configured aspect ratio is not
    /// supported by the configured backend.
    pub fn new(api_key: impl Into<String>, settings: ImageGenerationSettings) -> Result<Self> {
        image_size(settings.backend, &settings.aspect_ratio)?;
        Ok(Self {
            client: Client::new(),
            api_key: api_key.into(),
            settings,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Overrides the API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn settings(&self) -> &ImageGenerationSettings {
        &self.settings
    }

    fn build_request<'a>(&'a self, request: &PictureRequest) -> Result<ImageRequest<'a>> {
        let backend = self.settings.backend;
        let size = image_size(backend, &request.aspect_ratio)?;

        // DALL·E 3 has a native vivid/natural switch; everything else goes into the prompt
        let native_style = match backend {
            ImageBackend::DallE3 => self.settings.styles.iter().find_map(|style| match style {
                ImageStyle::Vivid => Some("vivid"),
                ImageStyle::Natural => Some("natural"),
                _ => None,
            }),
            ImageBackend::DallE2 => None,
        };

        let descriptors: Vec<&str> = self
            .settings
            .styles
            .iter()
            .filter(|style| {
                native_style.is_none() || !matches!(style, ImageStyle::Vivid | ImageStyle::Natural)
            })
            .map(ImageStyle::descriptor)
            .collect();

        let prompt = if descriptors.is_empty() {
            request.query.clone()
        } else {
            format!("{}, {}", request.query, descriptors.join(", "))
        };

        Ok(ImageRequest {
            model: backend.model_name(),
            prompt,
            n: 1,
            size,
            style: native_style,
            response_format: "url",
        })
    }
}

/// Maps an aspect ratio onto a size supported by the backend.
fn image_size(backend: ImageBackend, aspect_ratio: &str) -> Result<&'static str> {
    let size = match (backend, aspect_ratio.trim()) {
        (_, "1:1") => Some("1024x1024"),
        (ImageBackend::DallE3, "16:9" | "3:2") => Some("1792x1024"),
        (ImageBackend::DallE3, "9:16" | "2:3") => Some("1024x1792"),
        _ => None,
    };

    size.ok_or_else(|| {
        VpError::config(format!(
            "Aspect ratio '{}' is not supported by {}",
            aspect_ratio,
            backend.model_name()
        ))
    })
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn get_picture(&self, request: &PictureRequest) -> Result<Option<String>> {
        let body = self.build_request(request)?;
        tracing::debug!("OpenAI image request (model={}, size={})", body.model, body.size);

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| request_failed("OpenAI images", err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ImageResponse = response.json().await.map_err(|err| {
            VpError::generation(format!("Failed to parse OpenAI image response: {err}"))
        })?;

        Ok(parsed.data.into_iter().find_map(|image| image.url))
    }
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'static str,
    prompt: String,
    n: u8,
    size: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<&'a str>,
    response_format: &'static str,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(backend: ImageBackend, styles: Vec<ImageStyle>) -> ImageGenerationSettings {
        ImageGenerationSettings {
            backend,
            aspect_ratio: "1:1".into(),
            styles,
        }
    }

    fn picture(query: &str, aspect_ratio: &str) -> PictureRequest {
        PictureRequest {
            query: query.into(),
            aspect_ratio: aspect_ratio.into(),
        }
    }

    #[test]
    fn test_size_mapping() {
        assert_eq!(image_size(ImageBackend::DallE3, "1:1").unwrap(), "1024x1024");
        assert_eq!(image_size(ImageBackend::DallE3, "16:9").unwrap(), "1792x1024");
        assert_eq!(image_size(ImageBackend::DallE3, "2:3").unwrap(), "1024x1792");
        assert!(image_size(ImageBackend::DallE2, "16:9").unwrap_err().is_config());
        assert!(image_size(ImageBackend::DallE3, "4:5").unwrap_err().is_config());
    }

    #[test]
    fn test_new_rejects_unsupported_ratio() {
        let mut s = settings(ImageBackend::DallE2, vec![]);
        s.aspect_ratio = "9:16".into();
        assert!(OpenAiImageGenerator::new("k", s).is_err());
    }

    #[test]
    fn test_native_style_and_descriptors() {
        let generator = OpenAiImageGenerator::new(
            "k",
            settings(ImageBackend::DallE3, vec![ImageStyle::Studio, ImageStyle::Natural]),
        )
        .unwrap();
        let body = generator.build_request(&picture("Photo", "1:1")).unwrap();
        assert_eq!(body.style, Some("natural"));
        assert_eq!(body.prompt, "Photo, studio portrait lighting");
        assert_eq!(body.model, "dall-e-3");
    }

    #[test]
    fn test_dalle2_puts_all_styles_in_prompt() {
        let generator =
            OpenAiImageGenerator::new("k", settings(ImageBackend::DallE2, vec![ImageStyle::Vivid]))
                .unwrap();
        let body = generator.build_request(&picture("Photo", "1:1")).unwrap();
        assert_eq!(body.style, None);
        assert_eq!(body.prompt, "Photo, vivid colors");
        assert_eq!(body.model, "dall-e-2");
    }

    #[tokio::test]
    async fn test_get_picture_returns_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(body_partial_json(json!({
                "model": "dall-e-3",
                "prompt": "Photo headshot for the Jane Doe, Aged 30-40 years old.",
                "size": "1024x1024",
                "n": 1
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "created": 1,
                "data": [{ "url": "https://img.example/jane.png", "revised_prompt": "..." }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generator = OpenAiImageGenerator::new("k", ImageGenerationSettings::default())
            .unwrap()
            .with_base_url(server.uri());
        let url = generator
            .get_picture(&picture("Photo headshot for the Jane Doe, Aged 30-40 years old.", "1:1"))
            .await
            .unwrap();
        assert_eq!(url.as_deref(), Some("https://img.example/jane.png"));
    }

    #[tokio::test]
    async fn test_get_picture_without_data_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "created": 1, "data": [] })))
            .mount(&server)
            .await;

        let generator = OpenAiImageGenerator::new("k", ImageGenerationSettings::default())
            .unwrap()
            .with_base_url(server.uri());
        let url = generator.get_picture(&picture("Photo", "1:1")).await.unwrap();
        assert!(url.is_none());
    }
}
