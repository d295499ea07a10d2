//! OpenAiTextGenerator - structured output over the OpenAI Chat Completions API.
//!
//! The response schema is sent as `response_format: json_schema` in strict
//! mode; the returned message content is parsed as JSON. Conformance is
//! checked by the caller against the same schema.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vpersona_core::config::OpenAiConfig;
use vpersona_core::error::{Result, VpError};
use vpersona_core::generation::{TextGenerator, TextRequest};
use vpersona_core::schema::ResponseSchema;

use crate::http::{map_http_error, request_failed};

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
const BASE_URL: &str = "https://api.openai.com/v1";

/// Text generator that talks to the OpenAI HTTP API.
#[derive(Clone)]
pub struct OpenAiTextGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiTextGenerator {
    /// Creates a new generator with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Builds a generator from `secret.json` settings; the model defaults to `gpt-4o`.
    pub fn from_config(config: &OpenAiConfig) -> Self {
        let model = config
            .model_name
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into());
        Self::new(config.api_key.clone(), model)
    }

    /// Overrides the API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn send_request(&self, body: &ChatCompletionRequest<'_>) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| request_failed("OpenAI chat", err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            VpError::generation(format!("Failed to parse OpenAI response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    async fn request(&self, request: &TextRequest) -> Result<Value> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
            response_format: ResponseFormat::json_schema(&request.response_format),
        };

        tracing::debug!(
            "OpenAI chat request (model={}, schema={})",
            self.model,
            request.response_format.name
        );
        let content = self.send_request(&body).await?;

        serde_json::from_str(&content).map_err(|err| {
            VpError::schema(
                &request.response_format.name,
                format!("response is not valid JSON: {err}"),
            )
        })
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    r#type: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a Value,
}

impl<'a> ResponseFormat<'a> {
    fn json_schema(schema: &'a ResponseSchema) -> Self {
        Self {
            r#type: "json_schema",
            json_schema: JsonSchemaFormat {
                name: &schema.name,
                strict: true,
                schema: &schema.schema,
            },
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| VpError::generation("OpenAI API returned no choices"))?;

    if let Some(refusal) = message.refusal {
        return Err(VpError::generation(format!("OpenAI refused the request: {refusal}")));
    }

    message
        .content
        .ok_or_else(|| VpError::generation("OpenAI API returned no content in the response"))
}
