//! Structured text generation capability.

use serde_json::Value;

use crate::error::Result;
use crate::schema::ResponseSchema;

/// One structured text request.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub prompt: String,
    /// Expected shape of the response
    pub response_format: ResponseSchema,
    pub max_tokens: Option<u32>,
}

impl TextRequest {
    pub fn new(prompt: impl Into<String>, response_format: ResponseSchema) -> Self {
        Self {
            prompt: prompt.into(),
            response_format,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A text-generation backend returning a JSON document.
///
/// Implementations ask the backend for `response_format` but callers still
/// validate the returned value with [`ResponseSchema::validate`].
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn request(&self, request: &TextRequest) -> Result<Value>;
}
