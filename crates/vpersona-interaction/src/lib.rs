//! AI backend adapters for vpersona.
//!
//! - [`OpenAiTextGenerator`]: structured (JSON Schema) chat completions
//! - [`OpenAiImageGenerator`]: headshot generation through the Images API

mod http;
pub mod openai_image_generator;
pub mod openai_text_generator;

pub use openai_image_generator::OpenAiImageGenerator;
pub use openai_text_generator::OpenAiTextGenerator;
