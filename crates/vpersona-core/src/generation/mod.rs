//! Generation capabilities.
//!
//! # Module Structure
//!
//! - `request`: the per-invocation candidate count
//! - `text`: structured text generation
//! - `image`: image generation and durable image storage

mod image;
mod request;
mod text;

pub use image::{ImageGenerator, ImageStorage, PictureRequest};
pub use request::GenerationRequest;
pub use text::{TextGenerator, TextRequest};
