//! Application layer for vpersona.
//!
//! Coordinates the domain capabilities (text generation, image generation,
//! image storage, persistence) into the virtual person generation pipeline.

pub mod virtual_person_generator;

pub use virtual_person_generator::{GenerationReport, GeneratorOptions, VirtualPersonGenerator};
