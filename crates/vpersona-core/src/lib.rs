//! Domain layer for vpersona.
//!
//! Holds the data model, the naming codec, prompt builders, response schemas
//! and the capability traits implemented by the infrastructure and
//! interaction crates.

pub mod config;
pub mod error;
pub mod generation;
pub mod naming;
pub mod person;
pub mod project;
pub mod prompt;
pub mod schema;
pub mod settings;

// Re-export common error type
pub use error::{Result, VpError};
