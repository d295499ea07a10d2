//! Storage layer for configuration and secret files.

mod config_storage;
mod secret_storage;

pub use config_storage::ConfigStorage;
pub use secret_storage::{SecretStorage, SecretStorageError};
