//! Secret configuration file storage.
//!
//! Loads API keys from `~/.config/vpersona/secret.json`, falling back to
//! environment variables for the OpenAI key.

use std::env;
use std::fs;
use std::path::PathBuf;

use vpersona_core::config::{OpenAiConfig, SecretConfig};

use crate::paths::VpersonaPaths;

/// Errors that can occur during secret storage operations.
#[derive(Debug)]
pub enum SecretStorageError {
    /// Configuration file not found.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing error.
    ParseError(serde_json::Error),
    /// Config directory not found.
    ConfigDirNotFound,
}

impl std::fmt::Display for SecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretStorageError::NotFound(path) => {
                write!(f, "Secret file not found at: {}", path.display())
            }
            SecretStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            SecretStorageError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            SecretStorageError::ConfigDirNotFound => {
                write!(f, "Could not determine config directory")
            }
        }
    }
}

impl std::error::Error for SecretStorageError {}

impl From<std::io::Error> for SecretStorageError {
    fn from(e: std::io::Error) -> Self {
        SecretStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for SecretStorageError {
    fn from(e: serde_json::Error) -> Self {
        SecretStorageError::ParseError(e)
    }
}

/// Storage for `secret.json`.
///
/// Read-only; secrets are never logged. The file should be mode 600.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates a storage for the default path (`~/.config/vpersona/secret.json`).
    pub fn new() -> Result<Self, SecretStorageError> {
        let path = VpersonaPaths::secret_file().map_err(|_| SecretStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    /// Creates a storage with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads and parses the secret file.
    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        if !self.path.exists() {
            return Err(SecretStorageError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&content)?;

        Ok(config)
    }

    /// Loads the secret file, filling the OpenAI entry from `OPENAI_API_KEY` /
    /// `OPENAI_MODEL_NAME` when the file has none.
    ///
    /// A missing file is not an error here; a malformed one is.
    pub fn load_with_env(&self) -> Result<SecretConfig, SecretStorageError> {
        let mut config = match self.load() {
            Ok(config) => config,
            Err(SecretStorageError::NotFound(_)) => SecretConfig::default(),
            Err(e) => return Err(e),
        };

        if config.openai.is_none() {
            if let Ok(api_key) = env::var("OPENAI_API_KEY") {
                config.openai = Some(OpenAiConfig {
                    api_key,
                    model_name: env::var("OPENAI_MODEL_NAME").ok(),
                });
            }
        }

        Ok(config)
    }

    /// Returns the path to the secret file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("secret.json");
        let storage = SecretStorage::with_path(file_path.clone());

        match storage.load() {
            Err(SecretStorageError::NotFound(path)) => assert_eq!(path, file_path),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_load_valid_json() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("secret.json");

        let json_content = r#"{
            "openai": {
                "api_key": "test-key-123",
                "model_name": "gpt-4o-mini"
            },
            "rest": { "token": "t0k" }
        }"#;
        fs::write(&file_path, json_content).unwrap();

        let config = SecretStorage::with_path(file_path).load().unwrap();

        let openai = config.openai.unwrap();
        assert_eq!(openai.api_key, "test-key-123");
        assert_eq!(openai.model_name, Some("gpt-4o-mini".to_string()));
        assert_eq!(config.rest.unwrap().token, "t0k");
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("secret.json");
        fs::write(&file_path, r#"{ invalid json"#).unwrap();

        let storage = SecretStorage::with_path(file_path);
        assert!(matches!(storage.load(), Err(SecretStorageError::ParseError(_))));
        assert!(matches!(
            storage.load_with_env(),
            Err(SecretStorageError::ParseError(_))
        ));
    }

    #[test]
    fn test_file_entry_wins_over_env() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("secret.json");
        fs::write(&file_path, r#"{ "openai": { "api_key": "from-file" } }"#).unwrap();

        let config = SecretStorage::with_path(file_path).load_with_env().unwrap();
        assert_eq!(config.openai.unwrap().api_key, "from-file");
    }
}
