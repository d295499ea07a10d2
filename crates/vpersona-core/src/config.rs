//! Configuration models.
//!
//! `AppConfig` mirrors `config.toml`, `SecretConfig` mirrors `secret.json`.
//! Loading lives in the infrastructure crate.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::settings::HeadshotSettings;

/// Root of `config.toml`. Every table is optional.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    /// `[headshot]` plus its `[headshot.image]` sub-table
    #[serde(default)]
    pub headshot: HeadshotSettings,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// `[generation]` table.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Lower bound (inclusive) of persons requested per run
    #[serde(default = "default_min")]
    pub min: usize,
    /// Upper bound (exclusive) of persons requested per run
    #[serde(default = "default_max")]
    pub max: usize,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Pause after each headshot request, `[low, high]` in milliseconds
    #[serde(default = "default_headshot_delay_ms")]
    pub headshot_delay_ms: [u64; 2],
}

fn default_min() -> usize {
    2
}

fn default_max() -> usize {
    5
}

fn default_headshot_delay_ms() -> [u64; 2] {
    [1500, 2500]
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            min: default_min(),
            max: default_max(),
            max_tokens: None,
            headshot_delay_ms: default_headshot_delay_ms(),
        }
    }
}

impl GenerationConfig {
    /// Delay range with the bounds ordered.
    pub fn headshot_delay(&self) -> RangeInclusive<u64> {
        let [a, b] = self.headshot_delay_ms;
        a.min(b)..=a.max(b)
    }
}

/// Which persistence adapter to use.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One JSON file per person under `data_dir`
    #[default]
    JsonDir,
    /// Remote REST data-access service
    Rest,
}

/// `[storage]` table.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root for JSON records; defaults to the platform data directory
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Base URL of the REST service (required for `backend = "rest"`)
    #[serde(default)]
    pub rest_url: Option<String>,
    #[serde(default = "default_rest_service")]
    pub rest_service: String,
    /// Directory receiving downloaded headshots
    #[serde(default)]
    pub media_dir: Option<PathBuf>,
    /// URL prefix under which `media_dir` is served
    #[serde(default)]
    pub public_base_url: Option<String>,
}

fn default_rest_service() -> String {
    "virtual-persons".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: None,
            rest_url: None,
            rest_service: default_rest_service(),
            media_dir: None,
            public_base_url: None,
        }
    }
}

/// Root of `secret.json`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecretConfig {
    #[serde(default)]
    pub openai: Option<OpenAiConfig>,
    #[serde(default)]
    pub rest: Option<RestSecret>,
}

/// OpenAI API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Credentials for the REST data-access service
#[derive(Debug, Clone, Deserialize)]
pub struct RestSecret {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{ImageBackend, PromptSource};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.generation.headshot_delay(), 1500..=2500);
        assert_eq!(config.storage.rest_service, "virtual-persons");
    }

    #[test]
    fn test_full_config() {
        let config: AppConfig = toml::from_str(
            r#"
[generation]
min = 3
max = 6
max_tokens = 800
headshot_delay_ms = [2500, 1500]

[headshot]
heading = "Our team"
prompt_source = { kind = "custom", text = "Portrait of {name}" }

[headshot.image]
backend = "dall_e2"
aspect_ratio = "16:9"

[storage]
backend = "rest"
rest_url = "https://api.acme.io"
"#,
        )
        .unwrap();

        assert_eq!(config.generation.min, 3);
        assert_eq!(config.generation.max_tokens, Some(800));
        assert_eq!(config.generation.headshot_delay(), 1500..=2500);
        assert_eq!(config.headshot.image.backend, ImageBackend::DallE2);
        assert_eq!(config.headshot.heading.as_deref(), Some("Our team"));
        assert!(!config.headshot.repeat);
        assert_eq!(
            config.headshot.prompt_source,
            PromptSource::Custom("Portrait of {name}".into())
        );
        assert_eq!(config.storage.backend, StorageBackend::Rest);
        assert_eq!(config.storage.rest_url.as_deref(), Some("https://api.acme.io"));
    }

    #[test]
    fn test_config_survives_toml_round_trip() {
        let mut config = AppConfig::default();
        config.headshot.repeat = true;
        config.headshot.prompt_source = PromptSource::Custom("Portrait of {name}".into());
        config.headshot.image.backend = ImageBackend::DallE2;

        let text = toml::to_string_pretty(&config).unwrap();
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_secret_config_parses_partial_file() {
        let secrets: SecretConfig =
            serde_json::from_str(r#"{ "openai": { "api_key": "sk-test" } }"#).unwrap();
        let openai = secrets.openai.unwrap();
        assert_eq!(openai.api_key, "sk-test");
        assert!(openai.model_name.is_none());
        assert!(secrets.rest.is_none());
    }
}
