//! Wires configuration and secrets into the generator's collaborators.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use vpersona_application::GeneratorOptions;
use vpersona_core::config::{AppConfig, SecretConfig, StorageBackend};
use vpersona_core::generation::{ImageGenerator, ImageStorage, TextGenerator};
use vpersona_core::person::VirtualPersonRepository;
use vpersona_infrastructure::{
    JsonDirPersonRepository, LocalImageStorage, RestPersonRepository, VpersonaPaths,
};
use vpersona_interaction::{OpenAiImageGenerator, OpenAiTextGenerator};

/// Backends resolved for one run.
pub struct Services {
    pub text_generator: Arc<dyn TextGenerator>,
    pub image_generator: Arc<dyn ImageGenerator>,
    pub image_storage: Arc<dyn ImageStorage>,
    pub person_repository: Arc<dyn VirtualPersonRepository>,
}

pub fn build_services(config: &AppConfig, secrets: &SecretConfig) -> Result<Services> {
    let openai = secrets.openai.as_ref().ok_or_else(|| {
        anyhow!("OpenAI API key not configured. Add it to secret.json or set OPENAI_API_KEY")
    })?;

    let text_generator = OpenAiTextGenerator::from_config(openai);
    let image_generator =
        OpenAiImageGenerator::new(openai.api_key.clone(), config.headshot.image.clone())
            .context("Invalid [headshot.image] settings")?;

    Ok(Services {
        text_generator: Arc::new(text_generator),
        image_generator: Arc::new(image_generator),
        image_storage: build_image_storage(config)?,
        person_repository: build_person_repository(config, secrets)?,
    })
}

fn build_person_repository(
    config: &AppConfig,
    secrets: &SecretConfig,
) -> Result<Arc<dyn VirtualPersonRepository>> {
    let storage = &config.storage;
    match storage.backend {
        StorageBackend::JsonDir => {
            let repository = match &storage.data_dir {
                Some(dir) => JsonDirPersonRepository::new(dir),
                None => JsonDirPersonRepository::default_location()?,
            };
            Ok(Arc::new(repository))
        }
        StorageBackend::Rest => {
            let url = storage
                .rest_url
                .as_deref()
                .ok_or_else(|| anyhow!("[storage].rest_url is required for the rest backend"))?;
            let mut repository = RestPersonRepository::new(url, storage.rest_service.clone());
            if let Some(rest) = &secrets.rest {
                repository = repository.with_token(rest.token.clone());
            }
            Ok(Arc::new(repository))
        }
    }
}

fn build_image_storage(config: &AppConfig) -> Result<Arc<dyn ImageStorage>> {
    let media_dir = match &config.storage.media_dir {
        Some(dir) => dir.clone(),
        None => VpersonaPaths::media_dir()?,
    };

    let mut storage = LocalImageStorage::new(media_dir);
    if let Some(base_url) = &config.storage.public_base_url {
        storage = storage.with_public_base_url(base_url.clone());
    }
    Ok(Arc::new(storage))
}

pub fn generator_options(config: &AppConfig) -> GeneratorOptions {
    GeneratorOptions {
        max_tokens: config.generation.max_tokens,
        headshot_delay_ms: config.generation.headshot_delay(),
        aspect_ratio: config.headshot.image.aspect_ratio.clone(),
        prompt_source: config.headshot.prompt_source.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vpersona_core::config::{OpenAiConfig, RestSecret};
    use vpersona_core::settings::PromptSource;

    fn secrets() -> SecretConfig {
        SecretConfig {
            openai: Some(OpenAiConfig {
                api_key: "sk-test".into(),
                model_name: None,
            }),
            rest: None,
        }
    }

    fn local_config(dir: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.data_dir = Some(dir.join("data"));
        config.storage.media_dir = Some(dir.join("media"));
        config
    }

    #[test]
    fn test_missing_api_key_is_reported() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let err = build_services(&local_config(temp_dir.path()), &SecretConfig::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_builds_local_services() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        assert!(build_services(&local_config(temp_dir.path()), &secrets()).is_ok());
    }

    #[test]
    fn test_rest_backend_requires_url() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = local_config(temp_dir.path());
        config.storage.backend = StorageBackend::Rest;
        assert!(build_services(&config, &secrets()).is_err());

        config.storage.rest_url = Some("https://api.example.com".into());
        let mut with_token = secrets();
        with_token.rest = Some(RestSecret {
            token: "t".into(),
        });
        assert!(build_services(&config, &with_token).is_ok());
    }

    #[test]
    fn test_unsupported_aspect_ratio_fails_early() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = local_config(temp_dir.path());
        config.headshot.image.aspect_ratio = "5:4".into();
        assert!(build_services(&config, &secrets()).is_err());
    }

    #[test]
    fn test_generator_options_follow_config() {
        let mut config = AppConfig::default();
        config.generation.max_tokens = Some(256);
        config.generation.headshot_delay_ms = [900, 100];
        let options = generator_options(&config);
        assert_eq!(options.max_tokens, Some(256));
        assert_eq!(options.headshot_delay_ms, 100..=900);
        assert_eq!(options.aspect_ratio, "1:1");
        assert_eq!(options.prompt_source, PromptSource::Generated);

        config.headshot.prompt_source = PromptSource::Custom("Portrait of {name}".into());
        assert_eq!(
            generator_options(&config).prompt_source,
            PromptSource::Custom("Portrait of {name}".into())
        );
    }
}
