use std::path::PathBuf;

use anyhow::{Context, Result};
use vpersona_application::VirtualPersonGenerator;
use vpersona_core::project::Project;
use vpersona_infrastructure::{ConfigStorage, SecretStorage};

use crate::bootstrap::{build_services, generator_options};

pub struct GenerateArgs {
    pub website: String,
    pub project_id: String,
    pub owner_id: String,
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub config: Option<PathBuf>,
}

pub async fn run(args: GenerateArgs) -> Result<()> {
    let config_storage = match args.config {
        Some(path) => ConfigStorage::with_path(path),
        None => ConfigStorage::new()?,
    };
    let config = config_storage
        .load()
        .with_context(|| format!("Failed to load {}", config_storage.path().display()))?;
    tracing::debug!("Loaded config from {}", config_storage.path().display());

    let secrets = SecretStorage::new()?.load_with_env()?;
    let services = build_services(&config, &secrets)?;

    let project = Project::new(args.project_id, args.website, args.owner_id);
    let generator = VirtualPersonGenerator::new(
        services.text_generator,
        services.image_generator,
        services.image_storage,
        services.person_repository,
        project,
        generator_options(&config),
    );

    let min = args.min.unwrap_or(config.generation.min);
    let max = args.max.unwrap_or(config.generation.max);
    let report = generator.init(min, max).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
