use std::path::PathBuf;

use anyhow::Result;
use serde::de::DeserializeOwned;
use vpersona_core::settings::{
    HeadshotSettings, ImageBackend, ImageStyle, PromptSource, SettingsChange, SettingsUpdate,
};
use vpersona_infrastructure::ConfigStorage;

#[derive(Default)]
pub struct SettingsArgs {
    pub backend: Option<ImageBackend>,
    pub aspect_ratio: Option<String>,
    pub styles: Vec<ImageStyle>,
    pub heading: Option<String>,
    pub clear_heading: bool,
    pub repeat: Option<bool>,
    pub prompt: Option<String>,
    pub generated_prompt: bool,
    pub config: Option<PathBuf>,
}

/// Parses a snake_case identifier (`dall_e2`, `studio`) into a settings enum.
pub fn parse_identifier<T: DeserializeOwned>(raw: &str) -> std::result::Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| format!("unknown value '{raw}'"))
}

fn collect_updates(args: SettingsArgs) -> Vec<SettingsUpdate> {
    let mut updates = Vec::new();

    if let Some(backend) = args.backend {
        updates.push(SettingsUpdate::Backend(backend));
    }
    if let Some(ratio) = args.aspect_ratio {
        updates.push(SettingsUpdate::AspectRatio(ratio));
    }
    if !args.styles.is_empty() {
        updates.push(SettingsUpdate::Styles(args.styles));
    }
    if args.clear_heading {
        updates.push(SettingsUpdate::Heading(None));
    } else if let Some(heading) = args.heading {
        updates.push(SettingsUpdate::Heading(Some(heading)));
    }
    if let Some(repeat) = args.repeat {
        updates.push(SettingsUpdate::Repeat(repeat));
    }
    if args.generated_prompt {
        updates.push(SettingsUpdate::PromptSource(PromptSource::Generated));
    } else if let Some(prompt) = args.prompt {
        updates.push(SettingsUpdate::PromptSource(PromptSource::Custom(prompt)));
    }

    updates
}

/// Applies every update in order and returns the last change event, if any.
fn apply_updates(
    settings: &mut HeadshotSettings,
    updates: Vec<SettingsUpdate>,
) -> Option<SettingsChange> {
    updates
        .into_iter()
        .filter_map(|update| settings.apply(update))
        .last()
}

pub fn run(mut args: SettingsArgs) -> Result<()> {
    let storage = match args.config.take() {
        Some(path) => ConfigStorage::with_path(path),
        None => ConfigStorage::new()?,
    };
    let mut config = storage.load()?;

    match apply_updates(&mut config.headshot, collect_updates(args)) {
        Some(change) => {
            storage.save(&config)?;
            tracing::info!("Updated headshot settings in {}", storage.path().display());
            println!("{}", serde_json::to_string_pretty(&change)?);
        }
        None => {
            tracing::info!("Headshot settings unchanged");
            println!("{}", serde_json::to_string_pretty(&config.headshot)?);
        }
    }

    Ok(())
}
