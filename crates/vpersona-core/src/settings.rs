//! Image-generation settings.
//!
//! `HeadshotSettings` is the settings object an operator edits to choose the
//! image backend and its parameters. It is stored as the `[headshot]` table of
//! `config.toml`, edited through `apply` and read once at pipeline
//! construction.

use serde::{Deserialize, Serialize};

/// Supported image-generation backends.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageBackend {
    /// OpenAI DALL·E 3
    #[default]
    DallE3,
    /// OpenAI DALL·E 2
    DallE2,
}

impl ImageBackend {
    /// Model identifier sent to the backend API.
    pub fn model_name(&self) -> &'static str {
        match self {
            ImageBackend::DallE3 => "dall-e-3",
            ImageBackend::DallE2 => "dall-e-2",
        }
    }
}

/// Style identifiers accepted by the image backends.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ImageStyle {
    Vivid,
    Natural,
    Photographic,
    Cinematic,
    Studio,
}

impl ImageStyle {
    /// Descriptor appended to the prompt when the backend has no native style switch.
    pub fn descriptor(&self) -> &'static str {
        match self {
            ImageStyle::Vivid => "vivid colors",
            ImageStyle::Natural => "natural look",
            ImageStyle::Photographic => "photographic",
            ImageStyle::Cinematic => "cinematic lighting",
            ImageStyle::Studio => "studio portrait lighting",
        }
    }
}

/// Backend choice plus backend parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageGenerationSettings {
    #[serde(default)]
    pub backend: ImageBackend,
    /// Aspect ratio such as `"1:1"` or `"16:9"`
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
    #[serde(default)]
    pub styles: Vec<ImageStyle>,
}

fn default_aspect_ratio() -> String {
    "1:1".to_string()
}

impl Default for ImageGenerationSettings {
    fn default() -> Self {
        Self {
            backend: ImageBackend::default(),
            aspect_ratio: default_aspect_ratio(),
            styles: Vec::new(),
        }
    }
}

/// Where the image prompt comes from.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum PromptSource {
    /// Built from the person (headshot template)
    #[default]
    Generated,
    /// Operator-supplied prompt
    Custom(String),
}

/// The full settings object, including the sibling fields edited next to the
/// backend choice. `heading` and `repeat` belong to the form that embeds the
/// headshot block; they are stored and echoed in change events only.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct HeadshotSettings {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub repeat: bool,
    #[serde(default)]
    pub prompt_source: PromptSource,
    #[serde(default)]
    pub image: ImageGenerationSettings,
}

/// Emitted when an edit actually changed the settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsChange {
    pub settings: HeadshotSettings,
}

/// A single operator edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsUpdate {
    Backend(ImageBackend),
    AspectRatio(String),
    Styles(Vec<ImageStyle>),
    Heading(Option<String>),
    Repeat(bool),
    PromptSource(PromptSource),
}

impl HeadshotSettings {
    /// Applies an edit and returns the change event carrying the whole updated
    /// settings object, or `None` when the edit left everything as it was.
    pub fn apply(&mut self, update: SettingsUpdate) -> Option<SettingsChange> {
        let before = self.clone();

        match update {
            SettingsUpdate::Backend(backend) => self.image.backend = backend,
            SettingsUpdate::AspectRatio(ratio) => self.image.aspect_ratio = ratio,
            SettingsUpdate::Styles(styles) => self.image.styles = styles,
            SettingsUpdate::Heading(heading) => self.heading = heading,
            SettingsUpdate::Repeat(repeat) => self.repeat = repeat,
            SettingsUpdate::PromptSource(source) => self.prompt_source = source,
        }

        (before != *self).then(|| SettingsChange {
            settings: self.clone(),
        })
    }
}
