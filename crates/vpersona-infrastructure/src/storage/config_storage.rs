//! `config.toml` loading and saving.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use vpersona_core::config::AppConfig;
use vpersona_core::error::{Result, VpError};

use crate::paths::VpersonaPaths;

/// Access to `config.toml`.
///
/// A missing or empty file yields [`AppConfig::default`]. Saves go through a
/// temporary file and a rename so readers never see a partial file.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Uses the default path (`~/.config/vpersona/config.toml`).
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: VpersonaPaths::config_file()?,
        })
    }

    /// Uses a custom path (CLI `--config`, tests).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            tracing::debug!("No config file at {}, using defaults", self.path.display());
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }

        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| VpError::io(format!("{} has no parent directory", self.path.display())))?;
        fs::create_dir_all(parent)?;

        let content = toml::to_string_pretty(config)?;
        let tmp_path = self.path.with_extension("toml.tmp");
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(content.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        tracing::debug!("Saved config to {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
