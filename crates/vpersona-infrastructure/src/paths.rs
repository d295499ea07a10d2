//! Unified path management for vpersona files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/vpersona/          # Config directory
//! ├── config.toml              # Application configuration
//! └── secret.json              # API keys and tokens
//!
//! ~/.local/share/vpersona/     # Data directory
//! ├── persons/<project-id>/    # JSON person records (json_dir backend)
//! └── media/                   # Downloaded headshots
//! ```

use std::path::PathBuf;

use vpersona_core::error::{Result, VpError};

const APP_DIR: &str = "vpersona";

/// Path resolution for vpersona.
pub struct VpersonaPaths;

impl VpersonaPaths {
    /// Returns the configuration directory (e.g. `~/.config/vpersona/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| VpError::config("Cannot find config directory"))
    }

    /// Returns the data directory (e.g. `~/.local/share/vpersona/`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| VpError::config("Cannot find data directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn secret_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("secret.json"))
    }

    /// Default directory for downloaded headshots.
    pub fn media_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("media"))
    }
}
