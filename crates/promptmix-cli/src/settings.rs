use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use promptmix_io::{IoError, write_bytes_atomic};

/// Settings file looked up next to the configuration.
pub const SETTINGS_FILE: &str = "promptmix.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("settings encode error: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("settings write error: {0}")]
    Write(#[from] IoError),
}

/// Optional per-project settings: a default seed for reproducible runs and
/// a default run directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_dir: Option<PathBuf>,
}

/// Load settings from `promptmix.toml` in `dir`, defaulting when absent.
pub fn load_settings(dir: &Path) -> Result<Settings, SettingsError> {
    let path = dir.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(&path)?;
    Ok(toml::from_str(&content)?)
}

/// Persist settings atomically beside the configuration.
pub fn save_settings(dir: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let encoded = toml::to_string_pretty(settings)?;
    write_bytes_atomic(&dir.join(SETTINGS_FILE), encoded.as_bytes())?;
    Ok(())
}
