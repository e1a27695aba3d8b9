use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use promptmix_core::{Config, Library};

use crate::errors::IoError;

/// Load a configuration from pretty-printed JSON.
pub fn load_config(path: &Path) -> Result<Config, IoError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Persist a configuration atomically (tmp file + fsync + rename).
pub fn save_config(path: &Path, config: &Config) -> Result<(), IoError> {
    let data = serde_json::to_vec_pretty(config)?;
    write_bytes_atomic(path, &data)
}

/// Merge newly introduced default libraries into a user configuration.
///
/// Appends defaults whose names the user config lacks; never overwrites
/// user libraries or global settings. Returns how many were added.
pub fn merge_default_libraries(config: &mut Config, defaults: &[Library]) -> usize {
    let mut added = 0;
    for default in defaults {
        if config.library(&default.name).is_none() {
            config.libraries.push(default.clone());
            added += 1;
        }
    }
    if added > 0 {
        info!(added, "merged new default libraries into config");
    }
    added
}

/// Write bytes through a temp file so readers never observe a torn file.
pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf, IoError> {
    let file_name = path.file_name().ok_or_else(|| {
        IoError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "invalid path for atomic write",
        ))
    })?;
    let tmp_name = format!("{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}
