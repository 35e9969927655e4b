//! Configuration module for sheetkb
//!
//! Handles loading and validating settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default locations searched for settings.yml, in order
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        PathBuf::from("/etc/sheetkb/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("sheetkb/settings.yml"));
    }
    paths
}

/// Load settings from an explicit path, `SHEETKB_SETTINGS_PATH`, or the
/// default locations, falling back to built-in defaults. Environment
/// overrides are applied and the result is validated.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let mut settings = match find_settings_file(explicit) {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(&path)?
        }
        None => {
            info!("No settings file found, using defaults");
            Settings::default()
        }
    };

    settings.merge_env();
    settings.validate()?;
    Ok(settings)
}

fn find_settings_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var("SHEETKB_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    default_paths().into_iter().find(|p| p.exists())
}
