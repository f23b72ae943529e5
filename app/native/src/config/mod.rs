//! Configuration module for DockAnchor.
//!
//! This module provides configuration types, loading and saving, and file
//! watching for hot-reloading configuration changes.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.
//! Writing the anchor back re-serializes the file as plain JSON, so comments
//! do not survive the first anchor change.

pub mod template;
pub mod types;
mod watcher;

use std::fs;
use std::path::{Path, PathBuf};

pub use types::{
    ConfigError, DockAnchorConfig, ProfileConfig, RelocationConfig, config_paths, load_config,
    load_config_from_path,
};
pub use watcher::watch_config_file;

use crate::display::Fingerprint;

/// Loads the configuration from `custom` or the default search paths.
///
/// Returns the loaded configuration and its path, or a default
/// configuration if loading fails. If no configuration file exists, a
/// template is created at the preferred location.
#[must_use]
pub fn load_or_default(custom: Option<&Path>) -> (DockAnchorConfig, Option<PathBuf>) {
    let result = custom.map_or_else(load_config, load_config_from_path);

    match result {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "loaded configuration");
            (config, Some(path))
        }
        Err(ConfigError::NotFound) => {
            let path = custom.map(Path::to_path_buf).or_else(create_default_config_file);
            (DockAnchorConfig::default(), path)
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to load configuration, using defaults");
            (DockAnchorConfig::default(), custom.map(Path::to_path_buf))
        }
    }
}

/// Creates a template configuration file at the default location.
fn create_default_config_file() -> Option<PathBuf> {
    let Some(config_path) = config_paths().into_iter().next() else {
        tracing::debug!("no config path available for creating template");
        return None;
    };

    if config_path.exists() {
        return Some(config_path);
    }

    match template::create_config_file(&config_path) {
        Ok(()) => {
            tracing::info!(path = %config_path.display(), "created default configuration file");
            Some(config_path)
        }
        Err(err) => {
            tracing::debug!(
                error = %err,
                path = %config_path.display(),
                "failed to create default configuration file"
            );
            None
        }
    }
}

/// Writes `anchor` into the configuration file at `path`.
///
/// Other keys, including ones this version does not know, are kept.
///
/// # Errors
///
/// Returns `ConfigError::IoError` if the file cannot be read or written and
/// `ConfigError::ParseError` if its current contents are not valid JSONC.
pub fn persist_anchor(path: &Path, anchor: Option<&Fingerprint>) -> Result<(), ConfigError> {
    let mut document = if path.exists() {
        let file = fs::File::open(path)?;
        serde_json::from_reader(json_comments::StripComments::new(file))?
    } else {
        serde_json::Value::Object(serde_json::Map::new())
    };

    let serde_json::Value::Object(fields) = &mut document else {
        return Err(ConfigError::ParseError(serde::de::Error::custom(
            "configuration root must be an object",
        )));
    };

    match anchor {
        Some(anchor) => fields.insert("anchor".to_string(), serde_json::Value::from(anchor.as_str())),
        None => fields.remove("anchor"),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut contents = serde_json::to_string_pretty(&document)?;
    contents.push('\n');
    fs::write(path, contents)?;

    tracing::info!(path = %path.display(), anchor = ?anchor.map(Fingerprint::as_str), "persisted anchor");
    Ok(())
}
