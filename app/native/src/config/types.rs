//! Configuration types for DockAnchor.
//!
//! This module provides the configuration types and loading functionality.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::APP_NAME;
use crate::display::Fingerprint;
use crate::reactor::{AnchorSettings, DefaultAnchorPolicy, ProfileRule};
use crate::relocation::RelocationTuning;

/// Tuning for the synthetic relocation sequence.
///
/// Defaults work for the stock Dock. Slower machines may need longer step
/// delays or more hold steps before the window server reacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct RelocationConfig {
    /// Distance in points from the Dock edge where the approach starts.
    pub approach_offset: u32,

    /// Number of interpolated motion events posted on the way to the edge.
    pub approach_steps: u32,

    /// Delay between approach events, in milliseconds.
    pub step_delay_ms: u64,

    /// Number of events posted while pressing against the edge.
    pub hold_steps: u32,

    /// Delay between hold events, in milliseconds.
    pub hold_delay_ms: u64,

    /// Wait after a display change before relocating, in milliseconds.
    pub settle_delay_ms: u64,
}

impl Default for RelocationConfig {
    fn default() -> Self {
        Self {
            approach_offset: 100,
            approach_steps: 12,
            step_delay_ms: 10,
            hold_steps: 30,
            hold_delay_ms: 10,
            settle_delay_ms: 500,
        }
    }
}

impl RelocationConfig {
    #[must_use]
    pub fn tuning(&self) -> RelocationTuning {
        RelocationTuning {
            approach_offset: f64::from(self.approach_offset),
            approach_steps: self.approach_steps,
            step_delay: Duration::from_millis(self.step_delay_ms),
            hold_steps: self.hold_steps,
            hold_delay: Duration::from_millis(self.hold_delay_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }
}

/// Auto-activation rule: while `whenConnected` is attached, anchor to `anchor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileConfig {
    /// Name shown in logs and status output.
    pub name: String,

    /// Fingerprint of the display that activates the profile.
    pub when_connected: Fingerprint,

    /// Fingerprint of the display to anchor to while the profile is active.
    pub anchor: Fingerprint,
}

impl From<&ProfileConfig> for ProfileRule {
    fn from(config: &ProfileConfig) -> Self {
        Self {
            name: config.name.clone(),
            when_connected: config.when_connected.clone(),
            anchor: config.anchor.clone(),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct DockAnchorConfig {
    /// Fingerprint of the display the Dock is anchored to.
    ///
    /// Written by DockAnchor when the anchor is selected. Use
    /// `dockanchor displays` to list the fingerprints of attached displays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Fingerprint>,

    /// Display enforced while the anchor is disconnected or unset.
    /// - `builtIn`: the built-in panel, else the main display. Default.
    /// - `mainDisplay`: the main display.
    pub default_anchor_policy: DefaultAnchorPolicy,

    /// Re-anchor to the main display whenever it changes.
    pub follow_main_display: bool,

    /// Move the Dock back when the anchor display reconnects.
    pub auto_relocate_on_reconnect: bool,

    /// Move the Dock immediately when a new anchor is selected.
    pub auto_relocate_on_anchor_change: bool,

    /// Profile auto-activation rules, first match wins.
    pub profiles: Vec<ProfileConfig>,

    /// Relocation sequence tuning.
    pub relocation: RelocationConfig,
}

impl Default for DockAnchorConfig {
    fn default() -> Self {
        Self {
            anchor: None,
            default_anchor_policy: DefaultAnchorPolicy::BuiltIn,
            follow_main_display: false,
            auto_relocate_on_reconnect: true,
            auto_relocate_on_anchor_change: true,
            profiles: Vec::new(),
            relocation: RelocationConfig::default(),
        }
    }
}

impl DockAnchorConfig {
    #[must_use]
    pub fn anchor_settings(&self) -> AnchorSettings {
        AnchorSettings {
            default_policy: self.default_anchor_policy,
            follow_main_display: self.follow_main_display,
            auto_relocate_on_reconnect: self.auto_relocate_on_reconnect,
            auto_relocate_on_anchor_change: self.auto_relocate_on_anchor_change,
            settle_delay: Duration::from_millis(self.relocation.settle_delay_ms),
        }
    }

    #[must_use]
    pub fn profile_rules(&self) -> Vec<ProfileRule> { self.profiles.iter().map(ProfileRule::from).collect() }
}

/// Errors that can occur when loading the configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    NotFound,
    /// The configuration file exists but could not be read or written.
    IoError(std::io::Error),
    /// The configuration file contains invalid JSON.
    ParseError(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(
                f,
                "No configuration file found. Expected at ~/.config/dockanchor/config.jsonc \
                or ~/Library/Application Support/dockanchor/config.jsonc"
            ),
            Self::IoError(err) => write!(f, "Failed to access configuration file: {err}"),
            Self::ParseError(err) => write!(f, "Failed to parse configuration file: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            Self::ParseError(err) => Some(err),
            Self::NotFound => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err) }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self { Self::ParseError(err) }
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/dockanchor/` when set
/// 2. `~/.config/dockanchor/`
/// 3. `~/Library/Application Support/dockanchor/` (macOS native)
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        roots.push(PathBuf::from(xdg_config).join(APP_NAME));
    }
    if let Some(home) = dirs::home_dir() {
        roots.push(home.join(".config").join(APP_NAME));
    }
    if let Some(config_dir) = dirs::config_dir() {
        roots.push(config_dir.join(APP_NAME));
    }

    let mut paths = Vec::with_capacity(roots.len() * CONFIG_FILE_NAMES.len());
    for dir in roots {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            // XDG_CONFIG_HOME may well be ~/.config
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }
    paths
}

/// Loads the configuration from the first existing default location.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of the expected locations.
/// Returns `ConfigError::IoError` if a configuration file exists but could not be read.
/// Returns `ConfigError::ParseError` if the configuration file contains invalid JSON.
pub fn load_config() -> Result<(DockAnchorConfig, PathBuf), ConfigError> {
    let path = config_paths().into_iter().find(|path| path.exists()).ok_or(ConfigError::NotFound)?;
    load_config_from_path(&path)
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist, otherwise
/// the same errors as [`load_config`].
pub fn load_config_from_path(path: &Path) -> Result<(DockAnchorConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    let config: DockAnchorConfig = serde_json::from_reader(reader)?;
    Ok((config, path.to_path_buf()))
}
