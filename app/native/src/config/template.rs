//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
///
/// This creates a JSONC file documenting every available option with its
/// default value.
#[must_use]
pub fn generate_config_template() -> String {
    r#"// DockAnchor Configuration File
// ============================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.
//
// Run `dockanchor displays` to list the fingerprints of attached displays.

{
  // Fingerprint of the display the Dock stays on. DockAnchor writes this
  // when an anchor is selected.
  // "anchor": "37D8832A-2D66-02CA-B9F7-8F30A301B230-SN16843009",

  // Display enforced while the anchor is disconnected or unset:
  // "builtIn" (built-in panel, else main display) or "mainDisplay".
  // "defaultAnchorPolicy": "builtIn",

  // Re-anchor to the main display whenever it changes.
  // "followMainDisplay": false,

  // Move the Dock back when the anchor display reconnects.
  // "autoRelocateOnReconnect": true,

  // Move the Dock as soon as a new anchor is selected.
  // "autoRelocateOnAnchorChange": true,

  // ============================================================================
  // Profiles
  // ============================================================================
  // While "whenConnected" is attached, anchor to "anchor" instead. The first
  // matching profile wins; it stays active until its display disconnects.
  // "profiles": [
  //   {
  //     "name": "presenting",
  //     "whenConnected": "9A1C2F44-6E0B-4D3C-8B7A-1F2E3D4C5B6A",
  //     "anchor": "37D8832A-2D66-02CA-B9F7-8F30A301B230"
  //   }
  // ],

  // ============================================================================
  // Relocation
  // ============================================================================
  // "relocation": {
  //   // Distance in points from the Dock edge where the approach starts
  //   "approachOffset": 100,
  //
  //   // Motion events posted on the way to the edge, and the delay between them
  //   "approachSteps": 12,
  //   "stepDelayMs": 10,
  //
  //   // Events posted while pressing against the edge, and the delay between them
  //   "holdSteps": 30,
  //   "holdDelayMs": 10,
  //
  //   // Wait after a display change before moving the Dock
  //   "settleDelayMs": 500
  // }
}
"#
    .to_string()
}

/// Creates a configuration file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DockAnchorConfig;

    #[test]
    fn test_template_parses_to_defaults() {
        let template = generate_config_template();
        let reader = json_comments::StripComments::new(template.as_bytes());
        let config: DockAnchorConfig = serde_json::from_reader(reader).unwrap();
        assert_eq!(config, DockAnchorConfig::default());
    }

    #[test]
    fn test_template_mentions_every_option() {
        let template = generate_config_template();
        for key in [
            "anchor",
            "defaultAnchorPolicy",
            "followMainDisplay",
            "autoRelocateOnReconnect",
            "autoRelocateOnAnchorChange",
            "profiles",
            "whenConnected",
            "approachOffset",
            "approachSteps",
            "stepDelayMs",
            "holdSteps",
            "holdDelayMs",
            "settleDelayMs",
        ] {
            assert!(template.contains(&format!("\"{key}\"")), "missing {key}");
        }
    }

    #[test]
    fn test_create_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dockanchor").join("config.jsonc");
        create_config_file(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), generate_config_template());
    }
}
