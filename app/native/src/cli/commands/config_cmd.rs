//! Config CLI commands.
//!
//! Commands for managing the DockAnchor configuration file.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{DockAnchorConfig, config_paths};
use crate::error::AnchorError;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Initialize a new configuration file with all options documented.
    ///
    /// Creates a new configuration file at the default location with all
    /// available options commented out.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  dockanchor config init              # Create config at default location
  dockanchor config init --force      # Overwrite existing config
  dockanchor config init --path ~/my-config.jsonc  # Create at custom path
  dockanchor config init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite existing configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        /// If not specified, uses ~/.config/dockanchor/config.jsonc
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the configuration template to stdout instead of writing to a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Show the path to the configuration file.
    ///
    /// Displays the paths where DockAnchor looks for configuration files,
    /// and indicates which one is currently in use (if any).
    Path,

    /// Print the JSON Schema of the configuration file.
    Schema,
}

/// Execute config subcommands.
///
/// `custom` is the global `--config` path, used by `path` to mark the active
/// file and by `init` when no `--path` is given.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cmd: &ConfigCommands, custom: Option<&Path>) -> Result<(), AnchorError> {
    match cmd {
        ConfigCommands::Init { force, path, stdout } => {
            if *stdout {
                println!("{}", generate_config_template());
                Ok(())
            } else {
                init_config(*force, path.as_deref().or(custom))
            }
        }
        ConfigCommands::Path => {
            show_config_path(custom);
            Ok(())
        }
        ConfigCommands::Schema => print_schema(),
    }
}

/// Initialize a new configuration file.
fn init_config(force: bool, custom_path: Option<&Path>) -> Result<(), AnchorError> {
    let config_path = custom_path.map_or_else(
        || config_paths().into_iter().next().unwrap_or_else(|| PathBuf::from("config.jsonc")),
        Path::to_path_buf,
    );

    if config_path.exists() && !force {
        return Err(AnchorError::ConfigError(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    create_config_file(&config_path).map_err(|e| {
        AnchorError::ConfigError(format!(
            "Failed to create config file {}: {e}",
            config_path.display()
        ))
    })?;

    println!("Configuration file created at: {}", config_path.display());
    println!("\nAll options are commented out by default.");
    println!("Run 'dockanchor displays' to find the fingerprint of your anchor display.");

    Ok(())
}

/// Lists the search paths, marking the one in use.
fn show_config_path(custom: Option<&Path>) {
    if let Some(path) = custom {
        let marker = if path.exists() { " (active)" } else { " (missing)" };
        println!("Configuration file (from --config):\n\n  {}{marker}", path.display());
        return;
    }

    println!("Configuration file search paths (in priority order):\n");

    let mut found_config = false;
    for (i, path) in config_paths().iter().enumerate() {
        let exists = path.exists();
        let marker = if exists && !found_config {
            found_config = true;
            " (active)"
        } else if exists {
            " (exists)"
        } else {
            ""
        };

        println!("  {}. {}{}", i + 1, path.display(), marker);
    }

    if !found_config {
        println!("\nNo configuration file found.");
        println!("Run 'dockanchor config init' to create one.");
    }
}

fn print_schema() -> Result<(), AnchorError> {
    let schema = schemars::schema_for!(DockAnchorConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
