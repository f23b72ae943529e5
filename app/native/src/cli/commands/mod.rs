//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments, organized into
//! domain-specific submodules:
//!
//! - `config_cmd` - Configuration file commands
//! - `displays` - Display listing
//! - `run` - The monitoring daemon and one-shot Dock commands

use std::io;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::constants::APP_NAME;
use crate::error::AnchorError;

pub mod config_cmd;
pub mod displays;
pub mod run;

pub use config_cmd::ConfigCommands;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// DockAnchor - keeps the macOS Dock on one display.
#[derive(Parser, Debug)]
#[command(name = "dockanchor")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug output. `DOCKANCHOR_LOG` takes precedence when set.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Keep the Dock anchored (default).
    ///
    /// Starts intercepting edge triggers on every display except the anchor,
    /// follows display changes, and reloads the configuration file when it
    /// changes. Runs until interrupted.
    Run,

    /// List attached displays and their fingerprints.
    Displays {
        /// Output as JSON.
        #[arg(long, short)]
        json: bool,
    },

    /// Move the Dock to the anchor display once and exit.
    Relocate,

    /// Select the anchor display and save it to the configuration file.
    ///
    /// If the display is not attached, the default display is used instead
    /// and saved in its place.
    Anchor {
        /// Fingerprint of the display, as shown by `dockanchor displays`.
        #[arg(value_name = "FINGERPRINT")]
        fingerprint: String,
    },

    /// Configuration file management commands.
    ///
    /// Initialize, locate, and describe the configuration file.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    /// Can be used with eval or redirected to a file.
    ///
    /// Usage:
    ///   eval "$(dockanchor completions --shell zsh)"
    ///   dockanchor completions --shell fish > ~/.config/fish/completions/dockanchor.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<&Path> { self.config.as_deref() }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), AnchorError> {
        let config = self.config_path();

        match self.command.as_ref().unwrap_or(&Commands::Run) {
            Commands::Run => run::execute_run(config),
            Commands::Displays { json } => displays::execute(config, *json),
            Commands::Relocate => run::execute_relocate(config),
            Commands::Anchor { fingerprint } => run::execute_anchor(config, fingerprint),
            Commands::Config(cmd) => config_cmd::execute(cmd, config),
            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, APP_NAME, &mut io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_run() {
        let cli = Cli::try_parse_from(["dockanchor"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parses_displays_json() {
        let cli = Cli::try_parse_from(["dockanchor", "displays", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Displays { json: true })));
    }

    #[test]
    fn test_cli_parses_anchor() {
        let cli = Cli::try_parse_from(["dockanchor", "anchor", "AAA-SN1"]).unwrap();
        match cli.command {
            Some(Commands::Anchor { fingerprint }) => assert_eq!(fingerprint, "AAA-SN1"),
            _ => panic!("Expected Anchor command"),
        }
    }

    #[test]
    fn test_cli_requires_anchor_fingerprint() {
        assert!(Cli::try_parse_from(["dockanchor", "anchor"]).is_err());
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["dockanchor", "relocate", "--verbose", "--config", "/tmp/c.jsonc"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config_path(), Some(Path::new("/tmp/c.jsonc")));
        assert!(matches!(cli.command, Some(Commands::Relocate)));
    }

    #[test]
    fn test_cli_parses_completions_zsh() {
        let cli = Cli::try_parse_from(["dockanchor", "completions", "--shell", "zsh"]).unwrap();
        match cli.command {
            Some(Commands::Completions { shell }) => assert_eq!(shell, Shell::Zsh),
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_cli_parses_config_schema() {
        let cli = Cli::try_parse_from(["dockanchor", "config", "schema"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config(ConfigCommands::Schema))));
    }

    #[test]
    fn test_cli_command_is_valid() { Cli::command().debug_assert(); }
}
