//! CLI module for DockAnchor.
//!
//! `dockanchor` with no subcommand runs the monitoring daemon in the
//! foreground. The remaining subcommands inspect displays, move the Dock
//! once, or manage the configuration file, and exit.

mod commands;
mod output;

pub use commands::{Cli, Commands, ConfigCommands};
