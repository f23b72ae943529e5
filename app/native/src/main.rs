//! `dockanchor` binary.
//!
//! With no subcommand, runs in the foreground and keeps the Dock anchored.
//! Subcommands inspect displays, move the Dock once, or manage the
//! configuration file.

use clap::Parser;
use dockanchor_lib::cli::Cli;

fn main() {
    let cli = Cli::parse();
    dockanchor_lib::init_tracing(cli.verbose);

    if let Err(err) = cli.execute() {
        eprintln!("dockanchor: {err}");
        std::process::exit(1);
    }
}
