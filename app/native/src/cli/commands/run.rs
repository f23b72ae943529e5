//! Dock commands: the monitoring daemon and the one-shot `relocate` and
//! `anchor` commands.

#[cfg(not(target_os = "macos"))]
use std::path::Path;

use crate::anchor::DockAnchorOptions;
use crate::config::DockAnchorConfig;
#[cfg(not(target_os = "macos"))]
use crate::error::AnchorError;

/// Builds service options from a loaded configuration.
#[must_use]
pub fn anchor_options(config: &DockAnchorConfig) -> DockAnchorOptions {
    DockAnchorOptions {
        anchor: config.anchor.clone(),
        settings: config.anchor_settings(),
        tuning: config.relocation.tuning(),
        profiles: config.profile_rules(),
        engine: crate::intercept::EngineOptions::default(),
    }
}

#[cfg(target_os = "macos")]
mod native {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use colored::Colorize;
    use tokio::sync::broadcast::error::RecvError;

    use super::anchor_options;
    use crate::anchor::DockAnchor;
    use crate::config::{self, DockAnchorConfig};
    use crate::display::Fingerprint;
    use crate::error::AnchorError;
    use crate::events::AnchorEvent;
    use crate::platform::Platform;
    use crate::platform::macos::{DisplayReconfigurationMonitor, run_main_loop};
    use crate::reactor::SetAnchorOutcome;
    use crate::relocation::RelocationOutcome;

    /// Runs the daemon on the calling thread until the main run loop exits.
    pub fn execute_run(custom: Option<&Path>) -> Result<(), AnchorError> {
        let (config, config_path) = config::load_or_default(custom);
        let anchor = Arc::new(DockAnchor::new(Platform::native(), anchor_options(&config))?);

        spawn_frontend(Arc::clone(&anchor), config_path.clone())?;

        let reactor = Arc::clone(&anchor);
        let _monitor = DisplayReconfigurationMonitor::register(move |changes| {
            reactor.handle_topology_changes(changes);
        })?;

        let _watcher = config_path.map(|path| {
            let anchor = Arc::clone(&anchor);
            config::watch_config_file(path, move |config| apply_reloaded(&anchor, &config))
        });

        anchor.start()?;
        tracing::info!(status = %anchor.status_message(), "dockanchor running");
        run_main_loop();

        anchor.stop();
        Ok(())
    }

    /// Logs status changes and persists anchor changes off the main thread.
    fn spawn_frontend(anchor: Arc<DockAnchor>, config_path: Option<PathBuf>) -> Result<(), AnchorError> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
        let mut status = anchor.subscribe_status();
        let mut events = anchor.subscribe();

        crate::platform::spawn_named_thread("frontend", move || {
            runtime.block_on(async move {
                loop {
                    tokio::select! {
                        message = status.next() => match message {
                            Some(message) => tracing::info!(status = %message, "status changed"),
                            None => break,
                        },
                        event = events.recv() => match event {
                            Ok(event) => on_event(&event, config_path.as_deref()),
                            Err(RecvError::Lagged(missed)) => {
                                tracing::warn!(missed, "event subscriber lagged");
                            }
                            Err(RecvError::Closed) => break,
                        },
                    }
                }
            });
            drop(anchor);
        })
        .ok_or_else(|| AnchorError::CommandError("failed to spawn frontend thread".into()))?;
        Ok(())
    }

    fn on_event(event: &AnchorEvent, config_path: Option<&Path>) {
        tracing::debug!(event = event.name(), "event");

        if let AnchorEvent::AnchorChanged { anchor, persist: true, .. } = event {
            save_anchor(config_path, anchor.as_ref());
        }
    }

    fn save_anchor(config_path: Option<&Path>, anchor: Option<&Fingerprint>) {
        let Some(path) = config_path else {
            tracing::warn!("no configuration file, anchor selection will not be saved");
            return;
        };
        match config::persist_anchor(path, anchor) {
            Ok(()) => tracing::info!(path = %path.display(), "anchor saved"),
            Err(err) => tracing::error!(error = %err, "failed to save anchor"),
        }
    }

    fn apply_reloaded(anchor: &DockAnchor, config: &DockAnchorConfig) {
        anchor.update_settings(config.anchor_settings(), config.relocation.tuning(), config.profile_rules());

        if anchor.active_profile().is_some() {
            return;
        }
        let Some(requested) = config.anchor.as_ref() else {
            return;
        };
        let current = anchor.anchor_state().anchor;
        if current.is_some_and(|current| current.same_display(requested)) {
            return;
        }
        match anchor.set_anchor(requested) {
            Ok(outcome) => tracing::info!(anchor = %outcome.anchor(), "anchor reloaded from configuration"),
            Err(err) => tracing::warn!(error = %err, "failed to apply reloaded anchor"),
        }
    }

    fn print_outcome(outcome: &RelocationOutcome) {
        match outcome {
            RelocationOutcome::Completed(target) => {
                println!("{} Dock moved to {target}", "✓".green());
            }
            RelocationOutcome::Skipped(reason) => println!("{}", reason.to_string().dimmed()),
        }
    }

    /// Relocates once without installing the monitoring tap.
    pub fn execute_relocate(custom: Option<&Path>) -> Result<(), AnchorError> {
        let (config, _) = config::load_or_default(custom);
        let anchor = DockAnchor::new(Platform::native(), anchor_options(&config))?;

        print_outcome(&anchor.relocate_blocking()?);
        Ok(())
    }

    /// Selects, saves and optionally moves to the anchor display.
    pub fn execute_anchor(custom: Option<&Path>, fingerprint: &str) -> Result<(), AnchorError> {
        let (config, config_path) = config::load_or_default(custom);
        let mut options = anchor_options(&config);
        // relocated below on this thread instead of by the worker
        options.settings.auto_relocate_on_anchor_change = false;
        let anchor = DockAnchor::new(Platform::native(), options)?;

        let outcome = anchor.set_anchor(&Fingerprint::new(fingerprint))?;
        if let SetAnchorOutcome::Substituted { requested, substitute } = &outcome {
            println!(
                "{} {requested} is not connected, anchoring to {substitute} instead",
                "!".yellow()
            );
        }

        let path = config_path.ok_or_else(|| {
            AnchorError::ConfigError("no configuration file to save the anchor to".to_string())
        })?;
        config::persist_anchor(&path, Some(outcome.anchor()))?;
        println!("{} Anchor saved to {}", "✓".green(), path.display());

        if config.auto_relocate_on_anchor_change {
            print_outcome(&anchor.relocate_blocking()?);
        }
        Ok(())
    }
}

#[cfg(target_os = "macos")]
pub use native::{execute_anchor, execute_relocate, execute_run};

#[cfg(not(target_os = "macos"))]
fn unsupported(command: &str) -> AnchorError {
    AnchorError::Unsupported(format!("'{command}' requires macOS"))
}

/// Runs the monitoring daemon.
///
/// # Errors
///
/// Always returns [`AnchorError::Unsupported`] on this platform.
#[cfg(not(target_os = "macos"))]
pub fn execute_run(_custom: Option<&Path>) -> Result<(), AnchorError> { Err(unsupported("run")) }

/// Moves the Dock to the anchor display once.
///
/// # Errors
///
/// Always returns [`AnchorError::Unsupported`] on this platform.
#[cfg(not(target_os = "macos"))]
pub fn execute_relocate(_custom: Option<&Path>) -> Result<(), AnchorError> {
    Err(unsupported("relocate"))
}

/// Selects and saves the anchor display.
///
/// # Errors
///
/// Always returns [`AnchorError::Unsupported`] on this platform.
#[cfg(not(target_os = "macos"))]
pub fn execute_anchor(_custom: Option<&Path>, _fingerprint: &str) -> Result<(), AnchorError> {
    Err(unsupported("anchor"))
}
