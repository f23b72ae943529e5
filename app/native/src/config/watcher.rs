//! Configuration file watcher for hot-reloading.
//!
//! Watches the configuration file's directory and hands every successfully
//! reloaded configuration to a callback.

use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use super::{DockAnchorConfig, load_config_from_path};
use crate::platform::spawn_named_thread;

/// Debounce duration for config file changes.
/// Some editors trigger multiple events per save (write to temp, rename, etc.).
const CONFIG_DEBOUNCE_MS: u64 = 200;

/// Starts watching `config_path` for changes.
///
/// Bursts of file events are collapsed: the file is reloaded once the
/// events stop for the debounce window. Parse errors are logged and the
/// previous configuration stays in effect.
pub fn watch_config_file<F>(config_path: PathBuf, on_change: F) -> Option<JoinHandle<()>>
where
    F: Fn(DockAnchorConfig) + Send + 'static,
{
    let config_filename = config_path.file_name().map(std::ffi::OsStr::to_os_string)?;

    spawn_named_thread("config-watcher", move || {
        let (tx, rx) = mpsc::channel();

        let mut watcher: RecommendedWatcher = match notify::recommended_watcher(tx) {
            Ok(w) => w,
            Err(err) => {
                tracing::warn!(error = %err, "failed to create config watcher");
                return;
            }
        };

        // Watch the parent directory to catch editors that save by renaming
        // a temp file over the original.
        let watch_path = config_path.parent().unwrap_or(&config_path);
        if let Err(err) = watcher.watch(watch_path, RecursiveMode::NonRecursive) {
            tracing::warn!(error = %err, path = %watch_path.display(), "failed to watch config file");
            return;
        }

        let debounce = Duration::from_millis(CONFIG_DEBOUNCE_MS);
        let affects_config = |event: &notify::Event| {
            event.paths.iter().any(|p| p.file_name().is_some_and(|name| name == config_filename))
        };

        loop {
            match rx.recv() {
                Ok(Ok(event)) if affects_config(&event) => {}
                Ok(Ok(_)) => continue,
                Ok(Err(err)) => {
                    tracing::warn!(error = %err, "config watch error");
                    continue;
                }
                Err(_) => break,
            }

            // Wait for the burst to settle.
            loop {
                match rx.recv_timeout(debounce) {
                    Ok(_) => {}
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }

            match load_config_from_path(&config_path) {
                Ok((config, _)) => {
                    tracing::info!(path = %config_path.display(), "configuration reloaded");
                    on_change(config);
                }
                Err(err) => tracing::warn!(error = %err, "ignoring invalid configuration change"),
            }
        }
    })
}
