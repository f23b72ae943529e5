use std::thread::{self, JoinHandle};

use crate::constants::APP_NAME;

/// Spawns a thread named `dockanchor-<name>`.
///
/// Spawn failures are logged and reported as `None`.
pub fn spawn_named_thread<F, T>(name: &str, task: F) -> Option<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let thread_name = format!("{APP_NAME}-{name}");

    match thread::Builder::new().name(thread_name.clone()).spawn(task) {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::error!(thread = %thread_name, error = %err, "failed to spawn thread");
            None
        }
    }
}
