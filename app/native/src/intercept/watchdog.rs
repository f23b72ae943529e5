//! Periodic liveness checks on their own thread.

use std::ops::ControlFlow;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::platform::spawn_named_thread;

/// A running watchdog. Dropping it stops the thread at its next wake-up.
#[derive(Debug)]
pub struct Watchdog {
    _stop: Sender<()>,
}

impl Watchdog {
    /// Calls `tick` every `interval` until it breaks or the watchdog is dropped.
    ///
    /// Returns `None` if the thread could not be spawned.
    pub fn spawn<F>(interval: Duration, mut tick: F) -> Option<Self>
    where F: FnMut() -> ControlFlow<()> + Send + 'static {
        let (stop, stopped) = mpsc::channel::<()>();

        spawn_named_thread("watchdog", move || {
            loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if tick().is_break() {
                            break;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            tracing::debug!("watchdog stopped");
        })?;

        Some(Self { _stop: stop })
    }
}
