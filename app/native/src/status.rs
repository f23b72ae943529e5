//! Human-readable status line.
//!
//! The board holds a steady-state message derived from monitoring state, the
//! anchored display and the last error. Transient messages ("Blocked Dock
//! move", "Dock moved") temporarily replace it and revert on their own.

use std::sync::Arc;
use std::time::Duration;

use eyeball::{SharedObservable, Subscriber};
use parking_lot::Mutex;

use crate::platform::spawn_named_thread;

#[derive(Debug, Default)]
struct BoardState {
    monitoring: bool,
    anchor_name: Option<String>,
    error: Option<String>,
    generation: u64,
    flashing: bool,
}

impl BoardState {
    fn steady_message(&self) -> String {
        match (&self.error, self.monitoring, &self.anchor_name) {
            (Some(error), false, _) => error.clone(),
            (_, true, Some(name)) => format!("Monitoring: Dock anchored to {name}"),
            (_, true, None) => "Monitoring: no anchor display".to_string(),
            (None, false, _) => "Monitoring paused".to_string(),
        }
    }
}

struct Inner {
    message: SharedObservable<String>,
    state: Mutex<BoardState>,
}

/// Observable status message.
#[derive(Clone)]
pub struct StatusBoard {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for StatusBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusBoard").field("message", &self.current()).finish()
    }
}

impl Default for StatusBoard {
    fn default() -> Self { Self::new() }
}

impl StatusBoard {
    #[must_use]
    pub fn new() -> Self {
        let state = BoardState::default();
        let message = SharedObservable::new(state.steady_message());
        Self { inner: Arc::new(Inner { message, state: Mutex::new(state) }) }
    }

    #[must_use]
    pub fn current(&self) -> String { self.inner.message.get() }

    #[must_use]
    pub fn subscribe(&self) -> Subscriber<String> { self.inner.message.subscribe() }

    pub fn set_monitoring(&self, monitoring: bool) {
        self.update_steady(|state| {
            state.monitoring = monitoring;
            if monitoring {
                state.error = None;
            }
        });
    }

    pub fn set_anchor_name(&self, name: Option<String>) {
        self.update_steady(|state| state.anchor_name = name);
    }

    /// Records an error. Errors cancel any transient message.
    pub fn set_error(&self, error: impl Into<String>) {
        let mut state = self.inner.state.lock();
        state.error = Some(error.into());
        state.flashing = false;
        state.generation += 1;
        self.inner.message.set_if_not_eq(state.steady_message());
    }

    /// Shows `message` for `duration`, then reverts to the steady message
    /// unless another transient message replaced it in the meantime.
    pub fn flash(&self, message: impl Into<String>, duration: Duration) {
        let generation = {
            let mut state = self.inner.state.lock();
            state.generation += 1;
            state.flashing = true;
            self.inner.message.set_if_not_eq(message.into());
            state.generation
        };

        let weak = Arc::downgrade(&self.inner);
        let spawned = spawn_named_thread("status-revert", move || {
            std::thread::sleep(duration);
            if let Some(inner) = weak.upgrade() {
                Self::revert(&inner, generation);
            }
        });

        if spawned.is_none() {
            Self::revert(&self.inner, generation);
        }
    }

    fn revert(inner: &Inner, generation: u64) {
        let mut state = inner.state.lock();
        if state.generation == generation {
            state.flashing = false;
            inner.message.set_if_not_eq(state.steady_message());
        }
    }

    fn update_steady(&self, apply: impl FnOnce(&mut BoardState)) {
        let mut state = self.inner.state.lock();
        apply(&mut state);
        if !state.flashing {
            self.inner.message.set_if_not_eq(state.steady_message());
        }
    }
}
