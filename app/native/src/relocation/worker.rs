//! Background thread that runs relocation requests in order.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use super::session::RelocationOutcome;
use super::simulator::RelocationSimulator;
use crate::display::Fingerprint;
use crate::error::{AnchorError, Result};
use crate::platform::spawn_named_thread;

/// A queued relocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationRequest {
    pub target: Fingerprint,
    /// How long to wait before starting, letting the display topology settle.
    pub delay: Duration,
}

impl RelocationRequest {
    #[must_use]
    pub const fn now(target: Fingerprint) -> Self { Self { target, delay: Duration::ZERO } }

    #[must_use]
    pub const fn after(target: Fingerprint, delay: Duration) -> Self { Self { target, delay } }
}

/// Handle to the relocation thread.
///
/// Requests that pile up while a session runs or while waiting out a settle
/// delay are coalesced: only the most recent one is executed.
#[derive(Debug, Clone)]
pub struct RelocationWorker {
    sender: Sender<RelocationRequest>,
}

impl RelocationWorker {
    /// Spawns the worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`AnchorError::CommandError`] if the thread cannot be spawned.
    pub fn spawn(simulator: Arc<RelocationSimulator>) -> Result<Self> {
        let (sender, requests) = mpsc::channel();
        spawn_named_thread("relocation", move || run(&requests, &simulator))
            .ok_or_else(|| AnchorError::CommandError("failed to spawn relocation worker".into()))?;
        Ok(Self { sender })
    }

    /// Queues a request.
    ///
    /// # Errors
    ///
    /// Returns [`AnchorError::CommandError`] if the worker thread has exited.
    pub fn submit(&self, request: RelocationRequest) -> Result<()> {
        tracing::debug!(target = %request.target, delay_ms = request.delay.as_millis(), "queueing relocation");
        self.sender
            .send(request)
            .map_err(|_| AnchorError::CommandError("relocation worker is not running".into()))
    }
}

/// Drains everything queued behind `request` and returns the newest.
fn latest(requests: &Receiver<RelocationRequest>, request: RelocationRequest) -> RelocationRequest {
    requests.try_iter().last().unwrap_or(request)
}

fn run(requests: &Receiver<RelocationRequest>, simulator: &RelocationSimulator) {
    while let Ok(first) = requests.recv() {
        let mut request = latest(requests, first);

        while !request.delay.is_zero() {
            thread::sleep(request.delay);
            match requests.try_recv() {
                Ok(newer) => request = latest(requests, newer),
                Err(_) => break,
            }
        }

        match simulator.relocate(&request.target) {
            Ok(RelocationOutcome::Completed(target)) => {
                tracing::info!(target = %target, "relocation completed");
            }
            Ok(RelocationOutcome::Skipped(reason)) => {
                tracing::debug!(reason = %reason, "relocation skipped");
            }
            Err(err) => tracing::warn!(error = %err, "relocation failed"),
        }
    }
    tracing::debug!("relocation worker stopped");
}
