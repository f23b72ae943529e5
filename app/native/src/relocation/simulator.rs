//! Forces the Dock onto a display by walking the cursor into its edge.
//!
//! The window server only moves the Dock after it sees continuous motion
//! toward the edge followed by sustained contact. A single warp is ignored,
//! so the simulator posts an interpolated approach and then keeps pressing
//! against the edge. Real hardware motion is dropped for the whole sequence:
//! interleaved real events would give the window server a contradictory
//! trajectory and abort its animation.

use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use super::RelocationTuning;
use super::path::plan;
use super::session::{PhaseGuard, RelocationOutcome, SkipReason, SuppressionGuard};
use crate::constants::{RELOCATION_STATUS_DURATION, SYNTHETIC_EVENT_MARKER};
use crate::display::{DisplayDescriptor, Fingerprint, find_display};
use crate::error::{AnchorError, Result};
use crate::events::{AnchorEvent, EventBus};
use crate::intercept::{InterceptionEngine, Phase};
use crate::platform::{DockProbe, PointerDriver};
use crate::status::StatusBoard;

/// Runs relocation sessions, one at a time.
pub struct RelocationSimulator {
    engine: InterceptionEngine,
    pointer: Arc<dyn PointerDriver>,
    dock: Arc<dyn DockProbe>,
    status: StatusBoard,
    events: EventBus,
    tuning: Mutex<RelocationTuning>,
}

impl RelocationSimulator {
    #[must_use]
    pub fn new(
        engine: InterceptionEngine,
        pointer: Arc<dyn PointerDriver>,
        dock: Arc<dyn DockProbe>,
        status: StatusBoard,
        events: EventBus,
        tuning: RelocationTuning,
    ) -> Self {
        Self { engine, pointer, dock, status, events, tuning: Mutex::new(tuning) }
    }

    pub fn set_tuning(&self, tuning: RelocationTuning) { *self.tuning.lock() = tuning; }

    #[must_use]
    pub fn tuning(&self) -> RelocationTuning { *self.tuning.lock() }

    /// The display the Dock is on right now, judged from its window frame.
    #[must_use]
    pub fn dock_display<'a>(&self, displays: &'a [DisplayDescriptor]) -> Option<&'a DisplayDescriptor> {
        let frame = self.dock.dock_frame()?;
        let center = frame.center();

        displays.iter().find(|d| d.bounds.contains(center)).or_else(|| {
            displays
                .iter()
                .map(|d| (d, d.bounds.intersection_area(&frame)))
                .filter(|(_, area)| *area > 0.0)
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(d, _)| d)
        })
    }

    /// Moves the Dock to `target`, blocking until the sequence finishes.
    ///
    /// # Errors
    ///
    /// - [`AnchorError::RelocationInProgress`] if another session is running.
    /// - [`AnchorError::TapInstallationFailed`] if monitoring is off and a
    ///   temporary tap cannot be installed.
    pub fn relocate(&self, target: &Fingerprint) -> Result<RelocationOutcome> {
        let state = Arc::clone(self.engine.state());
        let Some(phase) = PhaseGuard::begin(&state) else {
            tracing::debug!(target = %target, "relocation rejected, session in flight");
            return Err(AnchorError::RelocationInProgress);
        };

        let snapshot = state.load();
        let displays = snapshot.displays();

        if displays.len() < 2 {
            return Ok(self.skip(SkipReason::SingleDisplay));
        }
        let Some(target_display) = find_display(displays, target) else {
            return Ok(self.skip(SkipReason::TargetUnavailable));
        };
        if self.dock_display(displays).is_some_and(|d| d.handle == target_display.handle) {
            return Ok(self.skip(SkipReason::AlreadyOnTarget));
        }

        let tuning = self.tuning();
        let edge = snapshot.anchor().edge;
        let path = plan(&target_display.bounds, edge, tuning.approach_offset, tuning.approach_steps);
        let saved = self.pointer.location();

        tracing::info!(
            target = %target_display.fingerprint,
            name = %target_display.name,
            edge = edge.as_str(),
            "relocating Dock"
        );

        let lease = self.engine.acquire_tap_lease()?;
        {
            let _suppression = SuppressionGuard::engage(&state, self.pointer.as_ref());

            self.pointer.warp(path.approach);
            for point in &path.walk {
                self.pointer.post_move(*point, SYNTHETIC_EVENT_MARKER);
                thread::sleep(tuning.step_delay);
            }

            phase.advance(Phase::HoldingAtEdge);
            for _ in 0..tuning.hold_steps {
                self.pointer.post_move(path.edge, SYNTHETIC_EVENT_MARKER);
                thread::sleep(tuning.hold_delay);
            }

            phase.advance(Phase::Returning);
            if let Some(saved) = saved {
                self.pointer.warp(saved);
            }
        }
        drop(lease);
        drop(phase);

        self.status.flash(format!("Dock moved to {}", target_display.name), RELOCATION_STATUS_DURATION);
        self.events.emit(AnchorEvent::RelocationCompleted(target_display.fingerprint.clone()));

        Ok(RelocationOutcome::Completed(target_display.fingerprint.clone()))
    }

    fn skip(&self, reason: SkipReason) -> RelocationOutcome {
        tracing::debug!(reason = ?reason, "relocation skipped");
        self.status.flash(reason.to_string(), RELOCATION_STATUS_DURATION);
        RelocationOutcome::Skipped(reason)
    }
}

impl std::fmt::Debug for RelocationSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelocationSimulator").field("tuning", &self.tuning()).finish_non_exhaustive()
    }
}
