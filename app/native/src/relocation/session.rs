//! Session bookkeeping: outcomes and the guards that bound a session.

use std::fmt;

use serde::Serialize;

use crate::display::Fingerprint;
use crate::intercept::{InterceptState, Phase};
use crate::platform::PointerDriver;

/// Why a relocation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    SingleDisplay,
    TargetUnavailable,
    AlreadyOnTarget,
    NoTarget,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SingleDisplay => "Only one display connected",
            Self::TargetUnavailable => "Anchor display is not connected",
            Self::AlreadyOnTarget => "Dock is already on the anchor display",
            Self::NoTarget => "No anchor display selected",
        })
    }
}

/// Result of a relocation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "camelCase")]
pub enum RelocationOutcome {
    Completed(Fingerprint),
    Skipped(SkipReason),
}

/// Holds the session gate. Returns the phase to `Idle` on drop.
#[derive(Debug)]
pub struct PhaseGuard<'a> {
    state: &'a InterceptState,
}

impl<'a> PhaseGuard<'a> {
    /// Opens a session, or returns `None` if one is already running.
    #[must_use]
    pub fn begin(state: &'a InterceptState) -> Option<Self> {
        state.try_begin_session().then_some(Self { state })
    }

    pub fn advance(&self, phase: Phase) { self.state.set_phase(phase); }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) { self.state.set_phase(Phase::Idle); }
}

/// Drops all real pointer input and hides the cursor until dropped.
pub struct SuppressionGuard<'a> {
    state: &'a InterceptState,
    pointer: &'a dyn PointerDriver,
}

impl<'a> SuppressionGuard<'a> {
    pub fn engage(state: &'a InterceptState, pointer: &'a dyn PointerDriver) -> Self {
        state.set_suppressing(true);
        pointer.set_cursor_visible(false);
        Self { state, pointer }
    }
}

impl Drop for SuppressionGuard<'_> {
    fn drop(&mut self) {
        self.state.set_suppressing(false);
        self.pointer.set_cursor_visible(true);
    }
}
