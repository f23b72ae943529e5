//! Relocation: synthetic pointer input that makes the window server move
//! the Dock to a chosen display.

pub mod path;
pub mod session;
pub mod simulator;
pub mod worker;

use std::time::Duration;

pub use path::{RelocationPath, plan};
pub use session::{RelocationOutcome, SkipReason};
pub use simulator::RelocationSimulator;
pub use worker::{RelocationRequest, RelocationWorker};

/// Timing and geometry of the synthetic sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelocationTuning {
    /// Distance from the edge where the approach starts.
    pub approach_offset: f64,
    pub approach_steps: u32,
    pub step_delay: Duration,
    /// Events posted while pressing against the edge. Too few and the
    /// window server does not move the Dock.
    pub hold_steps: u32,
    pub hold_delay: Duration,
    /// Wait after a topology change before relocating.
    pub settle_delay: Duration,
}

impl Default for RelocationTuning {
    fn default() -> Self {
        Self {
            approach_offset: 100.0,
            approach_steps: 12,
            step_delay: Duration::from_millis(10),
            hold_steps: 30,
            hold_delay: Duration::from_millis(10),
            settle_delay: Duration::from_millis(500),
        }
    }
}

impl RelocationTuning {
    /// Upper bound on how long one session runs.
    #[must_use]
    pub fn worst_case_duration(&self) -> Duration {
        self.step_delay * self.approach_steps.max(1) + self.hold_delay * self.hold_steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning() {
        let tuning = RelocationTuning::default();
        assert_eq!(tuning.approach_steps, 12);
        assert_eq!(tuning.hold_steps, 30);
        assert_eq!(tuning.worst_case_duration(), Duration::from_millis(420));
    }
}
