//! Display reconfiguration notifications.

use serde::Serialize;

/// `CGDisplayChangeSummaryFlags` bits.
pub mod flags {
    pub const BEGIN_CONFIGURATION: u32 = 1 << 0;
    pub const MOVED: u32 = 1 << 1;
    pub const SET_MAIN: u32 = 1 << 2;
    pub const SET_MODE: u32 = 1 << 3;
    pub const ADD: u32 = 1 << 4;
    pub const REMOVE: u32 = 1 << 5;
    pub const ENABLED: u32 = 1 << 8;
    pub const DISABLED: u32 = 1 << 9;
    pub const MIRROR: u32 = 1 << 10;
    pub const UNMIRROR: u32 = 1 << 11;
    pub const DESKTOP_SHAPE_CHANGED: u32 = 1 << 12;
}

/// One topology change, reduced to what the reactor acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "change", content = "display", rename_all = "camelCase")]
pub enum TopologyChange {
    /// A display was attached or enabled.
    Added(u32),
    /// A display was detached or disabled.
    Removed(u32),
    /// Origin, mirroring or desktop shape changed.
    Reconfigured,
    MainDisplayChanged,
    ModeChanged,
}

impl TopologyChange {
    /// Decodes the flags of one reconfiguration callback.
    ///
    /// The "begin configuration" callback is ignored: state is still stale
    /// at that point and a second callback always follows.
    #[must_use]
    pub const fn from_flags(display: u32, bits: u32) -> Option<Self> {
        if bits & flags::BEGIN_CONFIGURATION != 0 {
            None
        } else if bits & (flags::ADD | flags::ENABLED) != 0 {
            Some(Self::Added(display))
        } else if bits & (flags::REMOVE | flags::DISABLED) != 0 {
            Some(Self::Removed(display))
        } else if bits & flags::SET_MAIN != 0 {
            Some(Self::MainDisplayChanged)
        } else if bits
            & (flags::MOVED | flags::MIRROR | flags::UNMIRROR | flags::DESKTOP_SHAPE_CHANGED)
            != 0
        {
            Some(Self::Reconfigured)
        } else if bits & flags::SET_MODE != 0 {
            Some(Self::ModeChanged)
        } else {
            None
        }
    }

    /// Whether anchor state may need re-deriving (as opposed to refreshing
    /// geometry only).
    #[must_use]
    pub const fn affects_anchor(&self) -> bool {
        matches!(self, Self::Added(_) | Self::Removed(_) | Self::MainDisplayChanged)
    }

    /// Ordering used when handling a burst of changes at once.
    #[must_use]
    pub const fn priority(&self) -> u8 {
        match self {
            Self::Removed(_) => 0,
            Self::Added(_) => 1,
            Self::MainDisplayChanged => 2,
            Self::Reconfigured => 3,
            Self::ModeChanged => 4,
        }
    }
}

/// Orders and deduplicates a burst of changes.
#[must_use]
pub fn coalesce(mut changes: Vec<TopologyChange>) -> Vec<TopologyChange> {
    changes.sort_by_key(TopologyChange::priority);
    let mut seen = std::collections::HashSet::with_capacity(changes.len());
    changes.retain(|change| seen.insert(*change));

    // Geometry-only refreshes are redundant next to any anchor-affecting
    // change: every handler re-enumerates.
    if changes.iter().any(TopologyChange::affects_anchor) {
        changes.retain(TopologyChange::affects_anchor);
    } else {
        changes.truncate(1);
    }
    changes
}
