//! State shared between the tap callback and everything else.
//!
//! Writers build a complete [`Snapshot`] and swap it in. The tap callback only
//! ever attempts a non-blocking read, and sees either the previous snapshot
//! or the new one, never a half-updated mix.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use parking_lot::RwLock;
use serde::Serialize;

use crate::display::{DisplayDescriptor, Fingerprint, find_display};
use crate::geometry::{Point, Rect};
use crate::zone::{DockEdge, trigger_zone};

/// Anchor intent and what is currently enforced.
///
/// `anchor` is what the user chose. `effective` is what the tap enforces
/// right now; it diverges from `anchor` while the anchor display is
/// disconnected or while `profile_anchor` overrides it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorState {
    pub anchor: Option<Fingerprint>,
    pub effective: Option<Fingerprint>,
    pub edge: DockEdge,
    /// Target of the active profile. Never persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_anchor: Option<Fingerprint>,
}

impl AnchorState {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        if let (Some(profile), Some(effective)) = (&self.profile_anchor, &self.effective)
            && profile.same_display(effective)
        {
            return false;
        }
        match (&self.anchor, &self.effective) {
            (Some(anchor), Some(effective)) => !anchor.same_display(effective),
            (Some(_), None) => true,
            _ => false,
        }
    }
}

/// A trigger zone the tap must refuse.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockedZone {
    pub fingerprint: Fingerprint,
    pub zone: Rect,
}

/// An immutable view of displays and anchor state.
///
/// Trigger zones of every non-anchor display are computed once at
/// construction; the hot path only runs containment tests.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    displays: Arc<[DisplayDescriptor]>,
    anchor: AnchorState,
    blocked: Vec<BlockedZone>,
}

impl Snapshot {
    #[must_use]
    pub fn new(displays: Arc<[DisplayDescriptor]>, anchor: AnchorState) -> Self {
        let exempt = anchor
            .effective
            .as_ref()
            .and_then(|fp| find_display(&displays, fp))
            .map(|d| d.handle);

        // Without an anchor display in the set there is nothing to protect.
        let blocked = match exempt {
            Some(handle) => displays
                .iter()
                .filter(|d| d.handle != handle)
                .map(|d| BlockedZone {
                    fingerprint: d.fingerprint.clone(),
                    zone: trigger_zone(&d.bounds, anchor.edge),
                })
                .collect(),
            None => Vec::new(),
        };

        Self { displays, anchor, blocked }
    }

    #[must_use]
    pub fn displays(&self) -> &Arc<[DisplayDescriptor]> { &self.displays }

    #[must_use]
    pub const fn anchor(&self) -> &AnchorState { &self.anchor }

    #[must_use]
    pub fn blocked_zones(&self) -> &[BlockedZone] { &self.blocked }

    /// The first non-anchor display whose trigger zone contains `point`.
    #[must_use]
    pub fn blocked_at(&self, point: Point) -> Option<&Fingerprint> {
        self.blocked.iter().find(|b| b.zone.contains(point)).map(|b| &b.fingerprint)
    }

    #[must_use]
    pub fn display(&self, fingerprint: &Fingerprint) -> Option<&DisplayDescriptor> {
        find_display(&self.displays, fingerprint)
    }

    /// The display currently being enforced.
    #[must_use]
    pub fn effective_display(&self) -> Option<&DisplayDescriptor> {
        self.anchor.effective.as_ref().and_then(|fp| self.display(fp))
    }
}

/// Relocation phase. Anything but `Idle` means a session is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum Phase {
    #[default]
    Idle = 0,
    Approaching = 1,
    HoldingAtEdge = 2,
    Returning = 3,
}

impl Phase {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Approaching,
            2 => Self::HoldingAtEdge,
            3 => Self::Returning,
            _ => Self::Idle,
        }
    }
}

/// Published snapshot plus the lock-free flags the tap callback reads.
#[derive(Debug, Default)]
pub struct InterceptState {
    snapshot: RwLock<Arc<Snapshot>>,
    suppress_real_input: AtomicBool,
    phase: AtomicU8,
    notice_pending: AtomicBool,
}

impl InterceptState {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Replaces the published snapshot.
    pub fn publish(&self, snapshot: Snapshot) { *self.snapshot.write() = Arc::new(snapshot); }

    /// Current snapshot. May wait briefly for a concurrent publish.
    #[must_use]
    pub fn load(&self) -> Arc<Snapshot> { Arc::clone(&self.snapshot.read()) }

    /// Current snapshot, or `None` if a publish holds the lock right now.
    #[must_use]
    pub fn try_load(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.try_read().map(|guard| Arc::clone(&guard))
    }

    #[must_use]
    pub fn is_suppressing(&self) -> bool { self.suppress_real_input.load(Ordering::Acquire) }

    pub(crate) fn set_suppressing(&self, on: bool) {
        self.suppress_real_input.store(on, Ordering::Release);
    }

    #[must_use]
    pub fn phase(&self) -> Phase { Phase::from_u8(self.phase.load(Ordering::Acquire)) }

    pub(crate) fn set_phase(&self, phase: Phase) { self.phase.store(phase as u8, Ordering::Release); }

    /// Moves from `Idle` to `Approaching`. Returns `false` if a session is
    /// already in flight.
    pub(crate) fn try_begin_session(&self) -> bool {
        self.phase
            .compare_exchange(
                Phase::Idle as u8,
                Phase::Approaching as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Claims the right to emit one blocked-attempt notice.
    pub(crate) fn claim_notice(&self) -> bool {
        !self.notice_pending.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn release_notice(&self) { self.notice_pending.store(false, Ordering::Release); }
}
