//! Per-event pass/drop decision.
//!
//! This runs for every pointer event the window server delivers to the tap,
//! so it has to finish in microseconds: no locks, no I/O, no allocation.

use super::state::Snapshot;
use crate::constants::SYNTHETIC_EVENT_MARKER;
use crate::display::Fingerprint;
use crate::geometry::Point;

/// What kind of event reached the tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapEventKind {
    /// Mouse moved, or moved with a button held.
    PointerMoved,
    TapDisabledByTimeout,
    TapDisabledByUserInput,
    Other,
}

/// The parts of an intercepted event the decision needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapEvent {
    pub kind: TapEventKind,
    pub location: Point,
    /// The `kCGEventSourceUserData` field.
    pub user_data: i64,
}

impl TapEvent {
    #[must_use]
    pub const fn moved(location: Point) -> Self {
        Self { kind: TapEventKind::PointerMoved, location, user_data: 0 }
    }

    #[must_use]
    pub const fn synthetic(location: Point) -> Self {
        Self { kind: TapEventKind::PointerMoved, location, user_data: SYNTHETIC_EVENT_MARKER }
    }

    #[must_use]
    pub const fn is_synthetic(&self) -> bool { self.user_data == SYNTHETIC_EVENT_MARKER }
}

/// Outcome of the decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// The system disabled the tap; re-enable it and let the event through.
    ReenableTap,
    /// Real input dropped during a relocation session.
    Suppress,
    /// Pointer entered the trigger zone of a non-anchor display.
    Block(Fingerprint),
}

impl Verdict {
    #[must_use]
    pub const fn drops_event(&self) -> bool { matches!(self, Self::Suppress | Self::Block(_)) }
}

/// Decides what happens to one intercepted event.
///
/// `snapshot` is `None` when the published state could not be read without
/// waiting; the event then passes through.
#[must_use]
pub fn decide(event: &TapEvent, suppressing: bool, snapshot: Option<&Snapshot>) -> Verdict {
    match event.kind {
        TapEventKind::TapDisabledByTimeout | TapEventKind::TapDisabledByUserInput => {
            return Verdict::ReenableTap;
        }
        TapEventKind::PointerMoved | TapEventKind::Other => {}
    }

    if suppressing {
        return if event.is_synthetic() { Verdict::Pass } else { Verdict::Suppress };
    }

    if event.kind != TapEventKind::PointerMoved || event.is_synthetic() {
        return Verdict::Pass;
    }

    snapshot
        .and_then(|snapshot| snapshot.blocked_at(event.location))
        .map_or(Verdict::Pass, |fingerprint| Verdict::Block(fingerprint.clone()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::display::DisplayDescriptor;
    use crate::geometry::Rect;
    use crate::intercept::state::AnchorState;
    use crate::zone::DockEdge;

    fn scenario(edge: DockEdge) -> Snapshot {
        let displays: Vec<DisplayDescriptor> = [(1, 0.0, "PRIMARY"), (2, 1920.0, "SECONDARY")]
            .into_iter()
            .map(|(handle, x, fp)| DisplayDescriptor {
                handle,
                fingerprint: Fingerprint::new(fp),
                bounds: Rect::new(x, 0.0, 1920.0, 1080.0),
                is_primary: handle == 1,
                is_builtin: false,
                name: String::new(),
            })
            .collect();

        Snapshot::new(Arc::from(displays), AnchorState {
            anchor: Some(Fingerprint::new("PRIMARY")),
            effective: Some(Fingerprint::new("PRIMARY")),
            edge,
            profile_anchor: None,
        })
    }

    #[test]
    fn test_non_anchor_zone_is_blocked() {
        let snapshot = scenario(DockEdge::Bottom);
        let verdict = decide(&TapEvent::moved(Point::new(2500.0, 1079.0)), false, Some(&snapshot));
        assert_eq!(verdict, Verdict::Block(Fingerprint::new("SECONDARY")));
        assert!(verdict.drops_event());
    }

    #[test]
    fn test_anchor_zone_and_open_space_pass() {
        let snapshot = scenario(DockEdge::Bottom);
        for point in [Point::new(960.0, 1079.0), Point::new(2500.0, 500.0), Point::new(-5.0, -5.0)] {
            assert_eq!(decide(&TapEvent::moved(point), false, Some(&snapshot)), Verdict::Pass);
        }
    }

    #[test]
    fn test_side_edge_zone() {
        let snapshot = scenario(DockEdge::Left);
        assert_eq!(
            decide(&TapEvent::moved(Point::new(1925.0, 300.0)), false, Some(&snapshot)),
            Verdict::Block(Fingerprint::new("SECONDARY"))
        );
        assert_eq!(
            decide(&TapEvent::moved(Point::new(2500.0, 1079.0)), false, Some(&snapshot)),
            Verdict::Pass
        );
    }

    #[test]
    fn test_tap_disabled_always_reenables() {
        let snapshot = scenario(DockEdge::Bottom);
        for kind in [TapEventKind::TapDisabledByTimeout, TapEventKind::TapDisabledByUserInput] {
            let event = TapEvent { kind, location: Point::new(2500.0, 1079.0), user_data: 0 };
            assert_eq!(decide(&event, true, Some(&snapshot)), Verdict::ReenableTap);
            assert_eq!(decide(&event, false, None), Verdict::ReenableTap);
        }
    }

    #[test]
    fn test_suppression_passes_only_marked_events() {
        let snapshot = scenario(DockEdge::Bottom);
        let inside = Point::new(2500.0, 1079.0);
        let outside = Point::new(100.0, 100.0);

        assert_eq!(decide(&TapEvent::synthetic(inside), true, Some(&snapshot)), Verdict::Pass);
        assert_eq!(decide(&TapEvent::synthetic(outside), true, None), Verdict::Pass);
        assert_eq!(decide(&TapEvent::moved(outside), true, Some(&snapshot)), Verdict::Suppress);
        assert_eq!(decide(&TapEvent::moved(inside), true, None), Verdict::Suppress);
    }

    #[test]
    fn test_synthetic_events_pass_outside_sessions() {
        let snapshot = scenario(DockEdge::Bottom);
        assert_eq!(
            decide(&TapEvent::synthetic(Point::new(2500.0, 1079.0)), false, Some(&snapshot)),
            Verdict::Pass
        );
    }

    #[test]
    fn test_unreadable_snapshot_passes() {
        assert_eq!(decide(&TapEvent::moved(Point::new(2500.0, 1079.0)), false, None), Verdict::Pass);
    }

    #[test]
    fn test_other_events_pass() {
        let snapshot = scenario(DockEdge::Bottom);
        let event =
            TapEvent { kind: TapEventKind::Other, location: Point::new(2500.0, 1079.0), user_data: 0 };
        assert_eq!(decide(&event, false, Some(&snapshot)), Verdict::Pass);
    }
}
