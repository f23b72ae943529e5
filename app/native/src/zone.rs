//! Trigger-zone classification.
//!
//! macOS moves the Dock to a display when the pointer dwells against that
//! display's Dock edge. The trigger zone is a thin band hugging that edge:
//! full width for a bottom Dock, full height for a left or right Dock.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::TRIGGER_ZONE_THICKNESS;
use crate::geometry::{Point, Rect};

/// The screen edge the Dock is attached to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DockEdge {
    #[default]
    Bottom,
    Left,
    Right,
}

impl DockEdge {
    /// Parses the `com.apple.dock` `orientation` preference value.
    ///
    /// Missing or unknown values mean the default bottom placement.
    #[must_use]
    pub fn from_orientation(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("left") => Self::Left,
            Some(v) if v.eq_ignore_ascii_case("right") => Self::Right,
            _ => Self::Bottom,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Computes the trigger band for `bounds` along `edge`.
#[must_use]
pub fn trigger_zone(bounds: &Rect, edge: DockEdge) -> Rect {
    let thickness = TRIGGER_ZONE_THICKNESS.min(bounds.width).min(bounds.height);

    match edge {
        DockEdge::Bottom => {
            Rect::new(bounds.x, bounds.max_y() - thickness, bounds.width, thickness)
        }
        DockEdge::Left => Rect::new(bounds.x, bounds.y, thickness, bounds.height),
        DockEdge::Right => {
            Rect::new(bounds.max_x() - thickness, bounds.y, thickness, bounds.height)
        }
    }
}

/// Closed containment test of `point` in `zone`.
#[must_use]
pub fn contains(point: Point, zone: &Rect) -> bool { zone.contains(point) }
