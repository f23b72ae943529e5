//! Geometry of a relocation: where the cursor approaches from and where it
//! presses against the edge.

use crate::geometry::{Point, Rect};
use crate::zone::DockEdge;

/// The deterministic pointer trajectory for one relocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RelocationPath {
    /// Where the cursor is warped before the walk starts.
    pub approach: Point,
    /// Interpolated positions from just past `approach` to `edge` inclusive.
    pub walk: Vec<Point>,
    /// The innermost point on the Dock edge, held during the hold phase.
    pub edge: Point,
}

/// The last pixel row or column of `bounds` on `edge`, centered along it.
#[must_use]
pub fn edge_point(bounds: &Rect, edge: DockEdge) -> Point {
    let center = bounds.center();
    match edge {
        DockEdge::Bottom => Point::new(center.x, bounds.max_y() - 1.0),
        DockEdge::Left => Point::new(bounds.min_x(), center.y),
        DockEdge::Right => Point::new(bounds.max_x() - 1.0, center.y),
    }
}

/// A point `offset` units inward from the edge point.
#[must_use]
pub fn approach_point(bounds: &Rect, edge: DockEdge, offset: f64) -> Point {
    let target = edge_point(bounds, edge);
    let span = match edge {
        DockEdge::Bottom => bounds.height,
        DockEdge::Left | DockEdge::Right => bounds.width,
    };
    let offset = offset.clamp(0.0, (span - 1.0).max(0.0));

    match edge {
        DockEdge::Bottom => Point::new(target.x, target.y - offset),
        DockEdge::Left => Point::new(target.x + offset, target.y),
        DockEdge::Right => Point::new(target.x - offset, target.y),
    }
}

/// Plans the approach and walk toward `edge` of `bounds`.
///
/// The walk has `steps` points (at least one) and always ends exactly on
/// the edge point.
#[must_use]
pub fn plan(bounds: &Rect, edge: DockEdge, offset: f64, steps: u32) -> RelocationPath {
    let approach = approach_point(bounds, edge, offset);
    let target = edge_point(bounds, edge);
    let steps = steps.max(1);

    let mut walk: Vec<Point> = (1..steps)
        .map(|step| approach.lerp(target, f64::from(step) / f64::from(steps)))
        .collect();
    walk.push(target);

    RelocationPath { approach, walk, edge: target }
}
