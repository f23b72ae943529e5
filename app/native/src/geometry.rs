//! Geometry primitives in the unified desktop coordinate space.
//!
//! All coordinates use the CoreGraphics global space: the origin is the
//! top-left corner of the main display and Y grows downward, so the
//! "bottom" edge of a display is its maximum Y.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A point in global desktop coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

    /// Linear interpolation between `self` and `other` (`t` in `0.0..=1.0`).
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: (other.x - self.x).mul_add(t, self.x),
            y: (other.y - self.y).mul_add(t, self.y),
        }
    }
}

/// An axis-aligned rectangle (origin + size).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub const fn min_x(&self) -> f64 { self.x }

    #[must_use]
    pub fn max_x(&self) -> f64 { self.x + self.width }

    #[must_use]
    pub const fn min_y(&self) -> f64 { self.y }

    #[must_use]
    pub fn max_y(&self) -> f64 { self.y + self.height }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.width.mul_add(0.5, self.x), self.height.mul_add(0.5, self.y))
    }

    /// Closed containment test: points lying exactly on an edge are inside.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }

    /// Area of the overlap between two rectangles (zero when disjoint).
    #[must_use]
    pub fn intersection_area(&self, other: &Self) -> f64 {
        let width = self.max_x().min(other.max_x()) - self.min_x().max(other.min_x());
        let height = self.max_y().min(other.max_y()) - self.min_y().max(other.min_y());

        if width <= 0.0 || height <= 0.0 {
            0.0
        } else {
            width * height
        }
    }
}
