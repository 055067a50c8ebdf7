//! Logical-pixel geometry shared by the window controllers and the input hook.
//!
//! Every rectangle in this crate is expressed in logical pixels (physical
//! pixels divided by the display scale factor). Conversion from the physical
//! coordinates reported by the OS happens at the edges, through
//! [`to_logical`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A point in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Same size, new origin.
    pub fn moved_to(&self, origin: Point) -> Self {
        Self::new(origin.x, origin.y, self.width, self.height)
    }

    /// Inclusive on every edge, so a click on the border counts as inside.
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Nearest origin for a `size`-sized rectangle that keeps it inside `self`.
    ///
    /// When the rectangle is larger than `self` the origin sticks to the
    /// top-left edge.
    pub fn clamp_origin(&self, candidate: Point, width: f64, height: f64) -> Point {
        let max_x = self.right() - width;
        let max_y = self.bottom() - height;
        Point::new(
            candidate.x.min(max_x).max(self.x),
            candidate.y.min(max_y).max(self.y),
        )
    }
}

/// Convert a physical coordinate to logical pixels, rounded to the nearest
/// integer.
pub fn to_logical(physical: i32, scale_factor: f64) -> f64 {
    let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
    (f64::from(physical) / scale).round()
}
