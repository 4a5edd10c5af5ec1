//! Point/size primitives and the scale <-> slider mapping.
//!
//! Everything here is pure. Screen positions are in CSS pixels.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_SCALE, MIN_SCALE, SLIDER_MAX};

/// A 2D point or offset in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length when treated as a vector.
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Midpoint between two points.
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;
    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are finite and positive.
    pub fn is_positive(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    pub fn scaled(self, factor: f32) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }
}

/// An axis-aligned screen rectangle, e.g. the viewer window's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// Convert a screen position into an offset from this rectangle's center.
    pub fn offset_from_center(&self, screen: Point) -> Point {
        screen - self.center()
    }
}

/// Clamp `v` into `[lo, hi]`.
///
/// Unlike [`f32::clamp`] this never panics; if `lo > hi` the result is `hi`.
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Inclusive zoom range with the logarithmic slider mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: f32,
    pub max: f32,
}

impl ScaleRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, scale: f32) -> f32 {
        clamp(scale, self.min, self.max)
    }

    /// Map a scale onto the 0-100 slider. Out-of-range scales pin to the ends.
    pub fn slider_position(&self, scale: f32) -> f32 {
        let (log_min, log_max) = (self.min.ln(), self.max.ln());
        let position = SLIDER_MAX * (self.clamp(scale).ln() - log_min) / (log_max - log_min);
        clamp(position, 0.0, SLIDER_MAX)
    }

    /// Map a 0-100 slider position back onto the scale range, clamped.
    pub fn scale_at(&self, position: f32) -> f32 {
        let (log_min, log_max) = (self.min.ln(), self.max.ln());
        let t = position / SLIDER_MAX;
        self.clamp((log_min + t * (log_max - log_min)).exp())
    }
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self::new(MIN_SCALE, MAX_SCALE)
    }
}

/// Slider position for `scale` using the default range.
pub fn scale_to_slider_position(scale: f32) -> f32 {
    ScaleRange::default().slider_position(scale)
}

/// Scale for a slider position using the default range.
pub fn slider_position_to_scale(position: f32) -> f32 {
    ScaleRange::default().scale_at(position)
}
