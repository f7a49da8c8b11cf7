use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in the horizontal (XZ) plane.
///
/// Invariant: `min.x <= max.x` and `min.y <= max.y`.
/// The constructor enforces this by swapping components if needed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect2 {
    /// Create a rectangle from two corners.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create a rectangle from its center and full size.
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// The point inside the rectangle nearest to `p`.
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    /// Squared distance from `p` to the nearest point of the rectangle.
    ///
    /// Zero when the point is inside.
    pub fn sqr_distance(&self, p: Vec2) -> f32 {
        self.closest_point(p).distance_squared(p)
    }

    /// Distance from `p` to the nearest edge (zero inside).
    pub fn distance(&self, p: Vec2) -> f32 {
        self.sqr_distance(p).sqrt()
    }
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position of `v` between `a` and `b`, clamped to `[0, 1]`.
///
/// A degenerate range (`a == b`) yields 0.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((v - a) / (b - a)).clamp(0.0, 1.0)
}
