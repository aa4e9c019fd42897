//! Planar geometry helpers shared by the arena and every behavior.
//!
//! Everything in this module is a pure function over [`Vec2`] and `f32`.
//! Two distinct contact tests exist and callers must pick the right one:
//!
//! - [`circles_overlap`]: strict `dist < r1 + r2`, used for placement,
//!   player blocking and "reached the target" checks.
//! - [`collides_buffered`]: `dist < r1 + r2 - 0.1 * r1`, used by the default
//!   bounce motion so that grazing contact does not trigger a bounce.

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Fraction of the mover's radius forgiven by [`collides_buffered`].
pub const COLLISION_BUFFER: f32 = 0.1;

/// Fixed rectangular extent of an arena, with the origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Width in world units.
    pub width: f32,
    /// Height in world units.
    pub height: f32,
}

impl Bounds {
    /// Creates bounds of the given size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Clamps a circle center so the whole circle stays inside the bounds.
    ///
    /// Uses `max(r, min(v, extent - r))` per axis, so a circle wider than the
    /// arena is pinned to `r` rather than panicking like [`f32::clamp`].
    #[must_use]
    pub fn clamp_center(&self, pos: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            radius.max(pos.x.min(self.width - radius)),
            radius.max(pos.y.min(self.height - radius)),
        )
    }

    /// Returns true if the circle lies fully inside the bounds.
    #[must_use]
    pub fn contains_circle(&self, pos: Vec2, radius: f32) -> bool {
        pos.x >= radius
            && pos.x <= self.width - radius
            && pos.y >= radius
            && pos.y <= self.height - radius
    }

    /// Returns true if the point lies inside the bounds (edges included).
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Strict circle-circle overlap: touching circles do not overlap.
#[must_use]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    distance(a, b) < ra + rb
}

/// Circle-circle collision with a small buffer taken off the mover's radius.
#[must_use]
pub fn collides_buffered(mover: Vec2, mover_radius: f32, other: Vec2, other_radius: f32) -> bool {
    distance(mover, other) < mover_radius + other_radius - COLLISION_BUFFER * mover_radius
}

/// Heading angle of a vector in radians, measured from +X toward +Y.
#[must_use]
pub fn heading_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Vector of length `speed` pointing along `heading` radians.
#[must_use]
pub fn from_heading(heading: f32, speed: f32) -> Vec2 {
    Vec2::new(heading.cos(), heading.sin()) * speed
}

/// Wraps an angle in radians into `(-PI, PI]`.
#[must_use]
pub fn normalize_angle(mut angle: f32) -> f32 {
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle <= -PI {
        angle += 2.0 * PI;
    }
    angle
}
