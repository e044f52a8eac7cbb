//! Scalar and 2D helpers shared by the generator, the casters and gameplay.
use std::f32::consts::{PI, TAU};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dist(self, other: Vec2) -> f32 {
        dist(self.x, self.y, other.x, other.y)
    }

    /// Heading from `self` towards `other`.
    #[inline]
    pub fn angle_to(self, other: Vec2) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

#[inline]
pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 {
    if x < lo { lo } else if x > hi { hi } else { x }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn dist(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    (ax - bx).hypot(ay - by)
}

/// Normaliza un ángulo a (-pi, pi].
#[inline]
pub fn wrap_angle(mut a: f32) -> f32 {
    while a > PI { a -= TAU; }
    while a <= -PI { a += TAU; }
    a
}

/// Signed shortest rotation taking `b` onto `a`.
#[inline]
pub fn angle_diff(a: f32, b: f32) -> f32 {
    wrap_angle(a - b)
}
