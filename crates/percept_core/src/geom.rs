//! Planar geometry helpers
//!
//! Angles are degrees, counter-clockwise from +x, normalized to (-180, 180].

use nalgebra::Vector2;

pub type Vec2 = Vector2<f64>;

/// Position on the field (units).
pub type Position = Vec2;

/// Displacement per cycle.
pub type Velocity = Vec2;

const EPS: f64 = 1e-9;

/// Wrap an angle into (-180, 180].
#[inline]
pub fn normalize_angle_deg(a: f64) -> f64 {
    let mut r = a % 360.0;
    if r <= -180.0 {
        r += 360.0;
    } else if r > 180.0 {
        r -= 360.0;
    }
    r
}

/// Heading of a vector in degrees. A zero vector faces 0°.
#[inline]
pub fn dir_deg(v: &Vec2) -> f64 {
    if v.norm_squared() < EPS {
        0.0
    } else {
        v.y.atan2(v.x).to_degrees()
    }
}

/// Bearing of `target` seen from `origin`, relative to `facing_deg`.
#[inline]
pub fn relative_bearing_deg(origin: &Position, target: &Position, facing_deg: f64) -> f64 {
    normalize_angle_deg(dir_deg(&(target - origin)) - facing_deg)
}

/// Smallest absolute difference between two headings.
#[inline]
pub fn angle_diff_deg(a: f64, b: f64) -> f64 {
    normalize_angle_deg(a - b).abs()
}
