//! 3-D point and vector helpers.
//! Thin wrappers over `glam::DVec3` that never produce NaN from bad input.
use glam::DVec3;

/// A position in scene space (metres).
pub type Point = DVec3;

/// A displacement or velocity (metres, metres per second).
pub type Vector = DVec3;

/// Squared Euclidean distance between two points.
///
/// Callers doing nearest-neighbour comparisons should prefer this over
/// [`distance`] to avoid the square root.
pub fn distance_squared(a: Point, b: Point) -> f64 {
    a.distance_squared(b)
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Returns the unit vector in the direction of `v`.
///
/// Returns the zero vector when `v` is zero-length or has non-finite
/// components.
pub fn normalize(v: Vector) -> Vector {
    if !v.is_finite() {
        return DVec3::ZERO;
    }
    v.try_normalize().unwrap_or(DVec3::ZERO)
}

/// Unit vector pointing from `from` towards `to`, or zero if they coincide.
pub fn heading(from: Point, to: Point) -> Vector {
    normalize(to - from)
}
