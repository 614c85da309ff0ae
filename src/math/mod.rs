pub mod polygon_2d;
pub mod polygon_3d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Tolerance used when comparing measured quantities (angles, dot products).
pub const EPSILON: f64 = 1e-9;

/// World up direction.
#[must_use]
pub fn basis_z() -> Vector3 {
    Vector3::new(0.0, 0.0, 1.0)
}

/// Returns `true` when `a` and `b` differ by at most `eps`.
#[must_use]
pub fn is_equal(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Returns `true` when `a <= b`, treating values within `eps` as equal.
#[must_use]
pub fn is_less_or_equal(a: f64, b: f64, eps: f64) -> bool {
    a < b || is_equal(a, b, eps)
}

/// Unsigned angle between two vectors in radians, in `[0, π]`.
///
/// Uses `atan2(|a × b|, a · b)`, which stays accurate near 0 and π.
#[must_use]
pub fn angle_between(a: &Vector3, b: &Vector3) -> f64 {
    a.cross(b).norm().atan2(a.dot(b))
}

/// Rounds `value` to `decimals` decimal places, half away from zero.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
