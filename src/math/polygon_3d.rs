use super::{Point3, Vector3, TOLERANCE};

/// Computes the unit normal of a polygon using Newell's method.
///
/// Returns `None` for degenerate (collinear or empty) input.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Option<Vector3> {
    let raw = newell_vector(points);
    let len = raw.norm();
    if len < TOLERANCE {
        return None;
    }
    Some(raw / len)
}

/// Unnormalized Newell vector: twice the vector area of the polygon.
#[must_use]
pub fn newell_vector(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut normal = Vector3::new(0.0, 0.0, 0.0);
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    normal
}

/// Compute the area of a 3D polygon (coplanar points).
///
/// Uses the cross-product summation method projected along the polygon normal.
#[must_use]
pub fn polygon_area_3d(points: &[Point3], normal: &Vector3) -> f64 {
    signed_area_3d(points, normal).abs()
}

/// Signed area of a coplanar polygon, positive when its winding is
/// counter-clockwise seen from the tip of `normal`.
#[must_use]
pub fn signed_area_3d(points: &[Point3], normal: &Vector3) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let mut cross_sum = Vector3::new(0.0, 0.0, 0.0);
    let o = &points[0];
    for i in 1..n {
        let a = points[i] - o;
        let b = points[(i + 1) % n] - o;
        cross_sum += a.cross(&b);
    }
    0.5 * cross_sum.dot(normal)
}

/// Distance from `point` to the segment `a`-`b` and the clamped parameter of
/// the closest point.
#[must_use]
pub fn point_segment_distance(point: &Point3, a: &Point3, b: &Point3) -> (f64, f64) {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return ((point - a).norm(), 0.0);
    }
    let t = ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    ((point - (a + ab * t)).norm(), t)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn unit_square() -> Vec<Point3> {
        vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn newell_normal_of_ccw_square_points_up() {
        let n = newell_normal(&unit_square()).unwrap();
        assert!((n.z - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn newell_normal_of_collinear_points_is_none() {
        let pts = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        assert!(newell_normal(&pts).is_none());
    }

    #[test]
    fn signed_area_follows_winding() {
        let up = Vector3::new(0.0, 0.0, 1.0);
        let square = unit_square();
        assert!((signed_area_3d(&square, &up) - 1.0).abs() < TOLERANCE);
        let reversed: Vec<Point3> = square.into_iter().rev().collect();
        assert!((signed_area_3d(&reversed, &up) + 1.0).abs() < TOLERANCE);
        assert!((polygon_area_3d(&reversed, &up) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn point_segment_distance_clamps() {
        let (d, t) = point_segment_distance(&p(3.0, 1.0, 0.0), &p(0.0, 0.0, 0.0), &p(2.0, 0.0, 0.0));
        assert!((t - 1.0).abs() < TOLERANCE);
        assert!((d - 2f64.sqrt()).abs() < TOLERANCE);
    }
}
