use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// A circular arc in 3D space.
///
/// Defined by a center, radius, normal axis, and a reference direction
/// for the zero-angle. The parametric form sweeps from `start_angle`
/// to `end_angle` (in radians, `start < end`) counter-clockwise around
/// the normal axis.
#[derive(Debug, Clone)]
pub struct Arc {
    center: Point3,
    radius: f64,
    normal: Vector3,
    ref_dir: Vector3,
    start_angle: f64,
    end_angle: f64,
}

impl Arc {
    /// Creates a new arc.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the arc circle
    /// * `radius` - Radius (must be positive)
    /// * `normal` - Normal vector defining the arc plane
    /// * `ref_dir` - Reference direction for angle = 0 (must be perpendicular to normal)
    /// * `start_angle` - Start angle in radians
    /// * `end_angle` - End angle in radians, greater than `start_angle`
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, the sweep is empty,
    /// the normal is zero-length, or the reference direction is not
    /// perpendicular to the normal.
    pub fn new(
        center: Point3,
        radius: f64,
        normal: Vector3,
        ref_dir: Vector3,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("arc radius must be positive".into()).into());
        }
        if end_angle - start_angle < TOLERANCE {
            return Err(GeometryError::Degenerate("arc sweep must be positive".into()).into());
        }

        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / normal_len;

        let ref_len = ref_dir.norm();
        if ref_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let ref_dir = ref_dir / ref_len;

        if normal.dot(&ref_dir).abs() > 1e-9 {
            return Err(GeometryError::Degenerate(
                "reference direction must be perpendicular to normal".into(),
            )
            .into());
        }

        Ok(Self {
            center,
            radius,
            normal,
            ref_dir,
            start_angle,
            end_angle,
        })
    }

    /// Returns the center of the arc.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius of the arc.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the normal vector of the arc plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the swept angle in radians.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Returns the same arc traversed from end to start.
    ///
    /// Flipping the normal mirrors the angle parameter, so the reversed arc
    /// sweeps `[-end, -start]` and visits the same points.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            center: self.center,
            radius: self.radius,
            normal: -self.normal,
            ref_dir: self.ref_dir,
            start_angle: -self.end_angle,
            end_angle: -self.start_angle,
        }
    }

    #[must_use]
    pub fn translated(&self, offset: &Vector3) -> Self {
        Self {
            center: self.center + offset,
            ..self.clone()
        }
    }

    /// Samples the arc into a polyline whose chords deviate from the arc by
    /// at most `chord_tolerance`. Both endpoints are included.
    #[must_use]
    pub fn tessellate(&self, chord_tolerance: f64) -> Vec<Point3> {
        let n = arc_subdivision_count(self.radius, self.sweep(), chord_tolerance);
        let step = self.sweep() / f64::from(n);
        (0..=n)
            .map(|i| self.evaluate(self.start_angle + step * f64::from(i)))
            .collect()
    }

    /// Computes the second axis direction (perpendicular to both normal and `ref_dir`).
    fn binormal(&self) -> Vector3 {
        self.normal.cross(&self.ref_dir)
    }
}

impl Curve for Arc {
    fn evaluate(&self, t: f64) -> Point3 {
        let binormal = self.binormal();
        let x = self.radius * t.cos();
        let y = self.radius * t.sin();
        self.center + self.ref_dir * x + binormal * y
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(self.start_angle, self.end_angle)
    }

    fn length(&self) -> f64 {
        self.radius * self.sweep()
    }
}

/// Computes the number of line segments needed to approximate an arc
/// within the given tolerance.
fn arc_subdivision_count(radius: f64, abs_sweep: f64, tolerance: f64) -> u32 {
    if radius < 1e-12 || abs_sweep < 1e-12 || tolerance <= 0.0 {
        return 1;
    }
    // From the sagitta formula: sagitta = r * (1 - cos(θ/2))
    let max_angle = if tolerance >= radius {
        std::f64::consts::PI
    } else {
        2.0 * (1.0 - tolerance / radius).acos()
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (abs_sweep / max_angle).ceil() as u32;
    n.clamp(1, 4096)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;

    fn quarter() -> Arc {
        Arc::new(
            Point3::origin(),
            2.0,
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            0.0,
            FRAC_PI_2,
        )
        .unwrap()
    }

    #[test]
    fn endpoints_and_length() {
        let arc = quarter();
        assert!((arc.start_point() - Point3::new(2.0, 0.0, 0.0)).norm() < TOLERANCE);
        assert!((arc.end_point() - Point3::new(0.0, 2.0, 0.0)).norm() < TOLERANCE);
        assert!((arc.length() - PI).abs() < TOLERANCE);
    }

    #[test]
    fn reversed_swaps_endpoints() {
        let rev = quarter().reversed();
        assert!((rev.start_point() - Point3::new(0.0, 2.0, 0.0)).norm() < 1e-12);
        assert!((rev.end_point() - Point3::new(2.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn reversed_tessellation_mirrors_forward() {
        let arc = quarter();
        let fwd = arc.tessellate(1e-3);
        let mut back = arc.reversed().tessellate(1e-3);
        back.reverse();
        assert_eq!(fwd.len(), back.len());
        for (a, b) in fwd.iter().zip(&back) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn tessellation_respects_sagitta() {
        let arc = quarter();
        let pts = arc.tessellate(1e-3);
        for w in pts.windows(2) {
            let mid = Point3::from((w[0].coords + w[1].coords) * 0.5);
            let sagitta = 2.0 - mid.coords.norm();
            assert!(sagitta <= 1e-3 + 1e-12);
        }
    }

    #[test]
    fn subdivision_count_bounds() {
        assert_eq!(arc_subdivision_count(1.0, PI, 10.0), 1);
        assert!(arc_subdivision_count(1.0, PI, 1e-6) > 100);
    }

    #[test]
    fn empty_sweep_is_rejected() {
        let arc = Arc::new(
            Point3::origin(),
            1.0,
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            1.0,
            1.0,
        );
        assert!(arc.is_err());
    }
}
