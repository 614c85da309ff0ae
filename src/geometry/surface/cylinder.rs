use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// A cylindrical surface in 3D space.
///
/// Defined by a point on the axis, the axis direction and a radius.
/// Faces on a cylinder are faceted approximations; the surface is kept so
/// that facets of one curved face can be regrouped after a boolean.
#[derive(Debug, Clone)]
pub struct Cylinder {
    center: Point3,
    radius: f64,
    axis: Vector3,
}

impl Cylinder {
    /// Creates a new cylinder.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive or the axis is zero-length.
    pub fn new(center: Point3, radius: f64, axis: Vector3) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("cylinder radius must be positive".into()).into(),
            );
        }
        let axis_len = axis.norm();
        if axis_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            center,
            radius,
            axis: axis / axis_len,
        })
    }

    /// Returns a point on the axis.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the unit axis direction.
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Returns `true` if both cylinders describe the same surface: parallel
    /// axes on the same line and equal radii.
    #[must_use]
    pub fn is_same_surface(&self, other: &Self, tol: f64) -> bool {
        if (self.radius - other.radius).abs() > tol {
            return false;
        }
        if self.axis.dot(&other.axis).abs() < 1.0 - tol {
            return false;
        }
        let d = other.center - self.center;
        let off_axis = d - self.axis * d.dot(&self.axis);
        off_axis.norm() <= tol
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn same_surface_along_the_axis() {
        let a = Cylinder::new(Point3::new(0.0, 0.0, 0.0), 1.0, Vector3::new(0.0, 0.0, 1.0)).unwrap();
        let b = Cylinder::new(Point3::new(0.0, 0.0, 5.0), 1.0, Vector3::new(0.0, 0.0, -2.0)).unwrap();
        let c = Cylinder::new(Point3::new(0.5, 0.0, 0.0), 1.0, Vector3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(a.is_same_surface(&b, 1e-6));
        assert!(!a.is_same_surface(&c, 1e-6));
    }

    #[test]
    fn zero_radius_is_rejected() {
        assert!(Cylinder::new(Point3::origin(), 0.0, Vector3::new(0.0, 0.0, 1.0)).is_err());
    }
}
