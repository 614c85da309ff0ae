use crate::error::{GeometryError, Result};
use crate::math::polygon_3d::newell_normal;
use crate::math::{Point2, Point3, Vector3, TOLERANCE};

/// An infinite oriented plane in 3D space.
///
/// Defined by an origin point, and two orthogonal direction vectors
/// (`u_dir`, `v_dir`). The normal is `u_dir × v_dir`.
///
/// Parametric form: `P(u, v) = origin + u * u_dir + v * v_dir`.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Creates a new plane from an origin and two direction vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction vectors are zero-length
    /// or parallel (degenerate plane).
    pub fn new(origin: Point3, u_dir: Vector3, v_dir: Vector3) -> Result<Self> {
        let u_len = u_dir.norm();
        let v_len = v_dir.norm();
        if u_len < TOLERANCE || v_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let u_dir = u_dir / u_len;

        let normal = u_dir.cross(&(v_dir / v_len));
        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(
                GeometryError::Degenerate("plane directions are parallel".into()).into(),
            );
        }
        let normal = normal / normal_len;
        // Re-orthogonalize so projection round-trips exactly.
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Creates a plane from an origin and a normal vector.
    ///
    /// The U and V directions are computed automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;

        // Choose a reference vector not parallel to the normal
        let reference = if normal.x.abs() < 0.9 {
            Vector3::new(1.0, 0.0, 0.0)
        } else {
            Vector3::new(0.0, 1.0, 0.0)
        };

        let u_dir = normal.cross(&reference).normalize();
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Fits a plane through a polygon. The normal follows the polygon's
    /// winding (Newell's method) and the origin is its first vertex.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for fewer than three points or
    /// collinear input.
    pub fn from_points(points: &[Point3]) -> Result<Self> {
        let Some(first) = points.first() else {
            return Err(GeometryError::Degenerate("plane needs at least 3 points".into()).into());
        };
        let normal = newell_normal(points)
            .ok_or_else(|| GeometryError::Degenerate("collinear polygon".into()))?;
        Self::from_normal(*first, normal)
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the U direction vector.
    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    /// Returns the V direction vector.
    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Returns the normal vector of the plane.
    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Signed offset of the plane from the world origin along its normal.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.origin.coords.dot(&self.normal)
    }

    /// Signed distance from `point` to the plane, positive on the normal side.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        (point - self.origin).dot(&self.normal)
    }

    /// Returns the same plane with the opposite orientation.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            u_dir: self.u_dir,
            v_dir: -self.v_dir,
            normal: -self.normal,
        }
    }

    /// Returns the plane moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Vector3) -> Self {
        Self {
            origin: self.origin + offset,
            ..self.clone()
        }
    }

    /// Projects a point into the plane's `(u, v)` coordinates.
    #[must_use]
    pub fn project(&self, point: &Point3) -> Point2 {
        let d = point - self.origin;
        Point2::new(d.dot(&self.u_dir), d.dot(&self.v_dir))
    }

    /// Maps `(u, v)` coordinates back onto the plane.
    #[must_use]
    pub fn evaluate(&self, uv: &Point2) -> Point3 {
        self.origin + self.u_dir * uv.x + self.v_dir * uv.y
    }

    /// Returns `true` if both planes have the same orientation and position
    /// within the given tolerances.
    #[must_use]
    pub fn is_coincident(&self, other: &Self, normal_tol: f64, distance_tol: f64) -> bool {
        (self.normal.dot(&other.normal) - 1.0).abs() <= normal_tol
            && (self.offset() - other.offset()).abs() <= distance_tol
    }
}
