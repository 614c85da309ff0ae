use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// A line segment between two points.
///
/// The parametric form is: `P(t) = start + t * (end - start)`, `t ∈ [0, 1]`.
#[derive(Debug, Clone)]
pub struct Line {
    start: Point3,
    end: Point3,
}

impl Line {
    /// Creates a new line segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints coincide.
    pub fn new(start: Point3, end: Point3) -> Result<Self> {
        if (end - start).norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self { start, end })
    }

    /// Returns the start point.
    #[must_use]
    pub fn start(&self) -> &Point3 {
        &self.start
    }

    /// Returns the end point.
    #[must_use]
    pub fn end(&self) -> &Point3 {
        &self.end
    }

    /// Returns the unit direction from start to end.
    #[must_use]
    pub fn direction(&self) -> Vector3 {
        (self.end - self.start).normalize()
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
        }
    }

    #[must_use]
    pub fn translated(&self, offset: &Vector3) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

impl Curve for Line {
    fn evaluate(&self, t: f64) -> Point3 {
        self.start + (self.end - self.start) * t
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, 1.0)
    }

    fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    fn start_point(&self) -> Point3 {
        self.start
    }

    fn end_point(&self) -> Point3 {
        self.end
    }
}
