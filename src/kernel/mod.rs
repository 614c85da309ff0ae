//! Solid booleans and extrusion.
//!
//! The pipeline only talks to geometry through [`SolidKernel`]. A host
//! platform with its own geometry engine implements the trait; [`BspKernel`]
//! is the built-in provider working on polygonal solids.

pub mod boolean;
pub mod bsp;
pub mod extrude;
pub mod merge;
pub mod polygon;
pub mod triangulate;

use crate::error::Result;
use crate::geometry::{CurveLoop, DEFAULT_CHORD_TOLERANCE};
use crate::math::Vector3;
use crate::topology::Solid;

pub use boolean::{Boolean, BooleanOp, DEFAULT_MAX_DEPTH};
pub use extrude::Extrude;

/// Geometry operations consumed by formwork synthesis.
pub trait SolidKernel {
    /// Boolean union of two solids.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel cannot evaluate the boolean.
    fn union(&self, a: &Solid, b: &Solid) -> Result<Solid>;

    /// Boolean intersection of two solids.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel cannot evaluate the boolean.
    fn intersect(&self, a: &Solid, b: &Solid) -> Result<Solid>;

    /// Boolean difference `a - b`.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel cannot evaluate the boolean.
    fn difference(&self, a: &Solid, b: &Solid) -> Result<Solid>;

    /// Extrudes a planar profile (outer loop and holes) along `direction`.
    ///
    /// # Errors
    ///
    /// Returns an error for degenerate profiles or directions.
    fn extrude(&self, loops: &[CurveLoop], direction: &Vector3) -> Result<Solid>;
}

/// BSP-tree solid kernel.
#[derive(Debug, Clone, Copy)]
pub struct BspKernel {
    max_depth: usize,
    chord_tolerance: f64,
}

impl Default for BspKernel {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            chord_tolerance: DEFAULT_CHORD_TOLERANCE,
        }
    }
}

impl BspKernel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the depth of the BSP trees; deeper inputs fail the boolean.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the chord tolerance used to facet arcs during extrusion.
    #[must_use]
    pub fn with_chord_tolerance(mut self, chord_tolerance: f64) -> Self {
        self.chord_tolerance = chord_tolerance;
        self
    }

    fn boolean(&self, a: &Solid, b: &Solid, op: BooleanOp) -> Result<Solid> {
        Boolean::new(a, b, op).with_max_depth(self.max_depth).execute()
    }
}

impl SolidKernel for BspKernel {
    fn union(&self, a: &Solid, b: &Solid) -> Result<Solid> {
        self.boolean(a, b, BooleanOp::Union)
    }

    fn intersect(&self, a: &Solid, b: &Solid) -> Result<Solid> {
        self.boolean(a, b, BooleanOp::Intersection)
    }

    fn difference(&self, a: &Solid, b: &Solid) -> Result<Solid> {
        self.boolean(a, b, BooleanOp::Difference)
    }

    fn extrude(&self, loops: &[CurveLoop], direction: &Vector3) -> Result<Solid> {
        Extrude::new(loops, *direction)
            .with_chord_tolerance(self.chord_tolerance)
            .execute()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;

    #[test]
    fn shallow_depth_limit_fails_boolean() {
        let a = Solid::cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0)).unwrap();
        let b = Solid::cuboid(Point3::new(1.0, 1.0, 1.0), Point3::new(3.0, 3.0, 3.0)).unwrap();
        let kernel = BspKernel::new().with_max_depth(2);
        assert!(kernel.union(&a, &b).is_err());
        assert!(BspKernel::new().union(&a, &b).is_ok());
    }
}
