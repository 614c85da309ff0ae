//! Failure-tolerant solid algebra on top of a [`SolidKernel`].
//!
//! Kernel errors never escape from here: each operation has a local
//! fallback and logs what it skipped.

use tracing::debug;

use crate::config::ClassificationTolerance;
use crate::kernel::SolidKernel;
use crate::math::round_to;
use crate::topology::Solid;

/// Spatial relationship between two solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Disjoint,
    Touching,
    Intersecting,
    /// The measures fit no pattern, or a boolean failed.
    Indeterminate,
}

impl Contact {
    /// Touching and intersecting solids are treated alike downstream.
    #[must_use]
    pub fn is_intersecting(self) -> bool {
        matches!(self, Self::Touching | Self::Intersecting)
    }
}

/// Unions all solids with positive volume, pairwise from the first.
///
/// An operand whose union fails is left out. Returns `None` when no solid
/// has volume.
pub fn union_all<K: SolidKernel + ?Sized>(kernel: &K, solids: &[Solid]) -> Option<Solid> {
    let mut operands = solids.iter().filter(|s| s.volume() > 0.0);
    let mut acc = operands.next()?.clone();
    for solid in operands {
        match kernel.union(&acc, solid) {
            Ok(union) => acc = union,
            Err(e) => debug!(error = %e, "union operand dropped"),
        }
    }
    Some(acc)
}

/// Classifies the relationship of `a` and `b` by comparing the surface
/// area and face count of their union against the operands.
///
/// Shared boundary makes the union lose area and faces; the intersection
/// volume then separates touching from overlapping solids.
pub fn classify<K: SolidKernel + ?Sized>(
    kernel: &K,
    a: &Solid,
    b: &Solid,
    tolerance: &ClassificationTolerance,
) -> Contact {
    if a.volume() <= 0.0 || b.volume() <= 0.0 {
        return Contact::Indeterminate;
    }
    let (union, intersection) = match (kernel.union(a, b), kernel.intersect(a, b)) {
        (Ok(u), Ok(i)) => (u, i),
        (Err(e), _) | (_, Err(e)) => {
            debug!(error = %e, "classification boolean failed");
            return Contact::Indeterminate;
        }
    };

    let decimals = tolerance.area_decimals;
    let sum_area = round_to(a.surface_area() + b.surface_area(), decimals);
    let union_area = round_to(union.surface_area(), decimals);
    let sum_faces = a.face_count() + b.face_count();
    let union_faces = union.face_count();
    let overlap = intersection.volume();

    // Both areas are rounded, so exact comparison is intended.
    #[allow(clippy::float_cmp)]
    let same_area = sum_area == union_area;

    if same_area && sum_faces == union_faces && overlap < tolerance.volume {
        Contact::Disjoint
    } else if sum_area > union_area && sum_faces > union_faces {
        if overlap > tolerance.volume {
            Contact::Intersecting
        } else if overlap < tolerance.volume {
            Contact::Touching
        } else {
            Contact::Indeterminate
        }
    } else {
        Contact::Indeterminate
    }
}

/// Returns `true` when `a` and `b` touch or overlap.
pub fn is_intersecting<K: SolidKernel + ?Sized>(
    kernel: &K,
    a: &Solid,
    b: &Solid,
    tolerance: &ClassificationTolerance,
) -> bool {
    classify(kernel, a, b, tolerance).is_intersecting()
}

/// Subtracts `b` from `a`; on failure `a` is returned unchanged.
pub fn difference<K: SolidKernel + ?Sized>(kernel: &K, a: &Solid, b: &Solid) -> Solid {
    kernel.difference(a, b).unwrap_or_else(|e| {
        debug!(error = %e, "difference failed, keeping operand untrimmed");
        a.clone()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{KernelError, Result};
    use crate::geometry::CurveLoop;
    use crate::kernel::BspKernel;
    use crate::math::{Point3, Vector3};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn cube(x: f64, y: f64, z: f64, size: f64) -> Solid {
        Solid::cuboid(p(x, y, z), p(x + size, y + size, z + size)).unwrap()
    }

    /// Kernel whose booleans always fail.
    struct FailingKernel;

    impl SolidKernel for FailingKernel {
        fn union(&self, _: &Solid, _: &Solid) -> Result<Solid> {
            Err(KernelError::InvalidInput("union".into()).into())
        }
        fn intersect(&self, _: &Solid, _: &Solid) -> Result<Solid> {
            Err(KernelError::InvalidInput("intersect".into()).into())
        }
        fn difference(&self, _: &Solid, _: &Solid) -> Result<Solid> {
            Err(KernelError::InvalidInput("difference".into()).into())
        }
        fn extrude(&self, _: &[CurveLoop], _: &Vector3) -> Result<Solid> {
            Err(KernelError::InvalidInput("extrude".into()).into())
        }
    }

    // ── Union ──────────────────────────────────────────────────

    #[test]
    fn union_of_nothing_is_none() {
        let kernel = BspKernel::new();
        assert!(union_all(&kernel, &[]).is_none());
        assert!(union_all(&kernel, &[Solid::empty()]).is_none());
    }

    #[test]
    fn union_order_does_not_change_measure() {
        let kernel = BspKernel::new();
        let a = cube(0.0, 0.0, 0.0, 2.0);
        let b = cube(1.0, 1.0, 1.0, 2.0);
        let ab = union_all(&kernel, &[a.clone(), b.clone()]).unwrap();
        let ba = union_all(&kernel, &[b, a]).unwrap();
        assert!((ab.volume() - 15.0).abs() < 1e-6);
        assert!((ab.volume() - ba.volume()).abs() < 1e-6);
    }

    #[test]
    fn failing_union_keeps_first_operand() {
        let a = cube(0.0, 0.0, 0.0, 1.0);
        let b = cube(0.5, 0.0, 0.0, 1.0);
        let u = union_all(&FailingKernel, &[a, b]).unwrap();
        assert!((u.volume() - 1.0).abs() < 1e-12);
    }

    // ── Classification ─────────────────────────────────────────

    #[test]
    fn disjoint_cubes() {
        let kernel = BspKernel::new();
        let tol = ClassificationTolerance::default();
        let a = cube(0.0, 0.0, 0.0, 1.0);
        let b = cube(5.0, 0.0, 0.0, 1.0);
        assert_eq!(classify(&kernel, &a, &b, &tol), Contact::Disjoint);
        assert!(!is_intersecting(&kernel, &b, &a, &tol));
    }

    #[test]
    fn touching_cubes() {
        let kernel = BspKernel::new();
        let tol = ClassificationTolerance::default();
        let a = cube(0.0, 0.0, 0.0, 1.0);
        let b = cube(1.0, 0.0, 0.0, 1.0);
        assert_eq!(classify(&kernel, &a, &b, &tol), Contact::Touching);
        assert!(is_intersecting(&kernel, &a, &b, &tol));
    }

    #[test]
    fn overlapping_cubes_are_symmetric() {
        let kernel = BspKernel::new();
        let tol = ClassificationTolerance::default();
        let a = cube(0.0, 0.0, 0.0, 2.0);
        let b = cube(1.0, 0.0, 0.0, 2.0);
        assert_eq!(classify(&kernel, &a, &b, &tol), Contact::Intersecting);
        assert_eq!(classify(&kernel, &b, &a, &tol), Contact::Intersecting);
        assert_eq!(
            is_intersecting(&kernel, &a, &b, &tol),
            is_intersecting(&kernel, &b, &a, &tol)
        );
    }

    #[test]
    fn failures_and_empty_operands_are_not_intersecting() {
        let tol = ClassificationTolerance::default();
        let a = cube(0.0, 0.0, 0.0, 2.0);
        let b = cube(1.0, 1.0, 1.0, 2.0);
        assert_eq!(classify(&FailingKernel, &a, &b, &tol), Contact::Indeterminate);
        assert!(!is_intersecting(&BspKernel::new(), &a, &Solid::empty(), &tol));
    }

    // ── Difference ─────────────────────────────────────────────

    #[test]
    fn difference_trims() {
        let kernel = BspKernel::new();
        let a = cube(0.0, 0.0, 0.0, 2.0);
        let b = cube(1.0, 1.0, 1.0, 2.0);
        assert!((difference(&kernel, &a, &b).volume() - 7.0).abs() < 1e-6);
    }

    #[test]
    fn failing_difference_returns_operand() {
        let a = cube(0.0, 0.0, 0.0, 2.0);
        let b = cube(1.0, 1.0, 1.0, 2.0);
        let d = difference(&FailingKernel, &a, &b);
        assert!((d.volume() - 8.0).abs() < 1e-12);
    }
}
