use tracing::trace;

use crate::error::Result;
use crate::topology::Solid;

use super::bsp::Node;
use super::merge::merge_coplanar_polygons;

/// Default depth limit of the BSP trees built by a boolean.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// The boolean operation to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Intersection,
    Difference,
}

/// A boolean between two solids, evaluated on BSP trees of their polygons.
///
/// The result's polygons are regrouped into faces. A result with nothing
/// left is an empty solid, not an error.
pub struct Boolean<'a> {
    a: &'a Solid,
    b: &'a Solid,
    op: BooleanOp,
    max_depth: usize,
}

impl<'a> Boolean<'a> {
    #[must_use]
    pub fn new(a: &'a Solid, b: &'a Solid, op: BooleanOp) -> Self {
        Self {
            a,
            b,
            op,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Executes the boolean.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::RecursionLimit`](crate::error::KernelError::RecursionLimit)
    /// if either tree grows past the depth limit.
    pub fn execute(&self) -> Result<Solid> {
        // A tree without planes clips nothing, so empty operands are
        // resolved up front.
        match (self.op, self.a.is_empty(), self.b.is_empty()) {
            (BooleanOp::Union, true, _) => return Ok(self.b.clone()),
            (BooleanOp::Union | BooleanOp::Difference, _, true) => return Ok(self.a.clone()),
            (_, true, _) | (BooleanOp::Intersection, _, true) => return Ok(Solid::empty()),
            _ => {}
        }

        let mut a = Node::from_polygons(self.a.polygons().cloned().collect(), self.max_depth)?;
        let mut b = Node::from_polygons(self.b.polygons().cloned().collect(), self.max_depth)?;

        match self.op {
            BooleanOp::Union => {
                a.clip_to(&b);
                b.clip_to(&a);
                b.invert();
                b.clip_to(&a);
                b.invert();
                a.build(b.all_polygons(), 0, self.max_depth)?;
            }
            BooleanOp::Difference => {
                a.invert();
                a.clip_to(&b);
                b.clip_to(&a);
                b.invert();
                b.clip_to(&a);
                b.invert();
                a.build(b.all_polygons(), 0, self.max_depth)?;
                a.invert();
            }
            BooleanOp::Intersection => {
                a.invert();
                b.clip_to(&a);
                b.invert();
                a.clip_to(&b);
                b.clip_to(&a);
                a.build(b.all_polygons(), 0, self.max_depth)?;
                a.invert();
            }
        }

        let polygons = a.all_polygons();
        trace!(op = ?self.op, polygons = polygons.len(), "boolean evaluated");
        Ok(Solid::from_faces(merge_coplanar_polygons(polygons)))
    }
}
