use crate::math::{Point3, Vector3};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    #[must_use]
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all `points`, or `None` when empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut aabb = Self::new(first, first);
        for p in iter {
            aabb.min = aabb.min.inf(p);
            aabb.max = aabb.max.sup(p);
        }
        Some(aabb)
    }

    /// Smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Grows the box by `margin` along X and Y only.
    #[must_use]
    pub fn expanded_xy(&self, margin: f64) -> Self {
        let grow = Vector3::new(margin, margin, 0.0);
        Self::new(self.min - grow, self.max + grow)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn from_points_and_expand() {
        let pts = [Point3::new(1.0, 2.0, 3.0), Point3::new(-1.0, 4.0, 0.0)];
        let aabb = Aabb::from_points(&pts).unwrap();
        assert_eq!(aabb.min, Point3::new(-1.0, 2.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 4.0, 3.0));
        let grown = aabb.expanded_xy(0.5);
        assert_eq!(grown.min, Point3::new(-1.5, 1.5, 0.0));
        assert_eq!(grown.max, Point3::new(1.5, 4.5, 3.0));
    }

    #[test]
    fn empty_input_has_no_box() {
        let pts: [Point3; 0] = [];
        assert!(Aabb::from_points(&pts).is_none());
    }
}
