use crate::math::{Point3, Vector3};

use super::element::ElementId;

/// A named horizontal reference plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub id: ElementId,
    pub name: String,
    /// Elevation in feet.
    pub elevation: f64,
}

impl Level {
    #[must_use]
    pub fn new(id: ElementId, name: impl Into<String>, elevation: f64) -> Self {
        Self {
            id,
            name: name.into(),
            elevation,
        }
    }
}

/// A named reference line, unbounded in both directions.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub id: ElementId,
    pub name: String,
    pub origin: Point3,
    pub direction: Vector3,
}

impl Grid {
    #[must_use]
    pub fn new(id: ElementId, name: impl Into<String>, origin: Point3, direction: Vector3) -> Self {
        Self {
            id,
            name: name.into(),
            origin,
            direction,
        }
    }
}

/// Returns the level whose elevation is closest to `z`. Ties keep the
/// earlier level.
#[must_use]
pub fn nearest_level(levels: &[Level], z: f64) -> Option<&Level> {
    let mut best: Option<(&Level, f64)> = None;
    for level in levels {
        let distance = (level.elevation - z).abs();
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((level, distance));
        }
    }
    best.map(|(level, _)| level)
}
