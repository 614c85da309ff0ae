mod arc;
mod line;

pub use arc::Arc;
pub use line::Line;

use crate::math::{Point3, Vector3};

/// Parameter domain for a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    /// Start of the parameter range.
    pub t_min: f64,
    /// End of the parameter range.
    pub t_max: f64,
}

impl CurveDomain {
    /// Creates a new curve domain.
    #[must_use]
    pub fn new(t_min: f64, t_max: f64) -> Self {
        Self { t_min, t_max }
    }
}

/// Trait for bounded parametric curves in 3D space.
pub trait Curve {
    /// Evaluates the curve at parameter `t`.
    fn evaluate(&self, t: f64) -> Point3;

    /// Returns the parameter domain of the curve.
    fn domain(&self) -> CurveDomain;

    /// Returns the arc length of the curve.
    fn length(&self) -> f64;

    /// Returns the point at the start of the domain.
    fn start_point(&self) -> Point3 {
        self.evaluate(self.domain().t_min)
    }

    /// Returns the point at the end of the domain.
    fn end_point(&self) -> Point3 {
        self.evaluate(self.domain().t_max)
    }
}

/// One segment of a [`CurveLoop`](crate::geometry::CurveLoop).
#[derive(Debug, Clone)]
pub enum Segment {
    /// A straight line segment.
    Line(Line),
    /// A circular arc.
    Arc(Arc),
}

impl Segment {
    #[must_use]
    pub fn start_point(&self) -> Point3 {
        match self {
            Self::Line(line) => *line.start(),
            Self::Arc(arc) => arc.start_point(),
        }
    }

    #[must_use]
    pub fn end_point(&self) -> Point3 {
        match self {
            Self::Line(line) => *line.end(),
            Self::Arc(arc) => arc.end_point(),
        }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        match self {
            Self::Line(line) => line.length(),
            Self::Arc(arc) => arc.length(),
        }
    }

    /// Returns `true` for curved segments.
    #[must_use]
    pub fn is_curved(&self) -> bool {
        matches!(self, Self::Arc(_))
    }

    /// Samples the segment into a polyline, start and end included.
    #[must_use]
    pub fn tessellate(&self, chord_tolerance: f64) -> Vec<Point3> {
        match self {
            Self::Line(line) => vec![*line.start(), *line.end()],
            Self::Arc(arc) => arc.tessellate(chord_tolerance),
        }
    }

    /// Returns the segment traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        match self {
            Self::Line(line) => Self::Line(line.reversed()),
            Self::Arc(arc) => Self::Arc(arc.reversed()),
        }
    }

    /// Returns the segment moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Vector3) -> Self {
        match self {
            Self::Line(line) => Self::Line(line.translated(offset)),
            Self::Arc(arc) => Self::Arc(arc.translated(offset)),
        }
    }
}
