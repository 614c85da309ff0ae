use crate::error::{GeometryError, Result};
use crate::math::polygon_3d::{newell_normal, signed_area_3d};
use crate::math::{Point3, Vector3};

use super::curve::{Arc, Line, Segment};
use super::surface::Plane;

/// Maximum gap between consecutive segment endpoints of a closed loop.
pub const CLOSURE_TOLERANCE: f64 = 1e-6;

/// Maximum distance of a loop sample from its fitted plane.
pub const PLANARITY_TOLERANCE: f64 = 1e-6;

/// Chord tolerance used when a loop is sampled for its own queries.
pub const DEFAULT_CHORD_TOLERANCE: f64 = 1e-3;

/// An ordered sequence of line and arc segments.
///
/// A loop is closed when every segment ends where the next one starts and
/// the last one ends at the first start.
#[derive(Debug, Clone, Default)]
pub struct CurveLoop {
    segments: Vec<Segment>,
}

impl CurveLoop {
    #[must_use]
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Builds a closed polyline loop through `points`. Zero-length edges
    /// (repeated points) are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if fewer than three distinct
    /// edges remain.
    pub fn from_points(points: &[Point3]) -> Result<Self> {
        let n = points.len();
        let mut segments = Vec::with_capacity(n);
        for i in 0..n {
            if let Ok(line) = Line::new(points[i], points[(i + 1) % n]) {
                segments.push(Segment::Line(line));
            }
        }
        if segments.len() < 3 {
            return Err(GeometryError::Degenerate("loop needs at least 3 edges".into()).into());
        }
        Ok(Self { segments })
    }

    /// Builds a closed circle of two half arcs.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius or the normal is degenerate.
    pub fn circle(center: Point3, radius: f64, normal: Vector3) -> Result<Self> {
        let plane = Plane::from_normal(center, normal)?;
        let n = *plane.plane_normal();
        let u = *plane.u_dir();
        let first = Arc::new(center, radius, n, u, 0.0, std::f64::consts::PI)?;
        let second = Arc::new(center, radius, n, u, std::f64::consts::PI, std::f64::consts::TAU)?;
        Ok(Self::new(vec![Segment::Arc(first), Segment::Arc(second)]))
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns `true` if the loop is empty or has a gap between segments.
    #[must_use]
    pub fn is_open(&self) -> bool {
        let n = self.segments.len();
        if n == 0 {
            return true;
        }
        (0..n).any(|i| {
            let end = self.segments[i].end_point();
            let next_start = self.segments[(i + 1) % n].start_point();
            (end - next_start).norm() > CLOSURE_TOLERANCE
        })
    }

    /// Returns `true` if any segment is curved.
    #[must_use]
    pub fn has_arc(&self) -> bool {
        self.segments.iter().any(Segment::is_curved)
    }

    /// Total length of all segments.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }

    /// Samples the loop into a closed polygon (first point not repeated).
    #[must_use]
    pub fn tessellate(&self, chord_tolerance: f64) -> Vec<Point3> {
        let mut points = Vec::new();
        for segment in &self.segments {
            let samples = segment.tessellate(chord_tolerance);
            points.extend_from_slice(&samples[..samples.len().saturating_sub(1)]);
        }
        points
    }

    /// Returns `true` if the loop is closed and lies in a single plane.
    #[must_use]
    pub fn has_plane(&self) -> bool {
        !self.is_open() && self.plane().is_ok()
    }

    /// Fits the loop's plane. The normal follows the loop's winding.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for collinear loops and
    /// [`GeometryError::NonPlanarLoop`] when a sample or an arc axis leaves
    /// the plane.
    pub fn plane(&self) -> Result<Plane> {
        let points = self.tessellate(DEFAULT_CHORD_TOLERANCE);
        let plane = Plane::from_points(&points)?;
        if points
            .iter()
            .any(|p| plane.signed_distance(p).abs() > PLANARITY_TOLERANCE)
        {
            return Err(GeometryError::NonPlanarLoop.into());
        }
        let normal = plane.plane_normal();
        let arcs_in_plane = self.segments.iter().all(|s| match s {
            Segment::Arc(arc) => arc.normal().cross(normal).norm() <= PLANARITY_TOLERANCE,
            Segment::Line(_) => true,
        });
        if !arcs_in_plane {
            return Err(GeometryError::NonPlanarLoop.into());
        }
        Ok(plane)
    }

    /// Newell normal of the sampled loop, if it is not degenerate.
    #[must_use]
    pub fn normal(&self) -> Option<Vector3> {
        newell_normal(&self.tessellate(DEFAULT_CHORD_TOLERANCE))
    }

    /// Signed enclosed area, positive when the loop winds counter-clockwise
    /// around `normal`.
    #[must_use]
    pub fn signed_area(&self, normal: &Vector3, chord_tolerance: f64) -> f64 {
        signed_area_3d(&self.tessellate(chord_tolerance), normal)
    }

    /// Returns the loop traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            segments: self.segments.iter().rev().map(Segment::reversed).collect(),
        }
    }

    /// Returns the loop moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Vector3) -> Self {
        Self {
            segments: self.segments.iter().map(|s| s.translated(offset)).collect(),
        }
    }
}
