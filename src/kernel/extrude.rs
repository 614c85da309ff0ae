use crate::error::{KernelError, Result};
use crate::geometry::curve::{Line, Segment};
use crate::geometry::surface::{Cylinder, Plane};
use crate::geometry::{CurveLoop, DEFAULT_CHORD_TOLERANCE};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::topology::{Face, FaceSurface, Solid};

use super::polygon::Polygon;
use super::triangulate::triangulate;

/// Extrudes a planar profile (outer loop plus holes) along a direction
/// vector to create a solid.
pub struct Extrude<'a> {
    loops: &'a [CurveLoop],
    direction: Vector3,
    chord_tolerance: f64,
}

impl<'a> Extrude<'a> {
    /// Creates a new `Extrude` operation. The loop with the largest area is
    /// the outer boundary; every other loop is a hole.
    #[must_use]
    pub fn new(loops: &'a [CurveLoop], direction: Vector3) -> Self {
        Self {
            loops,
            direction,
            chord_tolerance: DEFAULT_CHORD_TOLERANCE,
        }
    }

    /// Sets the maximum chord deviation used to facet arcs.
    #[must_use]
    pub fn with_chord_tolerance(mut self, chord_tolerance: f64) -> Self {
        self.chord_tolerance = chord_tolerance;
        self
    }

    /// Executes the extrusion.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::InvalidInput`] if the direction is zero-length
    /// or parallel to the profile, or the profile is empty, open or
    /// non-planar; propagates cap triangulation failures.
    pub fn execute(&self) -> Result<Solid> {
        if self.direction.norm() < TOLERANCE {
            return Err(
                KernelError::InvalidInput("extrude direction must be non-zero".into()).into(),
            );
        }
        let axis = self.direction.normalize();

        let oriented = self.orient_loops(&axis)?;
        let base_plane = oriented[0]
            .plane()
            .map_err(|e| KernelError::InvalidInput(format!("profile: {e}")))?;
        if base_plane.plane_normal().dot(&axis) < TOLERANCE {
            return Err(
                KernelError::InvalidInput("extrude direction lies in the profile plane".into())
                    .into(),
            );
        }

        // Sample every segment once so caps and sides share vertices.
        let samples: Vec<Vec<(Segment, Vec<Point3>)>> = oriented
            .iter()
            .map(|l| {
                l.segments()
                    .iter()
                    .map(|s| (s.clone(), s.tessellate(self.chord_tolerance)))
                    .collect()
            })
            .collect();
        let rings: Vec<Vec<Point3>> = samples
            .iter()
            .map(|segments| {
                segments
                    .iter()
                    .flat_map(|(_, pts)| pts[..pts.len() - 1].iter().copied())
                    .collect()
            })
            .collect();

        // Base ring normals align with the direction, so:
        //   - bottom face = reversed base → normal ≈ -direction
        //   - top face = translated base → normal ≈ +direction
        //   - side quads [a, b, b + d, a + d] face outward
        let pieces = triangulate(&base_plane, &rings)?;

        let bottom_plane = base_plane.flipped();
        let bottom_polygons = pieces
            .iter()
            .map(|piece| {
                let reversed: Vec<Point3> = piece.iter().rev().copied().collect();
                Polygon::with_plane(reversed, bottom_plane.clone(), None)
            })
            .collect();
        let bottom = Face::from_parts(
            FaceSurface::Plane(bottom_plane),
            oriented.iter().map(CurveLoop::reversed).collect(),
            bottom_polygons,
        );

        let top_plane = base_plane.translated(&self.direction);
        let top_polygons = pieces
            .iter()
            .map(|piece| {
                let moved = piece.iter().map(|p| p + self.direction).collect();
                Polygon::with_plane(moved, top_plane.clone(), None)
            })
            .collect();
        let top = Face::from_parts(
            FaceSurface::Plane(top_plane),
            oriented.iter().map(|l| l.translated(&self.direction)).collect(),
            top_polygons,
        );

        let mut faces = vec![bottom, top];
        for segments in &samples {
            for (segment, pts) in segments {
                faces.push(self.side_face(segment, pts)?);
            }
        }

        Ok(Solid::from_faces(faces))
    }

    /// Orients the outer loop counter-clockwise around `axis` and holes
    /// clockwise; the outer loop comes first.
    fn orient_loops(&self, axis: &Vector3) -> Result<Vec<CurveLoop>> {
        if self.loops.is_empty() {
            return Err(KernelError::InvalidInput("profile has no loops".into()).into());
        }
        if self.loops.iter().any(CurveLoop::is_open) {
            return Err(KernelError::InvalidInput("profile loop is open".into()).into());
        }

        let areas: Vec<f64> = self
            .loops
            .iter()
            .map(|l| l.signed_area(axis, self.chord_tolerance))
            .collect();
        let (outer_idx, outer_area) = areas
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(i, a)| (i, *a))
            .ok_or_else(|| KernelError::InvalidInput("profile has no loops".into()))?;
        if outer_area.abs() < TOLERANCE {
            return Err(KernelError::InvalidInput("profile encloses no area".into()).into());
        }

        let orient = |l: &CurveLoop, area: f64, ccw: bool| {
            if (area > 0.0) == ccw {
                l.clone()
            } else {
                l.reversed()
            }
        };
        let mut oriented = vec![orient(&self.loops[outer_idx], outer_area, true)];
        for (i, l) in self.loops.iter().enumerate() {
            if i != outer_idx {
                oriented.push(orient(l, areas[i], false));
            }
        }
        Ok(oriented)
    }

    /// Builds the side face swept by one profile segment.
    fn side_face(&self, segment: &Segment, samples: &[Point3]) -> Result<Face> {
        let d = self.direction;
        let quads: Vec<Vec<Point3>> = samples
            .windows(2)
            .map(|w| vec![w[0], w[1], w[1] + d, w[0] + d])
            .collect();

        match segment {
            Segment::Line(_) => {
                let quad = quads.into_iter().next().ok_or_else(|| {
                    KernelError::InvalidInput("line segment has no samples".into())
                })?;
                let plane = Plane::from_points(&quad)?;
                let loops = vec![CurveLoop::from_points(&quad)?];
                Ok(Face::from_parts(
                    FaceSurface::Plane(plane.clone()),
                    loops,
                    vec![Polygon::with_plane(quad, plane, None)],
                ))
            }
            Segment::Arc(arc) => {
                let cylinder = Cylinder::new(*arc.center(), arc.radius(), d)?;
                let mut polygons = Vec::with_capacity(quads.len());
                for quad in quads {
                    polygons.push(Polygon::new(quad, Some(cylinder.clone()))?);
                }
                let start = segment.start_point();
                let end = segment.end_point();
                let boundary = CurveLoop::new(vec![
                    segment.clone(),
                    Segment::Line(Line::new(end, end + d)?),
                    Segment::Arc(arc.translated(&d).reversed()),
                    Segment::Line(Line::new(start + d, start)?),
                ]);
                Ok(Face::from_parts(
                    FaceSurface::Cylinder(cylinder),
                    vec![boundary],
                    polygons,
                ))
            }
        }
    }
}
