use tracing::debug;

use crate::config::FormworkConfig;
use crate::geometry::curve::Segment;
use crate::geometry::CurveLoop;
use crate::math::{angle_between, basis_z, is_less_or_equal, EPSILON};
use crate::topology::{Face, Solid};

/// Selects the faces of a solid that receive formwork and cleans up their
/// boundary loops.
#[derive(Debug, Clone, Copy)]
pub struct FaceFilter {
    /// Faces with area at or below this are noise (ft²).
    min_area: f64,
    /// Minimum angle between the face normal and +Z, in degrees.
    min_angle_deg: f64,
    /// Line segments no longer than this are elided (ft).
    min_edge_length: f64,
}

impl FaceFilter {
    #[must_use]
    pub fn new(min_area: f64, min_angle_deg: f64, min_edge_length: f64) -> Self {
        Self {
            min_area,
            min_angle_deg,
            min_edge_length,
        }
    }

    #[must_use]
    pub fn from_config(config: &FormworkConfig) -> Self {
        Self::new(
            config.min_skip_face_area(),
            config.min_face_angle_deg,
            config.min_skip_edge_length(),
        )
    }

    /// A face is eligible when it is planar, larger than the skip area and
    /// tilted at least the minimum angle away from +Z. Soffits (normal
    /// pointing down) are eligible; tops are not.
    #[must_use]
    pub fn is_eligible(&self, face: &Face) -> bool {
        let Some(normal) = face.normal() else {
            return false;
        };
        if face.area() <= self.min_area || face.area() <= 0.0 {
            return false;
        }
        let angle = angle_between(&basis_z(), &normal).to_degrees();
        is_less_or_equal(self.min_angle_deg, angle, EPSILON)
    }

    /// Eligible faces of `solid`, in face order.
    pub fn eligible_faces<'a>(&'a self, solid: &'a Solid) -> impl Iterator<Item = &'a Face> + 'a {
        solid.faces().iter().filter(|face| self.is_eligible(face))
    }

    /// Simplified boundary loops of `face`.
    ///
    /// Open and non-planar loops are dropped. Loops with arcs pass through.
    /// Straight loops are rebuilt from the start points of the segments
    /// longer than the minimum edge length.
    #[must_use]
    pub fn optimize_loops(&self, face: &Face) -> Vec<CurveLoop> {
        face.loops()
            .iter()
            .filter_map(|curve_loop| self.optimize_loop(curve_loop))
            .collect()
    }

    fn optimize_loop(&self, curve_loop: &CurveLoop) -> Option<CurveLoop> {
        if curve_loop.is_open() || !curve_loop.has_plane() {
            return None;
        }
        if curve_loop.has_arc() {
            return Some(curve_loop.clone());
        }

        let points: Vec<_> = curve_loop
            .segments()
            .iter()
            .filter_map(|segment| match segment {
                Segment::Line(line) if segment.length() > self.min_edge_length => {
                    Some(*line.start())
                }
                _ => None,
            })
            .collect();
        if points.len() < 3 {
            return None;
        }

        match CurveLoop::from_points(&points) {
            Ok(rebuilt) if !rebuilt.is_open() && rebuilt.has_plane() => Some(rebuilt),
            Ok(_) => {
                debug!("rebuilt loop is not planar, dropped");
                None
            }
            Err(e) => {
                debug!(error = %e, "loop could not be rebuilt, dropped");
                None
            }
        }
    }
}
