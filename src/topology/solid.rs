use crate::error::Result;
use crate::geometry::{Aabb, CurveLoop};
use crate::kernel::extrude::Extrude;
use crate::kernel::polygon::Polygon;
use crate::math::{Point3, Vector3, TOLERANCE};

use super::face::Face;

/// A closed polyhedral volume bounded by faces.
///
/// Volume, surface area and centroid are computed once at construction.
/// An empty solid (no faces) is the result of booleans with nothing left.
#[derive(Debug, Clone, Default)]
pub struct Solid {
    faces: Vec<Face>,
    volume: f64,
    surface_area: f64,
    centroid: Point3,
}

impl Solid {
    /// Assembles a solid from its faces.
    #[must_use]
    pub fn from_faces(faces: Vec<Face>) -> Self {
        let mut signed_volume = 0.0;
        let mut moment = Vector3::zeros();
        for polygon in faces.iter().flat_map(Face::polygons) {
            signed_volume += polygon.signed_volume();
            moment += polygon.volume_moment();
        }
        let surface_area = faces.iter().map(Face::area).sum();

        let centroid = if signed_volume.abs() > TOLERANCE {
            Point3::from(moment / signed_volume)
        } else {
            vertex_average(&faces)
        };

        Self {
            faces,
            volume: signed_volume.abs(),
            surface_area,
            centroid,
        }
    }

    /// A solid with no faces and no volume.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Axis-aligned box spanning `min` to `max`.
    ///
    /// # Errors
    ///
    /// Returns an error if the box is flat in any axis.
    pub fn cuboid(min: Point3, max: Point3) -> Result<Self> {
        let base = CurveLoop::from_points(&[
            Point3::new(min.x, min.y, min.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(min.x, max.y, min.z),
        ])?;
        Extrude::new(&[base], Vector3::new(0.0, 0.0, max.z - min.z)).execute()
    }

    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn volume(&self) -> f64 {
        self.volume
    }

    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.surface_area
    }

    #[must_use]
    pub fn centroid(&self) -> Point3 {
        self.centroid
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// A solid is valid when it encloses volume and has a face with area.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.volume > 0.0 && self.faces.iter().any(|f| f.area() > 0.0)
    }

    /// Iterates over every convex piece of every face.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.faces.iter().flat_map(Face::polygons)
    }

    /// Bounding box of all vertices, `None` for an empty solid.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(self.polygons().flat_map(Polygon::vertices))
    }
}

fn vertex_average(faces: &[Face]) -> Point3 {
    let mut sum = Vector3::zeros();
    let mut count = 0.0;
    for v in faces.iter().flat_map(Face::polygons).flat_map(Polygon::vertices) {
        sum += v.coords;
        count += 1.0;
    }
    if count > 0.0 {
        Point3::from(sum / count)
    } else {
        Point3::origin()
    }
}
