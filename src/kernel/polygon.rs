use crate::error::Result;
use crate::geometry::surface::{Cylinder, Plane};
use crate::math::polygon_3d::polygon_area_3d;
use crate::math::{Point3, Vector3};

/// A convex planar polygon, the unit of work of the BSP booleans.
///
/// `surface` records the curved surface the polygon approximates, if any,
/// so that facets can be regrouped into one face afterwards. Fragments
/// produced by splitting keep their parent's plane.
#[derive(Debug, Clone)]
pub struct Polygon {
    vertices: Vec<Point3>,
    plane: Plane,
    surface: Option<Cylinder>,
}

impl Polygon {
    /// Creates a polygon whose plane is fitted from its vertices.
    ///
    /// # Errors
    ///
    /// Returns an error for fewer than three or collinear vertices.
    pub fn new(vertices: Vec<Point3>, surface: Option<Cylinder>) -> Result<Self> {
        let plane = Plane::from_points(&vertices)?;
        Ok(Self {
            vertices,
            plane,
            surface,
        })
    }

    /// Creates a polygon on a known plane.
    #[must_use]
    pub fn with_plane(vertices: Vec<Point3>, plane: Plane, surface: Option<Cylinder>) -> Self {
        Self {
            vertices,
            plane,
            surface,
        }
    }

    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    #[must_use]
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    #[must_use]
    pub fn surface(&self) -> Option<&Cylinder> {
        self.surface.as_ref()
    }

    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        self.plane.plane_normal()
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        polygon_area_3d(&self.vertices, self.plane.plane_normal())
    }

    /// Reverses the winding and the plane orientation.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane = self.plane.flipped();
    }

    /// Returns the polygon moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Vector3) -> Self {
        Self {
            vertices: self.vertices.iter().map(|p| p + offset).collect(),
            plane: self.plane.translated(offset),
            surface: self.surface.clone(),
        }
    }

    /// Signed volume contribution of the polygon to a closed surface
    /// (divergence theorem over a triangle fan).
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let Some(o) = self.vertices.first() else {
            return 0.0;
        };
        self.vertices
            .windows(2)
            .skip(1)
            .map(|w| o.coords.dot(&w[0].coords.cross(&w[1].coords)) / 6.0)
            .sum()
    }

    /// First moment of the polygon's tetrahedra about the origin, used to
    /// accumulate a solid's centroid.
    #[must_use]
    pub fn volume_moment(&self) -> Vector3 {
        let Some(o) = self.vertices.first() else {
            return Vector3::zeros();
        };
        self.vertices
            .windows(2)
            .skip(1)
            .map(|w| {
                let vol = o.coords.dot(&w[0].coords.cross(&w[1].coords)) / 6.0;
                (o.coords + w[0].coords + w[1].coords) * (vol / 4.0)
            })
            .sum()
    }
}
