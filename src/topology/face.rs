use crate::error::{GeometryError, Result};
use crate::geometry::surface::{Cylinder, Plane};
use crate::geometry::CurveLoop;
use crate::kernel::polygon::Polygon;
use crate::kernel::triangulate::triangulate;
use crate::math::Vector3;

/// The geometric surface associated with a face.
#[derive(Debug, Clone)]
pub enum FaceSurface {
    /// A planar surface, oriented along the outward normal.
    Plane(Plane),
    /// A faceted cylindrical surface.
    Cylinder(Cylinder),
}

/// A bounded region on a surface.
///
/// `loops` holds the boundary, outer loop first and holes after;
/// `polygons` holds the convex pieces that make up the region.
#[derive(Debug, Clone)]
pub struct Face {
    surface: FaceSurface,
    loops: Vec<CurveLoop>,
    polygons: Vec<Polygon>,
    area: f64,
}

impl Face {
    /// Creates a planar face from its boundary loops. The outward normal
    /// follows the winding of the first (outer) loop.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no loops, a loop is open or non-planar,
    /// or the region cannot be triangulated.
    pub fn planar(loops: Vec<CurveLoop>, chord_tolerance: f64) -> Result<Self> {
        let outer = loops
            .first()
            .ok_or_else(|| GeometryError::Degenerate("face needs a boundary".into()))?;
        if loops.iter().any(CurveLoop::is_open) {
            return Err(GeometryError::OpenLoop.into());
        }
        let plane = outer.plane()?;
        let rings: Vec<_> = loops.iter().map(|l| l.tessellate(chord_tolerance)).collect();
        let polygons = triangulate(&plane, &rings)?
            .into_iter()
            .map(|piece| Polygon::with_plane(piece, plane.clone(), None))
            .collect();
        Ok(Self::from_parts(FaceSurface::Plane(plane), loops, polygons))
    }

    /// Assembles a face from already consistent parts.
    #[must_use]
    pub fn from_parts(surface: FaceSurface, loops: Vec<CurveLoop>, polygons: Vec<Polygon>) -> Self {
        let area = polygons.iter().map(Polygon::area).sum();
        Self {
            surface,
            loops,
            polygons,
            area,
        }
    }

    #[must_use]
    pub fn surface(&self) -> &FaceSurface {
        &self.surface
    }

    #[must_use]
    pub fn loops(&self) -> &[CurveLoop] {
        &self.loops
    }

    #[must_use]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.area
    }

    #[must_use]
    pub fn is_planar(&self) -> bool {
        matches!(self.surface, FaceSurface::Plane(_))
    }

    /// Returns the supporting plane of a planar face.
    #[must_use]
    pub fn plane(&self) -> Option<&Plane> {
        match &self.surface {
            FaceSurface::Plane(plane) => Some(plane),
            FaceSurface::Cylinder(_) => None,
        }
    }

    /// Outward unit normal of a planar face.
    #[must_use]
    pub fn normal(&self) -> Option<Vector3> {
        self.plane().map(|plane| *plane.plane_normal())
    }
}
