use crate::config::FormworkConfig;
use crate::geometry::Aabb;
use crate::math::{angle_between, round_to, Vector3, TOLERANCE};
use crate::model::{nearest_level, ElementId, Grid, Level, ModelProvider};
use crate::topology::{Face, Solid};
use crate::units::sq_feet_to_m2;

use super::host::HostVolume;
use super::panel::Panel;

/// Normal agreement required for a panel face to count as front face.
const FRONT_FACE_TOLERANCE: f64 = 1e-6;

/// Level and grid references shared by all panels of one host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostTags {
    pub level: Option<Level>,
    pub grid_x: Option<String>,
    pub grid_y: Option<String>,
}

/// Attaches level, grid and area metadata to panels.
pub struct SpatialTagger<'a, M: ModelProvider + ?Sized> {
    model: &'a M,
    /// Grid direction tolerance in degrees.
    tolerance_deg: f64,
    /// Horizontal clearance around the host, in feet.
    margin: f64,
}

impl<'a, M: ModelProvider + ?Sized> SpatialTagger<'a, M> {
    #[must_use]
    pub fn new(model: &'a M, tolerance_deg: f64, margin: f64) -> Self {
        Self {
            model,
            tolerance_deg,
            margin,
        }
    }

    #[must_use]
    pub fn from_config(model: &'a M, config: &FormworkConfig) -> Self {
        Self::new(model, config.grid_search_tolerance_deg, config.grid_search_margin())
    }

    /// Computes the level and grid references of a host volume.
    #[must_use]
    pub fn host_tags(&self, host: &HostVolume) -> HostTags {
        let grids = self.nearby_grids(host.element());
        HostTags {
            level: self.host_level(host).cloned(),
            grid_x: first_along(&grids, &Vector3::y(), self.tolerance_deg).map(|g| g.name.clone()),
            grid_y: first_along(&grids, &Vector3::x(), self.tolerance_deg).map(|g| g.name.clone()),
        }
    }

    /// The level referenced by the host element, else the level nearest to
    /// the merged solid's centroid height.
    #[must_use]
    pub fn host_level(&self, host: &HostVolume) -> Option<&'a Level> {
        self.model
            .elevation_level(host.element())
            .or_else(|| nearest_level(self.model.levels(), host.merged().centroid().z))
    }

    /// Grids crossing the host element's bounding box grown by the margin.
    #[must_use]
    pub fn nearby_grids(&self, element: ElementId) -> Vec<&'a Grid> {
        let Some(prism) = self.model.bounding_box(element) else {
            return Vec::new();
        };
        let prism = prism.expanded_xy(self.margin);
        self.model
            .grids()
            .iter()
            .filter(|grid| crosses(grid, &prism))
            .collect()
    }

    /// Writes the host tags and the front face area onto `panel`.
    pub fn tag(&self, panel: &mut Panel, tags: &HostTags) {
        panel.level.clone_from(&tags.level);
        panel.grid_x.clone_from(&tags.grid_x);
        panel.grid_y.clone_from(&tags.grid_y);
        panel.area = front_area(panel.solid(), panel.normal());
        panel.area_m2 = round_to(sq_feet_to_m2(panel.area), 3);
    }
}

/// Returns `true` when the grid line, moved to the prism's mid height,
/// passes through the prism.
///
/// The line is horizontal, so only the footprint matters: it crosses when
/// the footprint corners are not all strictly on one side.
fn crosses(grid: &Grid, prism: &Aabb) -> bool {
    let (dx, dy) = (grid.direction.x, grid.direction.y);
    if dx.hypot(dy) < TOLERANCE {
        return false;
    }
    let corners = [
        (prism.min.x, prism.min.y),
        (prism.max.x, prism.min.y),
        (prism.max.x, prism.max.y),
        (prism.min.x, prism.max.y),
    ];
    let sides = corners.map(|(x, y)| dx * (y - grid.origin.y) - dy * (x - grid.origin.x));
    let positive = sides.iter().any(|s| *s >= 0.0);
    let negative = sides.iter().any(|s| *s <= 0.0);
    positive && negative
}

/// First grid whose direction is within `tolerance_deg` of `basis`,
/// either way round.
fn first_along<'g>(grids: &[&'g Grid], basis: &Vector3, tolerance_deg: f64) -> Option<&'g Grid> {
    grids.iter().copied().find(|grid| {
        let angle = angle_between(&grid.direction, basis).to_degrees();
        angle <= tolerance_deg || 180.0 - angle <= tolerance_deg
    })
}

/// Sum of the planar face areas whose normal matches `normal`.
#[must_use]
pub fn front_area(solid: &Solid, normal: &Vector3) -> f64 {
    solid
        .faces()
        .iter()
        .filter(|face| {
            face.normal()
                .is_some_and(|n| (n.dot(normal) - 1.0).abs() <= FRONT_FACE_TOLERANCE)
        })
        .map(Face::area)
        .sum()
}
