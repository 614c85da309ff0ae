use std::fmt;

use tracing::{debug, warn};

use crate::config::{CategoryTable, FormworkConfig, PanelThresholds, Rgb};
use crate::geometry::{CurveLoop, DEFAULT_CHORD_TOLERANCE};
use crate::kernel::SolidKernel;
use crate::math::{Vector3, TOLERANCE};
use crate::model::{Category, ElementId, Level};
use crate::topology::{Face, Solid};

use super::algebra::difference;
use super::face_filter::FaceFilter;
use super::host::{HostId, HostVolume};
use super::Diagnostic;

/// One formwork panel: a face of a host volume extruded outward by the
/// panel thickness and trimmed against neighbouring hosts.
#[derive(Debug, Clone)]
pub struct Panel {
    host: HostId,
    host_element: ElementId,
    category: Category,
    family_name: Option<String>,
    type_name: String,
    color: Rgb,
    face: Face,
    normal: Vector3,
    thickness: f64,
    extruded_volume: f64,
    solid: Solid,
    pub(super) level: Option<Level>,
    pub(super) grid_x: Option<String>,
    pub(super) grid_y: Option<String>,
    pub(super) area: f64,
    pub(super) area_m2: f64,
}

impl Panel {
    #[must_use]
    pub fn host(&self) -> HostId {
        self.host
    }

    #[must_use]
    pub fn host_element(&self) -> ElementId {
        self.host_element
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// The host face this panel was extruded from.
    #[must_use]
    pub fn face(&self) -> &Face {
        &self.face
    }

    /// Outward normal of the source face.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Thickness in feet.
    #[must_use]
    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    /// Volume of the extrusion before trimming.
    #[must_use]
    pub fn extruded_volume(&self) -> f64 {
        self.extruded_volume
    }

    /// The trimmed panel solid.
    #[must_use]
    pub fn solid(&self) -> &Solid {
        &self.solid
    }

    #[must_use]
    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    #[must_use]
    pub fn grid_x(&self) -> Option<&str> {
        self.grid_x.as_deref()
    }

    #[must_use]
    pub fn grid_y(&self) -> Option<&str> {
        self.grid_y.as_deref()
    }

    /// Front face area in ft².
    #[must_use]
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Front face area in m², rounded to 3 decimals.
    #[must_use]
    pub fn area_m2(&self) -> f64 {
        self.area_m2
    }

    /// The parameter record to bind onto the materialized panel.
    #[must_use]
    pub fn parameters(&self) -> Vec<(PanelParameter, ParameterValue)> {
        vec![
            (
                PanelParameter::Level,
                ParameterValue::Text(self.level.as_ref().map(|l| l.name.clone())),
            ),
            (PanelParameter::GridX, ParameterValue::Text(self.grid_x.clone())),
            (PanelParameter::GridY, ParameterValue::Text(self.grid_y.clone())),
            (
                PanelParameter::Category,
                ParameterValue::Text(Some(self.category.name().to_owned())),
            ),
            (PanelParameter::Family, ParameterValue::Text(self.family_name.clone())),
            (
                PanelParameter::TypeName,
                ParameterValue::Text(Some(self.type_name.clone())),
            ),
            (PanelParameter::Area, ParameterValue::Number(self.area)),
            (
                PanelParameter::HostId,
                ParameterValue::Integer(self.host_element.0),
            ),
        ]
    }
}

/// Parameters written onto each materialized panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelParameter {
    Level,
    GridX,
    GridY,
    Category,
    Family,
    TypeName,
    Area,
    HostId,
}

impl PanelParameter {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Level => "#Formwork_Level",
            Self::GridX => "#Formwork_Grid_X",
            Self::GridY => "#Formwork_Grid_Y",
            Self::Category => "#Formwork_Category",
            Self::Family => "#Formwork_Family",
            Self::TypeName => "#Formwork_TypeName",
            Self::Area => "#Formwork_Area",
            Self::HostId => "#Formwork_HostId",
        }
    }
}

impl fmt::Display for PanelParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of a panel parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Text(Option<String>),
    Number(f64),
    Integer(i64),
}

/// Extrudes the eligible faces of host volumes into panels.
pub struct PanelSynthesizer<'a, K: SolidKernel + ?Sized> {
    kernel: &'a K,
    filter: FaceFilter,
    thickness: f64,
    thresholds: PanelThresholds,
}

impl<'a, K: SolidKernel + ?Sized> PanelSynthesizer<'a, K> {
    #[must_use]
    pub fn new(kernel: &'a K, filter: FaceFilter, thickness: f64, thresholds: PanelThresholds) -> Self {
        Self {
            kernel,
            filter,
            thickness,
            thresholds,
        }
    }

    #[must_use]
    pub fn from_config(kernel: &'a K, config: &FormworkConfig) -> Self {
        Self::new(
            kernel,
            FaceFilter::from_config(config),
            config.panel_thickness(),
            config.thresholds,
        )
    }

    /// Produces the panels of one host volume.
    ///
    /// Hosts whose category is excluded yield nothing. Faces that fail the
    /// filter or produce slivers are skipped quietly; failed extrusions are
    /// pushed to `diagnostics`.
    pub fn synthesize(
        &self,
        id: HostId,
        host: &HostVolume,
        obstruction: Option<&Solid>,
        categories: &CategoryTable,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<Panel> {
        let Some(style) = categories.style(host.category()).filter(|s| s.included) else {
            debug!(host = %host.element(), category = %host.category(), "category excluded");
            return Vec::new();
        };

        let mut panels = Vec::new();
        for face in self.filter.eligible_faces(host.merged()) {
            let Some(normal) = face.normal() else {
                continue;
            };
            let loops = self.filter.optimize_loops(face);
            if loops.is_empty() {
                debug!(host = %host.element(), "face has no usable loops");
                continue;
            }
            if enclosed_area(face.loops(), &normal) <= TOLERANCE {
                continue;
            }

            let candidate = match self.kernel.extrude(&loops, &(normal * self.thickness)) {
                Ok(solid) => solid,
                Err(e) => {
                    warn!(host = %host.element(), error = %e, "panel extrusion failed");
                    diagnostics.push(Diagnostic {
                        host: host.element(),
                        message: format!("panel extrusion failed: {e}"),
                    });
                    continue;
                }
            };

            let Some(solid) = self.accept(&candidate, obstruction) else {
                continue;
            };
            panels.push(Panel {
                host: id,
                host_element: host.element(),
                category: host.category(),
                family_name: host.family_name().map(str::to_owned),
                type_name: host.type_name().to_owned(),
                color: style.color,
                face: face.clone(),
                normal,
                thickness: self.thickness,
                extruded_volume: candidate.volume(),
                solid,
                level: None,
                grid_x: None,
                grid_y: None,
                area: 0.0,
                area_m2: 0.0,
            });
        }
        panels
    }

    /// Trims `candidate` against the obstruction and applies the acceptance
    /// thresholds. The face count minimum only applies to untrimmed panels.
    fn accept(&self, candidate: &Solid, obstruction: Option<&Solid>) -> Option<Solid> {
        let min_volume = self.thresholds.min_volume;
        match obstruction {
            Some(obstruction) if candidate.volume() > min_volume => {
                let trimmed = difference(self.kernel, candidate, obstruction);
                (trimmed.volume() > min_volume).then_some(trimmed)
            }
            _ => (candidate.volume() > min_volume
                && candidate.face_count() >= self.thresholds.min_faces)
                .then(|| candidate.clone()),
        }
    }
}

/// Area of the outer loop minus the areas of the holes.
fn enclosed_area(loops: &[CurveLoop], normal: &Vector3) -> f64 {
    let mut areas = loops
        .iter()
        .map(|l| l.signed_area(normal, DEFAULT_CHORD_TOLERANCE).abs());
    let outer = areas.next().unwrap_or(0.0);
    outer - areas.sum::<f64>()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClassificationTolerance;
    use crate::kernel::BspKernel;
    use crate::math::Point3;
    use crate::model::{Element, ElementSolid, Model};
    use crate::pipeline::host::{resolve_hosts, HostArena};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn arena(boxes: &[(Point3, Point3)], kernel: &BspKernel) -> HostArena {
        let mut model = Model::new();
        let mut ids = Vec::new();
        for (i, (min, max)) in boxes.iter().enumerate() {
            let id = ElementId(i64::try_from(i).unwrap() + 1);
            model.add_element(
                Element::new(id, Category::StructuralColumns).with_type_name("C1"),
                vec![ElementSolid::visible(Solid::cuboid(*min, *max).unwrap())],
            );
            ids.push(id);
        }
        let mut arena = resolve_hosts(&model, kernel, &ids).unwrap();
        let _ = arena.classify(kernel, &ClassificationTolerance::default(), |_| {
            std::ops::ControlFlow::Continue(())
        });
        arena
    }

    fn synthesizer(kernel: &BspKernel) -> PanelSynthesizer<'_, BspKernel> {
        PanelSynthesizer::new(
            kernel,
            FaceFilter::new(0.0, 30.0, 0.01),
            0.1,
            PanelThresholds::default(),
        )
    }

    #[test]
    fn free_box_yields_side_and_bottom_panels() {
        let kernel = BspKernel::new();
        let arena = arena(&[(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))], &kernel);
        let id = arena.ids()[0];
        let mut diagnostics = Vec::new();
        let panels = synthesizer(&kernel).synthesize(
            id,
            arena.get(id).unwrap(),
            None,
            &CategoryTable::default(),
            &mut diagnostics,
        );
        assert_eq!(panels.len(), 5);
        assert!(diagnostics.is_empty());
        for panel in &panels {
            assert!((panel.solid().volume() - 0.1).abs() < 1e-9);
            assert_eq!(panel.solid().face_count(), 6);
            assert!(panel.normal().z < 0.5);
            let aabb = panel.solid().bounding_box().unwrap();
            // Panels sit outside the host.
            let inside = aabb.min.x >= -1e-9
                && aabb.max.x <= 1.0 + 1e-9
                && aabb.min.y >= -1e-9
                && aabb.max.y <= 1.0 + 1e-9
                && aabb.min.z >= -1e-9;
            assert!(!inside);
        }
    }

    #[test]
    fn excluded_category_yields_nothing() {
        let kernel = BspKernel::new();
        let arena = arena(&[(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))], &kernel);
        let id = arena.ids()[0];
        let mut table = CategoryTable::default();
        table.set_included(Category::StructuralColumns, false);
        let panels =
            synthesizer(&kernel).synthesize(id, arena.get(id).unwrap(), None, &table, &mut Vec::new());
        assert!(panels.is_empty());
    }

    #[test]
    fn trimming_never_adds_volume() {
        let kernel = BspKernel::new();
        let arena = arena(
            &[(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)), (p(1.0, 0.0, 0.0), p(2.0, 1.0, 1.0))],
            &kernel,
        );
        let id = arena.ids()[0];
        let obstruction = arena.obstruction(id, &kernel).unwrap();
        let panels = synthesizer(&kernel).synthesize(
            id,
            arena.get(id).unwrap(),
            Some(&obstruction),
            &CategoryTable::default(),
            &mut Vec::new(),
        );
        assert!(!panels.is_empty());
        for panel in &panels {
            assert!(panel.solid().volume() <= panel.extruded_volume() + 1e-9);
            // The shared face's panel lies inside the neighbour and is gone.
            assert!(panel.normal().x < 0.5);
        }
    }

    #[test]
    fn thresholds_are_asymmetric() {
        let kernel = BspKernel::new();
        let synth = synthesizer(&kernel);
        let thin = Solid::cuboid(p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.01)).unwrap();
        assert!(synth.accept(&thin, None).is_some());

        let far = Solid::cuboid(p(5.0, 5.0, 5.0), p(6.0, 6.0, 6.0)).unwrap();
        let sliver = Solid::cuboid(p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.0005)).unwrap();
        assert!(synth.accept(&sliver, None).is_none());
        assert!(synth.accept(&sliver, Some(&far)).is_none());
        assert!(synth.accept(&thin, Some(&far)).is_some());
    }

    #[test]
    fn parameter_record() {
        let kernel = BspKernel::new();
        let arena = arena(&[(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))], &kernel);
        let id = arena.ids()[0];
        let panels = synthesizer(&kernel).synthesize(
            id,
            arena.get(id).unwrap(),
            None,
            &CategoryTable::default(),
            &mut Vec::new(),
        );
        let record = panels[0].parameters();
        let names: Vec<_> = record.iter().map(|(p, _)| p.name()).collect();
        assert_eq!(
            names,
            [
                "#Formwork_Level",
                "#Formwork_Grid_X",
                "#Formwork_Grid_Y",
                "#Formwork_Category",
                "#Formwork_Family",
                "#Formwork_TypeName",
                "#Formwork_Area",
                "#Formwork_HostId",
            ]
        );
        assert_eq!(
            record[3].1,
            ParameterValue::Text(Some("Structural Columns".to_owned()))
        );
        assert_eq!(record[4].1, ParameterValue::Text(None));
        assert_eq!(record[5].1, ParameterValue::Text(Some("C1".to_owned())));
        assert_eq!(record[7].1, ParameterValue::Integer(1));
    }
}
