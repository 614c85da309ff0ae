use std::collections::HashMap;

use crate::geometry::Aabb;
use crate::topology::Solid;

use super::element::{Element, ElementId, ElementSolid, GeometryOptions};
use super::level::{Grid, Level};

/// Read access to the building model consumed by the pipeline.
pub trait ModelProvider {
    /// Looks up an element by id.
    fn element(&self, id: ElementId) -> Option<&Element>;

    /// Solids of an element under the given extraction options.
    fn solids(&self, id: ElementId, options: &GeometryOptions) -> Vec<Solid>;

    /// The element hosting `id`, if any.
    fn host_of(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).and_then(Element::host)
    }

    /// Project levels in model order.
    fn levels(&self) -> &[Level];

    /// Project grids in model order.
    fn grids(&self) -> &[Grid];

    /// The level referenced by the element's category-specific level
    /// parameters, first resolvable parameter wins.
    fn elevation_level(&self, id: ElementId) -> Option<&Level> {
        let element = self.element(id)?;
        element
            .category()
            .level_parameters()
            .iter()
            .filter_map(|parameter| element.level_ref(*parameter))
            .find_map(|level_id| self.levels().iter().find(|level| level.id == level_id))
    }

    /// Bounding box of all of the element's solids.
    fn bounding_box(&self, id: ElementId) -> Option<Aabb> {
        self.solids(id, &GeometryOptions::default())
            .iter()
            .filter_map(Solid::bounding_box)
            .reduce(|a, b| a.union(&b))
    }
}

/// An in-memory building model.
#[derive(Debug, Default)]
pub struct Model {
    elements: HashMap<ElementId, (Element, Vec<ElementSolid>)>,
    levels: Vec<Level>,
    grids: Vec<Grid>,
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an element with its solids, replacing any element with the
    /// same id.
    pub fn add_element(&mut self, element: Element, solids: Vec<ElementSolid>) {
        self.elements.insert(element.id(), (element, solids));
    }

    pub fn add_level(&mut self, level: Level) {
        self.levels.push(level);
    }

    pub fn add_grid(&mut self, grid: Grid) {
        self.grids.push(grid);
    }
}

impl ModelProvider for Model {
    fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id).map(|(element, _)| element)
    }

    fn solids(&self, id: ElementId, options: &GeometryOptions) -> Vec<Solid> {
        self.elements
            .get(&id)
            .map(|(_, solids)| {
                solids
                    .iter()
                    .filter(|s| s.visible || options.include_non_visible)
                    .map(|s| s.solid.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn levels(&self) -> &[Level] {
        &self.levels
    }

    fn grids(&self) -> &[Grid] {
        &self.grids
    }
}
