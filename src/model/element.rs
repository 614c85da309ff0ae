use std::fmt;

use serde::{Deserialize, Serialize};

use crate::topology::Solid;

use super::category::{Category, LevelParameter};

/// Identifier of a building element, level or grid in the host model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub i64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A building element: identity, classification and host relation.
///
/// Geometry is not stored here; it is fetched through
/// [`ModelProvider::solids`](super::ModelProvider::solids).
#[derive(Debug, Clone)]
pub struct Element {
    id: ElementId,
    category: Category,
    family_name: Option<String>,
    type_name: String,
    host: Option<ElementId>,
    level_refs: Vec<(LevelParameter, ElementId)>,
}

impl Element {
    #[must_use]
    pub fn new(id: ElementId, category: Category) -> Self {
        Self {
            id,
            category,
            family_name: None,
            type_name: String::new(),
            host: None,
            level_refs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_family_name(mut self, family_name: impl Into<String>) -> Self {
        self.family_name = Some(family_name.into());
        self
    }

    #[must_use]
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Marks this element as hosted by `host`.
    #[must_use]
    pub fn with_host(mut self, host: ElementId) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets a level reference. A later value for the same parameter wins.
    #[must_use]
    pub fn with_level(mut self, parameter: LevelParameter, level: ElementId) -> Self {
        self.level_refs.retain(|(p, _)| *p != parameter);
        self.level_refs.push((parameter, level));
        self
    }

    #[must_use]
    pub fn id(&self) -> ElementId {
        self.id
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn family_name(&self) -> Option<&str> {
        self.family_name.as_deref()
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn host(&self) -> Option<ElementId> {
        self.host
    }

    /// Returns the level referenced through `parameter`, if set.
    #[must_use]
    pub fn level_ref(&self, parameter: LevelParameter) -> Option<ElementId> {
        self.level_refs
            .iter()
            .find(|(p, _)| *p == parameter)
            .map(|(_, id)| *id)
    }
}

/// A solid of an element together with its visibility in the model.
#[derive(Debug, Clone)]
pub struct ElementSolid {
    pub solid: Solid,
    pub visible: bool,
}

impl ElementSolid {
    #[must_use]
    pub fn visible(solid: Solid) -> Self {
        Self {
            solid,
            visible: true,
        }
    }

    #[must_use]
    pub fn hidden(solid: Solid) -> Self {
        Self {
            solid,
            visible: false,
        }
    }
}

/// Options controlling which solids of an element are extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryOptions {
    pub include_non_visible: bool,
}

impl Default for GeometryOptions {
    fn default() -> Self {
        Self {
            include_non_visible: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_level_reference_wins() {
        let element = Element::new(ElementId(1), Category::Floors)
            .with_level(LevelParameter::Level, ElementId(10))
            .with_level(LevelParameter::Level, ElementId(11));
        assert_eq!(element.level_ref(LevelParameter::Level), Some(ElementId(11)));
        assert_eq!(element.level_ref(LevelParameter::BaseLevel), None);
    }

    #[test]
    fn element_id_displays_as_integer() {
        assert_eq!(ElementId(4711).to_string(), "4711");
    }
}
