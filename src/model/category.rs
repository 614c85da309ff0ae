use serde::{Deserialize, Serialize};

use super::element::GeometryOptions;

/// Element categories that can receive formwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Columns,
    StructuralColumns,
    StructuralFraming,
    StructuralFoundation,
    Floors,
    Walls,
    Stairs,
    EdgeSlab,
}

/// A category-specific reference from an element to a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelParameter {
    BaseLevel,
    ReferenceLevel,
    FamilyLevel,
    Level,
    BaseConstraint,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 8] = [
        Self::Columns,
        Self::StructuralColumns,
        Self::StructuralFraming,
        Self::StructuralFoundation,
        Self::Floors,
        Self::Walls,
        Self::Stairs,
        Self::EdgeSlab,
    ];

    /// Human-readable category name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Columns => "Columns",
            Self::StructuralColumns => "Structural Columns",
            Self::StructuralFraming => "Structural Framing",
            Self::StructuralFoundation => "Structural Foundations",
            Self::Floors => "Floors",
            Self::Walls => "Walls",
            Self::Stairs => "Stairs",
            Self::EdgeSlab => "Slab Edges",
        }
    }

    /// Level references consulted for this category, in priority order.
    #[must_use]
    pub fn level_parameters(self) -> &'static [LevelParameter] {
        match self {
            Self::Columns | Self::StructuralColumns | Self::Stairs => &[LevelParameter::BaseLevel],
            Self::StructuralFraming => &[LevelParameter::ReferenceLevel],
            Self::StructuralFoundation => &[LevelParameter::FamilyLevel, LevelParameter::Level],
            Self::Floors => &[LevelParameter::Level],
            Self::Walls => &[LevelParameter::BaseConstraint],
            Self::EdgeSlab => &[],
        }
    }

    /// Geometry extraction options for elements of this category.
    ///
    /// Walls carry hidden construction solids that must not become panels.
    #[must_use]
    pub fn geometry_options(self) -> GeometryOptions {
        GeometryOptions {
            include_non_visible: !matches!(self, Self::Walls),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
