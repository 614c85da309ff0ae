//! Run configuration.
//!
//! User-facing quantities are metric (millimetres, square metres, degrees);
//! the accessors returning native values convert to feet and radians.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::Category;
use crate::units::{m2_to_sq_feet, mm_to_feet};

/// An sRGB colour, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` (the leading `#` is optional).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidColor`] for anything else.
    pub fn from_hex(hex: &str) -> Result<Self, ConfigError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let invalid = || ConfigError::InvalidColor(hex.to_owned());
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// Display colour and inclusion flag of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStyle {
    pub color: Rgb,
    pub included: bool,
}

/// Category lookup table consulted by panel synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTable(BTreeMap<Category, CategoryStyle>);

impl Default for CategoryTable {
    fn default() -> Self {
        let color = |category| match category {
            Category::Columns => Rgb::new(0xb8, 0xe9, 0x94),
            Category::StructuralColumns => Rgb::new(0x78, 0xe0, 0x8f),
            Category::StructuralFraming => Rgb::new(0x38, 0xad, 0xa9),
            Category::StructuralFoundation => Rgb::new(0x07, 0x99, 0x92),
            Category::Walls => Rgb::new(0x3c, 0x63, 0x82),
            Category::Floors | Category::Stairs | Category::EdgeSlab => Rgb::new(0x82, 0xcc, 0xdd),
        };
        Self(
            Category::ALL
                .into_iter()
                .map(|c| {
                    (
                        c,
                        CategoryStyle {
                            color: color(c),
                            included: true,
                        },
                    )
                })
                .collect(),
        )
    }
}

impl CategoryTable {
    /// Style of `category`; categories missing from the table are excluded.
    #[must_use]
    pub fn style(&self, category: Category) -> Option<&CategoryStyle> {
        self.0.get(&category)
    }

    #[must_use]
    pub fn is_included(&self, category: Category) -> bool {
        self.style(category).is_some_and(|s| s.included)
    }

    pub fn set_included(&mut self, category: Category, included: bool) {
        if let Some(style) = self.0.get_mut(&category) {
            style.included = included;
        }
    }

    pub fn set_color(&mut self, category: Category, color: Rgb) {
        self.0
            .entry(category)
            .and_modify(|s| s.color = color)
            .or_insert(CategoryStyle {
                color,
                included: true,
            });
    }
}

/// Tolerances of the union/intersection classification heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationTolerance {
    /// Intersection volume (ft³) below which two solids only touch.
    pub volume: f64,
    /// Decimal places surface areas are rounded to before comparison.
    pub area_decimals: i32,
}

impl Default for ClassificationTolerance {
    fn default() -> Self {
        Self {
            volume: 1e-5,
            area_decimals: 5,
        }
    }
}

/// Acceptance thresholds for extruded panels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelThresholds {
    /// Minimum panel volume in ft³.
    pub min_volume: f64,
    /// Minimum face count of an untrimmed panel.
    pub min_faces: usize,
}

impl Default for PanelThresholds {
    fn default() -> Self {
        Self {
            min_volume: 1e-3,
            min_faces: 6,
        }
    }
}

/// Options of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormworkConfig {
    pub panel_thickness_mm: f64,
    /// Line segments no longer than this are elided from face loops.
    pub min_skip_edge_length_mm: f64,
    /// Faces with area at or below this are skipped.
    pub min_skip_face_area_m2: f64,
    /// Minimum angle between a face normal and +Z.
    pub min_face_angle_deg: f64,
    pub grid_search_tolerance_deg: f64,
    pub grid_search_margin_mm: f64,
    pub classification: ClassificationTolerance,
    pub thresholds: PanelThresholds,
    pub categories: CategoryTable,
}

impl Default for FormworkConfig {
    fn default() -> Self {
        Self {
            panel_thickness_mm: 12.5,
            min_skip_edge_length_mm: 0.793_75,
            min_skip_face_area_m2: 0.0,
            min_face_angle_deg: 30.0,
            grid_search_tolerance_deg: 10.0,
            grid_search_margin_mm: 500.0,
            classification: ClassificationTolerance::default(),
            thresholds: PanelThresholds::default(),
            categories: CategoryTable::default(),
        }
    }
}

impl FormworkConfig {
    /// Panel thickness in feet.
    #[must_use]
    pub fn panel_thickness(&self) -> f64 {
        mm_to_feet(self.panel_thickness_mm)
    }

    /// Minimum kept edge length in feet.
    #[must_use]
    pub fn min_skip_edge_length(&self) -> f64 {
        mm_to_feet(self.min_skip_edge_length_mm)
    }

    /// Skip area threshold in square feet.
    #[must_use]
    pub fn min_skip_face_area(&self) -> f64 {
        m2_to_sq_feet(self.min_skip_face_area_m2)
    }

    /// Grid search margin in feet.
    #[must_use]
    pub fn grid_search_margin(&self) -> f64 {
        mm_to_feet(self.grid_search_margin_mm)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn defaults_in_native_units() {
        let config = FormworkConfig::default();
        assert_relative_eq!(config.panel_thickness(), 12.5 / 304.8);
        assert_relative_eq!(config.min_skip_edge_length(), 1.0 / 384.0, epsilon = 1e-12);
        assert_eq!(config.min_skip_face_area(), 0.0);
        assert_relative_eq!(config.grid_search_margin(), 500.0 / 304.8);
    }

    #[test]
    fn every_category_included_by_default() {
        let table = CategoryTable::default();
        for category in Category::ALL {
            assert!(table.is_included(category));
        }
        assert_eq!(table.style(Category::Walls).unwrap().color.to_string(), "#3c6382");
    }

    #[test]
    fn excluded_category() {
        let mut table = CategoryTable::default();
        table.set_included(Category::Stairs, false);
        assert!(!table.is_included(Category::Stairs));
        assert!(table.is_included(Category::Floors));
    }

    #[test]
    fn hex_colours() {
        assert_eq!(Rgb::from_hex("#079992").unwrap(), Rgb::new(0x07, 0x99, 0x92));
        assert_eq!(Rgb::from_hex("B8E994").unwrap(), Rgb::new(0xb8, 0xe9, 0x94));
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#gg0000").is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: FormworkConfig = serde_json::from_str(
            r##"{
                "panel_thickness_mm": 18.0,
                "classification": { "volume": 0.001 },
                "categories": { "Walls": { "color": "#ff0000", "included": false } }
            }"##,
        )
        .unwrap();
        assert_relative_eq!(config.panel_thickness_mm, 18.0);
        assert_relative_eq!(config.min_face_angle_deg, 30.0);
        assert_relative_eq!(config.classification.volume, 0.001);
        assert_eq!(config.classification.area_decimals, 5);
        assert!(!config.categories.is_included(Category::Walls));
        assert!(!config.categories.is_included(Category::Floors));
    }

    #[test]
    fn colour_round_trips_through_json() {
        let json = serde_json::to_string(&Rgb::new(0x3c, 0x63, 0x82)).unwrap();
        assert_eq!(json, "\"#3c6382\"");
        assert!(serde_json::from_str::<Rgb>("\"red\"").is_err());
    }
}
