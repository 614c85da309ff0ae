//! Building model: elements, levels, grids and the provider interface the
//! pipeline reads them through.

mod category;
mod element;
mod level;
mod provider;

pub use category::{Category, LevelParameter};
pub use element::{Element, ElementId, ElementSolid, GeometryOptions};
pub use level::{nearest_level, Grid, Level};
pub use provider::{Model, ModelProvider};
