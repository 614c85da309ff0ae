mod bounding_box;
pub mod curve;
mod curve_loop;
pub mod surface;

pub use bounding_box::Aabb;
pub use curve_loop::{CurveLoop, CLOSURE_TOLERANCE, DEFAULT_CHORD_TOLERANCE, PLANARITY_TOLERANCE};
