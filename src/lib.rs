//! Formwork panel synthesis from the solids of structural building elements.
//!
//! The crate resolves selected elements to their terminal hosts, merges
//! their volumes, finds hosts that touch each other, extrudes panels from
//! the outward planar faces, trims them against the neighbours and tags
//! them with level, grid and area metadata. See [`pipeline::run_pipeline`].

pub mod config;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod kernel;
pub mod math;
pub mod model;
pub mod pipeline;
pub mod topology;
pub mod units;

pub use config::FormworkConfig;
pub use error::{FormworkError, Result};
pub use kernel::{BspKernel, SolidKernel};
pub use pipeline::{run_pipeline, Panel, PipelineOutput};
