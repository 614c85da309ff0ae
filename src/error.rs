use thiserror::Error;

use crate::model::ElementId;

/// Top-level error type for formwork synthesis.
#[derive(Debug, Error)]
pub enum FormworkError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("curve loop is not closed")]
    OpenLoop,

    #[error("curve loop is not planar")]
    NonPlanarLoop,
}

/// Errors raised by the solid kernel.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("BSP tree exceeded the depth limit of {max_depth}")]
    RecursionLimit { max_depth: usize },

    #[error("triangulation failed: {0}")]
    Triangulation(String),
}

/// Errors related to the building model and the run's input.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("selection is empty")]
    EmptySelection,

    #[error("unknown element {0}")]
    UnknownElement(ElementId),
}

/// Errors raised while reading configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid colour '{0}', expected #rrggbb")]
    InvalidColor(String),
}

/// Convenience type alias for results using [`FormworkError`].
pub type Result<T> = std::result::Result<T, FormworkError>;
