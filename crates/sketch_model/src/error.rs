//! Error types for document model construction

use thiserror::Error;

/// Errors raised by node constructors for locally-decidable constraints.
///
/// Graph-wide constraints (identifier uniqueness, font agreement) are not
/// checked here; see the `sketch_validator` crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Invalid geometry: {field} = {value}")]
    InvalidGeometry { field: &'static str, value: f64 },

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),
}

pub type Result<T> = std::result::Result<T, ModelError>;
