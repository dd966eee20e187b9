//! Error types for document assembly

use sketch_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Invalid palette color for {field}: {value:?}")]
    InvalidPalette { field: &'static str, value: String },

    #[error("Invalid module list: {0}")]
    InvalidModules(#[from] serde_json::Error),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, AssemblyError>;
