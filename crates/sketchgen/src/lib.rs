//! Sketchgen - UI module list to validated `.sketch` archive
//!
//! The pipeline is assemble, lay out, validate, package. [`export`] runs all
//! of it from a [`GeneratorConfig`].

mod config;

pub use config::*;

use assembler::{AssemblyError, Assembler};
use sketch_model::{Document, NodeFactory};
use store::{ExportOutcome, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Paths and size of a generated archive
pub type ExportSummary = ExportOutcome;

/// Assemble the configured modules into a document
pub fn generate_document(config: &GeneratorConfig) -> Result<Document> {
    let factory = match config.seed {
        Some(seed) => NodeFactory::seeded(seed),
        None => NodeFactory::new(),
    };
    let mut assembler = Assembler::with_factory(
        factory,
        config.assembly.clone(),
        &config.palette,
        config.typography.clone(),
    )?;
    Ok(assembler.assemble(&config.modules)?)
}

/// Assemble, validate and package according to `config`
pub async fn export(config: &GeneratorConfig) -> Result<ExportSummary> {
    tracing::info!("Generating {} module(s)", config.modules.len());
    let document = generate_document(config)?;
    Ok(store::export_document(document, config.export_options()).await?)
}
