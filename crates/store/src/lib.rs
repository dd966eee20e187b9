//! Store - archive layout, packaging, and export
//!
//! This crate maps a document onto the multi-file archive layout, writes it
//! as a directory and as a deflate zip, validates the directory before
//! packaging, and loads archives back.

mod error;
mod export;
mod layout;
mod load;

pub use error::*;
pub use export::*;
pub use layout::*;
pub use load::*;
