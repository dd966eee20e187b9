//! Assembler - turns a declarative UI module list into a Sketch document
//!
//! Modules are laid out top to bottom on a single artboard. Each module type
//! has a builder in a dispatch table; unknown types and failing builders get
//! a labelled placeholder so one bad module never fails the document.

mod assembler;
mod config;
mod error;
mod modules;

pub use assembler::*;
pub use config::*;
pub use error::*;
pub use modules::{default_height, line_height, lookup, registry, ModuleBuilder, ModuleContext};
