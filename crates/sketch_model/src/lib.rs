//! Sketch Model - typed document graph for Sketch design files
//!
//! This crate provides the node hierarchy (document, page, artboard, shapes,
//! text, style), the value codecs the format needs (hex colors, point and
//! rect strings, object IDs), and [`NodeFactory`], which builds nodes with
//! their defaults and identity applied.

mod macros;

mod codec;
mod color;
mod document;
mod error;
mod factory;
mod fonts;
mod geometry;
mod layer;
pub mod meta;
mod object_id;
mod page;
pub mod style;

pub use codec::*;
pub use color::*;
pub use document::*;
pub use error::*;
pub use factory::*;
pub use fonts::*;
pub use geometry::*;
pub use layer::*;
pub use meta::*;
pub use object_id::*;
pub use page::*;
pub use style::*;
