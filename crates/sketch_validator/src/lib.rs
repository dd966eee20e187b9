//! Sketch Validator - structural checks for Sketch document graphs
//!
//! Two modes share one rule set:
//!
//! - graph mode walks a single JSON node (document with embedded pages, page,
//!   or layer) or an in-memory [`sketch_model::Document`];
//! - cross-file mode walks an archive (directory or `.sketch` zip), parsing
//!   each file independently and checking the references between them.
//!
//! Validation never fails: every problem becomes a [`Violation`] in the
//! returned [`ValidationReport`].

mod archive;
mod checker;
mod document;
mod layer;
mod report;
mod style;

pub use archive::*;
pub use report::*;

use serde_json::Value;
use sketch_model::Document;
use std::fs::File;
use std::path::Path;

/// Validate a single node given as JSON
pub fn validate(node: &Value) -> ValidationReport {
    let mut checker = checker::Checker::new();
    document::node(&mut checker, node, "");
    checker.finish()
}

/// Validate an in-memory document through its serialized form
pub fn validate_document(doc: &Document) -> ValidationReport {
    match serde_json::to_value(doc) {
        Ok(value) => validate(&value),
        Err(e) => ValidationReport {
            violations: vec![Violation {
                path: "/".to_string(),
                kind: ViolationKind::WrongType,
                message: format!("document does not serialize: {e}"),
            }],
            ..Default::default()
        },
    }
}

/// Validate an uncompressed archive directory
pub fn validate_directory(path: impl AsRef<Path>) -> ValidationReport {
    validate_archive(&mut DirectorySource::new(path.as_ref()))
}

fn unreadable(path: &Path, message: String) -> ValidationReport {
    ValidationReport {
        violations: vec![Violation {
            path: path.display().to_string(),
            kind: ViolationKind::UnreadableFile,
            message,
        }],
        ..Default::default()
    }
}

/// Validate a zipped `.sketch` file
pub fn validate_sketch_file(path: impl AsRef<Path>) -> ValidationReport {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => return unreadable(path, e.to_string()),
    };
    match ZipSource::new(file, path.display().to_string()) {
        Ok(mut source) => validate_archive(&mut source),
        Err(e) => unreadable(path, format!("not a zip archive: {e}")),
    }
}

/// Validate a directory or `.sketch` file, whichever `path` is
pub fn validate_path(path: impl AsRef<Path>) -> ValidationReport {
    let path = path.as_ref();
    if path.is_dir() {
        validate_directory(path)
    } else {
        validate_sketch_file(path)
    }
}
