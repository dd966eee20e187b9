//! Violation records and the validation report

use serde::{Deserialize, Serialize};

/// Category of a structural violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// A required field is absent
    MissingField,
    /// A field holds the wrong JSON type (or an unparsable string form)
    WrongType,
    /// `_class` is a known tag but not one allowed in this slot
    UnexpectedClass,
    /// `_class` is not a tag the format defines
    UnknownClass,
    /// A numeric value or enumeration code is outside its allowed set
    OutOfRange,
    /// An array has the wrong number of elements
    Cardinality,
    /// An object ID is not in canonical form
    InvalidIdentifier,
    /// An object ID appears more than once
    DuplicateIdentifier,
    /// Span font and style font disagree under the derivation rule
    FontMismatch,
    /// An artboard's first child is not a background-filling layer
    MissingBackground,
    /// Text attribute spans do not tile the string
    AttributeRange,
    /// A required archive file or directory is absent
    MissingFile,
    /// A file could not be read or parsed
    UnreadableFile,
    /// A manifest reference has no target file
    DanglingReference,
    /// A page file is present but not referenced by the manifest
    OrphanFile,
    /// Two archive files disagree about the page or artboard set
    IndexMismatch,
    /// The archive declares an unsupported format version
    IncompatibleVersion,
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ViolationKind::MissingField => "missing field",
            ViolationKind::WrongType => "wrong type",
            ViolationKind::UnexpectedClass => "unexpected class",
            ViolationKind::UnknownClass => "unknown class",
            ViolationKind::OutOfRange => "out of range",
            ViolationKind::Cardinality => "cardinality",
            ViolationKind::InvalidIdentifier => "invalid identifier",
            ViolationKind::DuplicateIdentifier => "duplicate identifier",
            ViolationKind::FontMismatch => "font mismatch",
            ViolationKind::MissingBackground => "missing background",
            ViolationKind::AttributeRange => "attribute range",
            ViolationKind::MissingFile => "missing file",
            ViolationKind::UnreadableFile => "unreadable file",
            ViolationKind::DanglingReference => "dangling reference",
            ViolationKind::OrphanFile => "orphan file",
            ViolationKind::IndexMismatch => "index mismatch",
            ViolationKind::IncompatibleVersion => "incompatible version",
        };
        f.write_str(label)
    }
}

/// One structural problem.
///
/// `path` is `<file>#<pointer>` in cross-file mode and a bare JSON pointer in
/// graph mode, e.g. `pages/1A2B….json#/layers/0/style/fills/0/color`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub path: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.path, self.kind, self.message)
    }
}

/// Outcome of a validation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Every violation found, in walk order
    pub violations: Vec<Violation>,
    /// Paths of layers whose class the format defines but no full rule covers
    pub unchecked: Vec<String>,
    /// Number of identified nodes walked
    pub nodes_visited: usize,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations of one kind
    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    pub fn has_kind(&self, kind: ViolationKind) -> bool {
        self.of_kind(kind).next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_valid() {
        let report = ValidationReport::default();
        assert!(report.is_valid());
        assert!(!report.has_kind(ViolationKind::MissingField));
    }

    #[test]
    fn test_violation_display() {
        let violation = Violation {
            path: "root.json#/pages/0".to_string(),
            kind: ViolationKind::DanglingReference,
            message: "no file pages/X.json".to_string(),
        };
        assert_eq!(
            violation.to_string(),
            "root.json#/pages/0 [dangling reference]: no file pages/X.json"
        );
    }
}
