//! Field-level checking primitives shared by every rule
//!
//! All helpers record a violation and return `None` instead of failing, so a
//! rule can keep walking sibling fields after a problem.

use crate::{ValidationReport, Violation, ViolationKind};
use serde_json::{Map, Value};
use sketch_model::{is_canonical_object_id, parse_point, Point};
use std::collections::HashMap;

pub(crate) type Object = Map<String, Value>;

/// Validation rule for one `_class` of object
pub(crate) type Rule = fn(&mut Checker, &Object, &str);

/// Append `key` to a JSON pointer
pub(crate) fn join(pointer: &str, key: impl std::fmt::Display) -> String {
    let key = key.to_string().replace('~', "~0").replace('/', "~1");
    format!("{pointer}/{key}")
}

/// Code predicate over a `u8` enumeration's `from_code`
pub(crate) fn u8_code<T>(from_code: fn(u8) -> Option<T>) -> impl Fn(i64) -> bool {
    move |c| u8::try_from(c).ok().and_then(from_code).is_some()
}

/// Code predicate over an `i8` enumeration's `from_code`
pub(crate) fn i8_code<T>(from_code: fn(i8) -> Option<T>) -> impl Fn(i64) -> bool {
    move |c| i8::try_from(c).ok().and_then(from_code).is_some()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Integer view of a JSON number; integral floats count
pub(crate) fn as_integer(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
}

/// Walk state: the report being built, the file being walked, and every
/// object ID seen so far (with where it was first seen)
pub(crate) struct Checker {
    report: ValidationReport,
    file: Option<String>,
    ids: HashMap<String, String>,
}

impl Checker {
    pub fn new() -> Self {
        Self {
            report: ValidationReport::default(),
            file: None,
            ids: HashMap::new(),
        }
    }

    /// Scope subsequent violations to an archive file
    pub fn set_file(&mut self, file: impl Into<String>) {
        self.file = Some(file.into());
    }

    pub fn finish(self) -> ValidationReport {
        self.report
    }

    fn location(&self, pointer: &str) -> String {
        match &self.file {
            Some(file) => format!("{file}#{pointer}"),
            None if pointer.is_empty() => "/".to_string(),
            None => pointer.to_string(),
        }
    }

    pub fn violation(&mut self, pointer: &str, kind: ViolationKind, message: impl Into<String>) {
        let path = self.location(pointer);
        self.report.violations.push(Violation {
            path,
            kind,
            message: message.into(),
        });
    }

    /// Record a violation about a whole archive file
    pub fn file_violation(&mut self, file: &str, kind: ViolationKind, message: impl Into<String>) {
        self.report.violations.push(Violation {
            path: file.to_string(),
            kind,
            message: message.into(),
        });
    }

    pub fn mark_unchecked(&mut self, pointer: &str) {
        let path = self.location(pointer);
        self.report.unchecked.push(path);
    }

    // =========================================================================
    // Shape Checks
    // =========================================================================

    pub fn object<'v>(&mut self, value: &'v Value, pointer: &str) -> Option<&'v Object> {
        match value {
            Value::Object(obj) => Some(obj),
            other => {
                self.violation(
                    pointer,
                    ViolationKind::WrongType,
                    format!("expected object, found {}", json_type(other)),
                );
                None
            }
        }
    }

    pub fn field<'v>(&mut self, obj: &'v Object, pointer: &str, key: &str) -> Option<&'v Value> {
        let value = obj.get(key);
        if value.is_none() {
            self.violation(
                &join(pointer, key),
                ViolationKind::MissingField,
                format!("required field `{key}` is absent"),
            );
        }
        value
    }

    fn wrong_type(&mut self, pointer: &str, key: &str, expected: &str, found: &Value) {
        self.violation(
            &join(pointer, key),
            ViolationKind::WrongType,
            format!("`{key}` must be {expected}, found {}", json_type(found)),
        );
    }

    /// The `_class` tag of an object
    pub fn class<'v>(&mut self, obj: &'v Object, pointer: &str) -> Option<&'v str> {
        self.string_field(obj, pointer, "_class")
    }

    /// Require `_class == expected`
    pub fn expect_class(&mut self, obj: &Object, pointer: &str, expected: &str) -> bool {
        match self.class(obj, pointer) {
            Some(class) if class == expected => true,
            Some(class) => {
                self.violation(
                    &join(pointer, "_class"),
                    ViolationKind::UnexpectedClass,
                    format!("expected `{expected}`, found `{class}`"),
                );
                false
            }
            None => false,
        }
    }

    // =========================================================================
    // Scalar Fields
    // =========================================================================

    pub fn bool_field(&mut self, obj: &Object, pointer: &str, key: &str) -> Option<bool> {
        let value = self.field(obj, pointer, key)?;
        let b = value.as_bool();
        if b.is_none() {
            self.wrong_type(pointer, key, "a boolean", value);
        }
        b
    }

    pub fn number_field(&mut self, obj: &Object, pointer: &str, key: &str) -> Option<f64> {
        let value = self.field(obj, pointer, key)?;
        let n = value.as_f64();
        if n.is_none() {
            self.wrong_type(pointer, key, "a number", value);
        }
        n
    }

    pub fn optional_number_field(&mut self, obj: &Object, pointer: &str, key: &str) {
        if obj.contains_key(key) {
            self.number_field(obj, pointer, key);
        }
    }

    /// A number within `[0, 1]`
    pub fn unit_field(&mut self, obj: &Object, pointer: &str, key: &str) -> Option<f64> {
        let n = self.number_field(obj, pointer, key)?;
        if !(0.0..=1.0).contains(&n) {
            self.violation(
                &join(pointer, key),
                ViolationKind::OutOfRange,
                format!("`{key}` = {n} is outside [0, 1]"),
            );
        }
        Some(n)
    }

    pub fn string_field<'v>(&mut self, obj: &'v Object, pointer: &str, key: &str) -> Option<&'v str> {
        let value = self.field(obj, pointer, key)?;
        let s = value.as_str();
        if s.is_none() {
            self.wrong_type(pointer, key, "a string", value);
        }
        s
    }

    /// A `"{x, y}"` point string
    pub fn point_field(&mut self, obj: &Object, pointer: &str, key: &str) -> Option<Point> {
        let raw = self.string_field(obj, pointer, key)?;
        let point = parse_point(raw);
        if point.is_none() {
            self.violation(
                &join(pointer, key),
                ViolationKind::WrongType,
                format!("`{key}` = {raw:?} is not a point string"),
            );
        }
        point
    }

    /// An integer enumeration code accepted by `valid`
    pub fn code_field(
        &mut self,
        obj: &Object,
        pointer: &str,
        key: &str,
        valid: impl Fn(i64) -> bool,
    ) -> Option<i64> {
        let value = self.field(obj, pointer, key)?;
        let Some(code) = as_integer(value) else {
            self.wrong_type(pointer, key, "an integer code", value);
            return None;
        };
        if !valid(code) {
            self.violation(
                &join(pointer, key),
                ViolationKind::OutOfRange,
                format!("`{key}` = {code} is not a defined code"),
            );
        }
        Some(code)
    }

    pub fn integer_field(&mut self, obj: &Object, pointer: &str, key: &str) -> Option<i64> {
        self.code_field(obj, pointer, key, |_| true)
    }

    // =========================================================================
    // Structured Fields
    // =========================================================================

    pub fn array_field<'v>(&mut self, obj: &'v Object, pointer: &str, key: &str) -> Option<&'v Vec<Value>> {
        let value = self.field(obj, pointer, key)?;
        let array = value.as_array();
        if array.is_none() {
            self.wrong_type(pointer, key, "an array", value);
        }
        array
    }

    /// An array whose elements are all numbers
    pub fn number_array_field(&mut self, obj: &Object, pointer: &str, key: &str) {
        let Some(items) = self.array_field(obj, pointer, key) else {
            return;
        };
        let path = join(pointer, key);
        for (i, item) in items.iter().enumerate() {
            if !item.is_number() {
                self.violation(
                    &join(&path, i),
                    ViolationKind::WrongType,
                    format!("expected number, found {}", json_type(item)),
                );
            }
        }
    }

    pub fn object_field<'v>(&mut self, obj: &'v Object, pointer: &str, key: &str) -> Option<&'v Object> {
        let value = self.field(obj, pointer, key)?;
        self.object(value, &join(pointer, key))
    }

    /// A nested object of a fixed class, checked by `rule`
    pub fn nested(&mut self, obj: &Object, pointer: &str, key: &str, class: &str, rule: Rule) {
        let Some(child) = self.object_field(obj, pointer, key) else {
            return;
        };
        let path = join(pointer, key);
        if self.expect_class(child, &path, class) {
            rule(self, child, &path);
        }
    }

    /// Like [`Checker::nested`], but absence is allowed
    pub fn optional_nested(&mut self, obj: &Object, pointer: &str, key: &str, class: &str, rule: Rule) {
        if obj.get(key).is_some_and(|v| !v.is_null()) {
            self.nested(obj, pointer, key, class, rule);
        }
    }

    /// An always-present array of objects of a fixed class
    pub fn list(&mut self, obj: &Object, pointer: &str, key: &str, class: &str, rule: Rule) -> usize {
        let Some(items) = self.array_field(obj, pointer, key) else {
            return 0;
        };
        let path = join(pointer, key);
        for (i, item) in items.iter().enumerate() {
            let item_path = join(&path, i);
            if let Some(child) = self.object(item, &item_path) {
                if self.expect_class(child, &item_path, class) {
                    rule(self, child, &item_path);
                }
            }
        }
        items.len()
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Check `do_objectID` for canonical form and document-wide uniqueness
    pub fn object_id<'v>(&mut self, obj: &'v Object, pointer: &str) -> Option<&'v str> {
        self.report.nodes_visited += 1;
        let id = self.string_field(obj, pointer, "do_objectID")?;
        let path = join(pointer, "do_objectID");

        if !is_canonical_object_id(id) {
            self.violation(
                &path,
                ViolationKind::InvalidIdentifier,
                format!("{id:?} is not a canonical object ID"),
            );
        }

        let location = self.location(&path);
        if let Some(first) = self.ids.get(id) {
            let message = format!("{id} already used at {first}");
            self.violation(&path, ViolationKind::DuplicateIdentifier, message);
        } else {
            self.ids.insert(id.to_string(), location);
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Object {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_missing_and_wrong_type() {
        let mut checker = Checker::new();
        let o = obj(json!({"isVisible": "yes"}));
        assert_eq!(checker.bool_field(&o, "/x", "isVisible"), None);
        assert_eq!(checker.number_field(&o, "/x", "rotation"), None);

        let report = checker.finish();
        assert_eq!(report.violations.len(), 2);
        assert_eq!(report.violations[0].kind, ViolationKind::WrongType);
        assert_eq!(report.violations[0].path, "/x/isVisible");
        assert_eq!(report.violations[1].kind, ViolationKind::MissingField);
    }

    #[test]
    fn test_file_scoped_paths() {
        let mut checker = Checker::new();
        checker.set_file("meta.json");
        checker.violation("/version", ViolationKind::OutOfRange, "bad");
        assert_eq!(checker.finish().violations[0].path, "meta.json#/version");
    }

    #[test]
    fn test_pointer_escaping() {
        assert_eq!(join("", "a/b"), "/a~1b");
        assert_eq!(join("/x", 3), "/x/3");
    }

    #[test]
    fn test_duplicate_id_reports_first_location() {
        let mut checker = Checker::new();
        let id = "00000000-0000-4000-8000-000000000000";
        let o = obj(json!({ "do_objectID": id }));
        checker.object_id(&o, "/a");
        checker.object_id(&o, "/b");

        let report = checker.finish();
        assert_eq!(report.nodes_visited, 2);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].kind, ViolationKind::DuplicateIdentifier);
        assert!(report.violations[0].message.contains("/a/do_objectID"));
    }

    #[test]
    fn test_code_field_accepts_integral_floats() {
        let mut checker = Checker::new();
        let o = obj(json!({"a": 2.0, "b": 2.5, "c": 9}));
        assert_eq!(checker.code_field(&o, "", "a", |c| c < 4), Some(2));
        assert_eq!(checker.code_field(&o, "", "b", |c| c < 4), None);
        assert_eq!(checker.code_field(&o, "", "c", |c| c < 4), Some(9));

        let report = checker.finish();
        assert_eq!(report.violations[0].kind, ViolationKind::WrongType);
        assert_eq!(report.violations[1].kind, ViolationKind::OutOfRange);
    }
}
