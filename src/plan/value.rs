//! Loosely-typed attribute values from a rendered plan.
//!
//! Values are kept as a tagged variant rather than raw JSON so that the
//! "known after apply" marker is its own case. An unknown value has no
//! scalar accessor and never compares equal to an expected literal.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Number, Value};

use super::path::{AttributePath, PathSegment};

/// A single attribute value in a change snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanValue {
    /// Explicit null (attribute declared but unset).
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Numeric scalar.
    Number(Number),
    /// String scalar.
    String(String),
    /// Ordered list of values (lists, sets and nested blocks).
    Sequence(Vec<Self>),
    /// Object or nested block.
    Mapping(BTreeMap<String, Self>),
    /// Value that is only determined once the change is applied.
    Unknown,
}

impl PlanValue {
    /// Converts a plain JSON value.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Builds a snapshot from the tool's `after` value and its companion
    /// `after_unknown` mask.
    ///
    /// The mask mirrors the shape of `after`; a `true` leaf marks the value
    /// at that position as unknown. Unknown attributes are usually omitted
    /// from `after` entirely, so they are inserted here.
    #[must_use]
    pub fn with_unknown_mask(after: Option<Value>, unknown: Option<&Value>) -> Self {
        let mut value = after.map_or(Self::Null, Self::from_json);
        if let Some(mask) = unknown {
            value.apply_unknown_mask(mask);
        }
        value
    }

    fn apply_unknown_mask(&mut self, mask: &Value) {
        match mask {
            Value::Bool(true) => *self = Self::Unknown,
            Value::Object(marks) => {
                if !mask_has_unknown(mask) {
                    return;
                }
                if matches!(self, Self::Null) {
                    *self = Self::Mapping(BTreeMap::new());
                }
                if let Self::Mapping(map) = self {
                    for (key, mark) in marks {
                        if mask_has_unknown(mark) {
                            map.entry(key.clone())
                                .or_insert(Self::Null)
                                .apply_unknown_mask(mark);
                        }
                    }
                }
            }
            Value::Array(marks) => {
                if !mask_has_unknown(mask) {
                    return;
                }
                if matches!(self, Self::Null) {
                    *self = Self::Sequence(Vec::new());
                }
                if let Self::Sequence(items) = self {
                    for (i, mark) in marks.iter().enumerate() {
                        if !mask_has_unknown(mark) {
                            continue;
                        }
                        if items.len() <= i {
                            items.resize(i + 1, Self::Null);
                        }
                        items[i].apply_unknown_mask(mark);
                    }
                }
            }
            _ => {}
        }
    }

    /// Returns true if this value is only known after apply.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns true if this value is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if the value is present, including unknown values.
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        !self.is_null()
    }

    /// Returns true if this value or anything nested in it is unknown.
    #[must_use]
    pub fn contains_unknown(&self) -> bool {
        match self {
            Self::Unknown => true,
            Self::Sequence(items) => items.iter().any(Self::contains_unknown),
            Self::Mapping(map) => map.values().any(Self::contains_unknown),
            _ => false,
        }
    }

    /// Returns the string value, if this is a known string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a known boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number as `i64`, if representable.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Returns the mapping, if this is one.
    #[must_use]
    pub const fn as_mapping(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the sequence items, if this is a sequence.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Self]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a key.
    ///
    /// A single-element sequence is treated like its only element, since
    /// nested blocks often render as singleton lists. Looking inside an
    /// unknown value yields the unknown value itself.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Mapping(map) => map.get(key),
            Self::Sequence(items) if items.len() == 1 => items[0].get(key),
            Self::Unknown => Some(self),
            _ => None,
        }
    }

    /// Looks up a sequence position. Index `0` of a bare mapping is the
    /// mapping itself.
    #[must_use]
    pub fn index(&self, index: usize) -> Option<&Self> {
        match self {
            Self::Sequence(items) => items.get(index),
            Self::Mapping(_) if index == 0 => Some(self),
            Self::Unknown => Some(self),
            _ => None,
        }
    }

    /// Walks a path from this value. Returns `None` as soon as a segment is
    /// missing.
    #[must_use]
    pub fn lookup(&self, path: &AttributePath) -> Option<&Self> {
        path.segments()
            .iter()
            .try_fold(self, |current, segment| match segment {
                PathSegment::Key(key) => current.get(key),
                PathSegment::Index(i) => current.index(*i),
            })
    }

    /// Compares against an expected literal.
    ///
    /// Returns `None` when the comparison cannot be decided because an
    /// unknown value is involved. A singleton sequence matches an expected
    /// object equal to its element.
    #[must_use]
    pub fn matches_literal(&self, expected: &Value) -> Option<bool> {
        match (self, expected) {
            (Self::Unknown, _) => None,
            (Self::Null, _) => Some(expected.is_null()),
            (Self::Bool(b), _) => Some(expected.as_bool() == Some(*b)),
            (Self::Number(n), Value::Number(e)) => {
                Some(n == e || matches!((n.as_f64(), e.as_f64()), (Some(a), Some(b)) if a == b))
            }
            (Self::String(s), _) => Some(expected.as_str() == Some(s.as_str())),
            (Self::Sequence(items), Value::Object(_)) if items.len() == 1 => {
                items[0].matches_literal(expected)
            }
            (Self::Sequence(items), Value::Array(exp)) => {
                if items.len() != exp.len() {
                    return Some(false);
                }
                all_match(items.iter().zip(exp))
            }
            (Self::Mapping(map), Value::Object(exp)) => {
                if map.len() != exp.len() || exp.keys().any(|k| !map.contains_key(k)) {
                    return Some(false);
                }
                all_match(exp.iter().filter_map(|(k, e)| map.get(k).map(|v| (v, e))))
            }
            _ => Some(false),
        }
    }
}

/// Combines element comparisons: a known mismatch wins over an unknown.
fn all_match<'a>(pairs: impl Iterator<Item = (&'a PlanValue, &'a Value)>) -> Option<bool> {
    let mut undecided = false;
    for (value, expected) in pairs {
        match value.matches_literal(expected) {
            Some(false) => return Some(false),
            None => undecided = true,
            Some(true) => {}
        }
    }
    if undecided { None } else { Some(true) }
}

fn mask_has_unknown(mask: &Value) -> bool {
    match mask {
        Value::Bool(b) => *b,
        Value::Array(items) => items.iter().any(mask_has_unknown),
        Value::Object(map) => map.values().any(mask_has_unknown),
        _ => false,
    }
}

/// Key of the object that stands in for an unknown value in JSON output.
pub const UNKNOWN_MARKER: &str = "known_after_apply";

impl Serialize for PlanValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Sequence(items) => items.serialize(serializer),
            Self::Mapping(map) => map.serialize(serializer),
            Self::Unknown => {
                let mut marker = serializer.serialize_map(Some(1))?;
                marker.serialize_entry(UNKNOWN_MARKER, &true)?;
                marker.end()
            }
        }
    }
}

impl fmt::Display for PlanValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Unknown => write!(f, "(known after apply)"),
            Self::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Mapping(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> AttributePath {
        s.parse().expect("valid path")
    }

    #[test]
    fn test_unknown_mask_inserts_missing_attributes() {
        let value = PlanValue::with_unknown_mask(
            Some(json!({ "bucket": "logs", "force_destroy": false })),
            Some(&json!({ "arn": true, "id": true, "force_destroy": false })),
        );

        assert!(value.get("arn").is_some_and(PlanValue::is_unknown));
        assert!(value.get("id").is_some_and(PlanValue::is_unknown));
        assert_eq!(value.get("force_destroy").and_then(PlanValue::as_bool), Some(false));
        assert_eq!(value.get("bucket").and_then(PlanValue::as_str), Some("logs"));
    }

    #[test]
    fn test_unknown_mask_nested_blocks() {
        let value = PlanValue::with_unknown_mask(
            Some(json!({ "rule": [{ "bucket_key_enabled": null }] })),
            Some(&json!({ "rule": [{ "apply_server_side_encryption_by_default": [{ "sse_algorithm": true }] }] })),
        );

        let algo = value.lookup(&path("rule.apply_server_side_encryption_by_default.sse_algorithm"));
        assert!(algo.is_some_and(PlanValue::is_unknown));
        assert!(value.contains_unknown());
    }

    #[test]
    fn test_false_only_mask_does_not_add_keys() {
        let value = PlanValue::with_unknown_mask(
            Some(json!({ "a": 1 })),
            Some(&json!({ "b": false, "c": [{}] })),
        );
        assert_eq!(value.as_mapping().map(BTreeMap::len), Some(1));
    }

    #[test]
    fn test_singleton_sequence_acts_as_mapping() {
        let value = PlanValue::from_json(json!({
            "versioning_configuration": [{ "status": "Enabled" }]
        }));
        let bare = PlanValue::from_json(json!({
            "versioning_configuration": { "status": "Enabled" }
        }));

        for v in [&value, &bare] {
            assert_eq!(
                v.lookup(&path("versioning_configuration.status")).and_then(PlanValue::as_str),
                Some("Enabled")
            );
            assert_eq!(
                v.lookup(&path("versioning_configuration[0].status")).and_then(PlanValue::as_str),
                Some("Enabled")
            );
        }
    }

    #[test]
    fn test_multi_element_sequence_requires_index() {
        let value = PlanValue::from_json(json!({ "rule": [{ "id": "a" }, { "id": "b" }] }));

        assert!(value.lookup(&path("rule.id")).is_none());
        assert_eq!(value.lookup(&path("rule[1].id")).and_then(PlanValue::as_str), Some("b"));
        assert!(value.lookup(&path("rule[2].id")).is_none());
    }

    #[test]
    fn test_lookup_through_unknown_stays_unknown() {
        let value = PlanValue::with_unknown_mask(None, Some(&json!({ "policy": true })));
        assert!(value.lookup(&path("policy.Statement[0].Effect")).is_some_and(PlanValue::is_unknown));
    }

    #[test]
    fn test_unknown_never_matches_literal() {
        assert_eq!(PlanValue::Unknown.matches_literal(&json!("AES256")), None);
        assert_eq!(PlanValue::Unknown.as_str(), None);
        assert!(PlanValue::Unknown.is_defined());
    }

    #[test]
    fn test_matches_literal_scalars() {
        assert_eq!(PlanValue::Bool(true).matches_literal(&json!(true)), Some(true));
        assert_eq!(PlanValue::Bool(false).matches_literal(&json!(true)), Some(false));
        assert_eq!(PlanValue::String("Enabled".into()).matches_literal(&json!("Enabled")), Some(true));
        assert_eq!(PlanValue::from_json(json!(3)).matches_literal(&json!(3.0)), Some(true));
        assert_eq!(PlanValue::String("3".into()).matches_literal(&json!(3)), Some(false));
    }

    #[test]
    fn test_matches_literal_known_mismatch_beats_unknown() {
        let value = PlanValue::with_unknown_mask(
            Some(json!({ "a": 1, "b": 2 })),
            Some(&json!({ "a": true })),
        );
        assert_eq!(value.matches_literal(&json!({ "a": 1, "b": 3 })), Some(false));
        assert_eq!(value.matches_literal(&json!({ "a": 1, "b": 2 })), None);
    }

    #[test]
    fn test_display_unknown() {
        assert_eq!(PlanValue::Unknown.to_string(), "(known after apply)");
        assert_eq!(PlanValue::from_json(json!(["x", true])).to_string(), "[\"x\", true]");
    }

    #[test]
    fn test_serialize_marks_unknown() {
        let value = PlanValue::with_unknown_mask(
            Some(json!({ "bucket": "b", "tags": null, "rule": [{ "id": 1 }] })),
            Some(&json!({ "arn": true })),
        );

        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({ "arn": { "known_after_apply": true }, "bucket": "b", "rule": [{ "id": 1 }], "tags": null })
        );
    }
}
