//! Tag literals and the fallback marker.
use std::fmt;
use serde_json::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// A literal discriminant value.
///
/// Equality is strict: `Int(1)` and `Str("1")` are different tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

/// A key inside a handler mapping.
///
/// `Otherwise` lives outside the `TagValue` space, so no record can ever carry
/// a tag equal to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CaseKey {
    Tag(TagValue),
    Otherwise,
}

/// The fallback marker.
pub const OTHERWISE: CaseKey = CaseKey::Otherwise;

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TagValue {
    /// Read a JSON scalar as a tag literal.
    ///
    /// Strings, integers that fit `i64` and booleans qualify. `null`, floats,
    /// arrays and objects do not.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Str(s.clone())),
            Value::Number(n) => n.as_i64().map(Self::Int),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Str(s) => Value::String(s.clone()),
            Self::Int(i) => Value::from(*i),
            Self::Bool(b) => Value::Bool(*b),
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl fmt::Display for CaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => tag.fmt(f),
            Self::Otherwise => f.write_str("<otherwise>"),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self { Self::Str(value.to_owned()) }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self { Self::Str(value) }
}

impl From<&String> for TagValue {
    fn from(value: &String) -> Self { Self::Str(value.clone()) }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self { Self::Int(value) }
}

impl From<i32> for TagValue {
    fn from(value: i32) -> Self { Self::Int(i64::from(value)) }
}

impl From<u32> for TagValue {
    fn from(value: u32) -> Self { Self::Int(i64::from(value)) }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self { Self::Bool(value) }
}

impl From<TagValue> for CaseKey {
    fn from(value: TagValue) -> Self { Self::Tag(value) }
}

impl From<&str> for CaseKey {
    fn from(value: &str) -> Self { Self::Tag(value.into()) }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_scalars_become_literals() {
        assert_eq!(TagValue::from_json(&json!("ok")), Some(TagValue::from("ok")));
        assert_eq!(TagValue::from_json(&json!(2)), Some(TagValue::Int(2)));
        assert_eq!(TagValue::from_json(&json!(-7)), Some(TagValue::Int(-7)));
        assert_eq!(TagValue::from_json(&json!(true)), Some(TagValue::Bool(true)));
    }

    #[test]
    fn non_literals_are_not_tags() {
        for v in [json!(null), json!(1.5), json!([1]), json!({"a": 1}), json!(u64::MAX)] {
            assert_eq!(TagValue::from_json(&v), None, "{v}");
        }
    }

    #[test]
    fn no_coercion_between_kinds() {
        assert_ne!(TagValue::from(1), TagValue::from("1"));
        assert_ne!(TagValue::from(true), TagValue::from("true"));
    }

    #[test]
    fn otherwise_never_equals_a_tag() {
        assert_ne!(OTHERWISE, CaseKey::from("otherwise"));
        assert_ne!(OTHERWISE, CaseKey::from("<otherwise>"));
    }

    #[test]
    fn display_quotes_strings_only() {
        assert_eq!(TagValue::from("err").to_string(), "\"err\"");
        assert_eq!(TagValue::from(2).to_string(), "2");
        assert_eq!(OTHERWISE.to_string(), "<otherwise>");
    }
}
