//! # Value Kinds
//!
//! Type tags for dynamic JSON values. One enum is shared by the formatter
//! (rejecting non-textual input) and the validator (`validate_type`), so
//! both report the same names for the same values.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The type tag of a dynamic value.
///
/// A JSON number is `Integer` when it is written without a fraction or
/// exponent, whatever its magnitude, otherwise `Number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

/// A type name that is not one of the [`ValueKind`] tags.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown value kind: {0:?} (expected one of null, boolean, integer, number, string, array, object)")]
pub struct UnknownValueKind(pub String);

impl ValueKind {
    pub fn all() -> &'static [ValueKind] {
        &[
            Self::Null,
            Self::Boolean,
            Self::Integer,
            Self::Number,
            Self::String,
            Self::Array,
            Self::Object,
        ]
    }

    /// The kind of a concrete value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() || is_integer_literal(&n.to_string()) => {
                Self::Integer
            }
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Whether a value of kind `actual` satisfies an expectation of `self`.
    ///
    /// Every integer is also a number; all other kinds match only themselves.
    pub fn accepts(self, actual: ValueKind) -> bool {
        self == actual || (self == Self::Number && actual == Self::Integer)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// `-?[0-9]+`, the form `arbitrary_precision` keeps for out-of-range integers.
fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = UnknownValueKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "null" => Ok(Self::Null),
            "boolean" | "bool" => Ok(Self::Boolean),
            "integer" | "int" => Ok(Self::Integer),
            "number" | "float" => Ok(Self::Number),
            "string" | "str" => Ok(Self::String),
            "array" | "list" => Ok(Self::Array),
            "object" | "dict" => Ok(Self::Object),
            other => Err(UnknownValueKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_of_each_value() {
        assert_eq!(ValueKind::of(&json!(null)), ValueKind::Null);
        assert_eq!(ValueKind::of(&json!(true)), ValueKind::Boolean);
        assert_eq!(ValueKind::of(&json!(42)), ValueKind::Integer);
        assert_eq!(ValueKind::of(&json!(u64::MAX)), ValueKind::Integer);
        assert_eq!(ValueKind::of(&json!(1.5)), ValueKind::Number);
        assert_eq!(ValueKind::of(&json!("s")), ValueKind::String);
        assert_eq!(ValueKind::of(&json!([])), ValueKind::Array);
        assert_eq!(ValueKind::of(&json!({})), ValueKind::Object);
    }

    #[test]
    fn test_kind_of_integer_beyond_u64() {
        let big: Value = serde_json::from_str("12345678901234567890123").unwrap();
        assert_eq!(ValueKind::of(&big), ValueKind::Integer);
        let negative: Value = serde_json::from_str("-98765432109876543210").unwrap();
        assert_eq!(ValueKind::of(&negative), ValueKind::Integer);
        let exponent: Value = serde_json::from_str("1e30").unwrap();
        assert_eq!(ValueKind::of(&exponent), ValueKind::Number);
    }

    #[test]
    fn test_number_accepts_integer() {
        assert!(ValueKind::Number.accepts(ValueKind::Integer));
        assert!(!ValueKind::Integer.accepts(ValueKind::Number));
        assert!(!ValueKind::String.accepts(ValueKind::Integer));
    }

    #[test]
    fn test_from_str_roundtrip() {
        for kind in ValueKind::all() {
            let parsed: ValueKind = kind.as_str().parse().unwrap();
            assert_eq!(&parsed, kind);
        }
    }

    #[test]
    fn test_from_str_aliases() {
        assert_eq!("int".parse::<ValueKind>().unwrap(), ValueKind::Integer);
        assert_eq!("dict".parse::<ValueKind>().unwrap(), ValueKind::Object);
    }

    #[test]
    fn test_from_str_unknown() {
        let err = "tuple".parse::<ValueKind>().unwrap_err();
        assert_eq!(err, UnknownValueKind("tuple".to_string()));
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(serde_json::to_string(&ValueKind::Boolean).unwrap(), "\"boolean\"");
    }
}
