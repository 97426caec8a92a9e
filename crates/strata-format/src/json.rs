//! # Pretty JSON
//!
//! Serializes a document with a fixed per-level indent. Object keys keep
//! their parse order (the workspace enables `serde_json/preserve_order`),
//! and non-ASCII text is emitted as UTF-8 rather than `\u` escapes.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use strata_core::{JsonDocument, JsonSyntaxError};

use crate::error::FormatError;

/// Indent width used when a caller does not choose one.
pub const DEFAULT_JSON_INDENT: usize = 4;

/// Pretty-print a JSON document with `indent` spaces per nesting level.
///
/// An indent of zero still places every member on its own line.
///
/// # Errors
///
/// Returns [`FormatError::InvalidJson`] if text input does not parse.
pub fn format_json(document: impl Into<JsonDocument>, indent: usize) -> Result<String, FormatError> {
    let value = document.into().into_value()?;
    render_pretty(&value, indent)
}

fn render_pretty(value: &Value, indent: usize) -> Result<String, FormatError> {
    let indent_bytes = vec![b' '; indent];
    let formatter = PrettyFormatter::with_indent(&indent_bytes);
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| FormatError::InvalidJson(JsonSyntaxError::from(e)))?;
    // serde_json only ever writes valid UTF-8.
    String::from_utf8(out).map_err(|e| {
        FormatError::InvalidJson(JsonSyntaxError {
            message: e.to_string(),
            line: 0,
            column: 0,
        })
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9_ é\"\\\\]{0,20}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::vec(("[a-z]{1,8}", inner), 0..6).prop_map(|pairs| {
                    Value::Object(pairs.into_iter().collect())
                }),
            ]
        })
    }

    proptest! {
        /// Formatting only changes whitespace: the parsed content is unchanged.
        #[test]
        fn format_preserves_content(value in json_value(), indent in 0usize..8) {
            let text = serde_json::to_string(&value).unwrap();
            let formatted = format_json(text.as_str(), indent).unwrap();
            let reparsed: Value = serde_json::from_str(&formatted).unwrap();
            prop_assert_eq!(reparsed, value);
        }

        /// Formatting is a fixed point under re-application.
        #[test]
        fn format_is_idempotent(value in json_value(), indent in 0usize..8) {
            let once = format_json(value, indent).unwrap();
            let twice = format_json(once.as_str(), indent).unwrap();
            prop_assert_eq!(twice, once);
        }
    }
}
