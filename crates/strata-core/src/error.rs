//! # Codec Error Types
//!
//! Errors raised by the shared codecs. They carry enough positional context
//! (line, column, offending value, pattern) to diagnose a failure without
//! re-running the call. The formatter and validator crates wrap them into
//! their own taxonomies; they are never surfaced to callers bare.

use thiserror::Error;

/// A JSON document could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at line {line} column {column}")]
pub struct JsonSyntaxError {
    /// Parser message, without the position suffix.
    pub message: String,
    /// 1-based line of the failure.
    pub line: usize,
    /// 1-based column of the failure.
    pub column: usize,
}

impl From<serde_json::Error> for JsonSyntaxError {
    fn from(err: serde_json::Error) -> Self {
        // serde_json appends " at line L column C" to its Display output.
        let rendered = err.to_string();
        let message = match rendered.rfind(" at line ") {
            Some(idx) => rendered[..idx].to_string(),
            None => rendered,
        };
        Self {
            message,
            line: err.line(),
            column: err.column(),
        }
    }
}

/// An XML document is not well-formed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}: line {line}, column {column}")]
pub struct XmlError {
    /// Description of the well-formedness violation.
    pub message: String,
    /// 1-based line of the failure.
    pub line: usize,
    /// 1-based column of the failure.
    pub column: usize,
}

impl XmlError {
    /// Build an error positioned at byte `offset` of `source`.
    pub fn at_offset(message: impl Into<String>, source: &str, offset: usize) -> Self {
        let (line, column) = line_column(source, offset);
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

/// A date/time string could not be parsed or rendered with a pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("time data {value:?} does not match format {pattern:?}: {reason}")]
pub struct DateTimeError {
    /// The offending input (empty when only the pattern is at fault).
    pub value: String,
    /// The strftime-style pattern involved.
    pub pattern: String,
    /// Underlying parser or renderer reason.
    pub reason: String,
}

impl DateTimeError {
    pub(crate) fn new(value: &str, pattern: &str, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convert a byte offset into a 1-based (line, column) pair.
///
/// Offsets past the end clamp to the end of `source`; columns count
/// characters, not bytes.
fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    let prefix = &source[..end];
    let line = prefix.matches('\n').count() + 1;
    let line_start = prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = prefix[line_start..].chars().count() + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_syntax_error_strips_position_suffix() {
        let err = serde_json::from_str::<serde_json::Value>("{\"a\":}").unwrap_err();
        let wrapped = JsonSyntaxError::from(err);
        assert_eq!(wrapped.line, 1);
        assert!(wrapped.column > 0);
        assert!(!wrapped.message.contains("at line"));
        assert!(wrapped.to_string().contains("at line 1 column"));
    }

    #[test]
    fn test_line_column_first_line() {
        assert_eq!(line_column("<a></b>", 3), (1, 4));
    }

    #[test]
    fn test_line_column_later_line() {
        let src = "<a>\n  <b>\n</a>";
        assert_eq!(line_column(src, 10), (3, 1));
    }

    #[test]
    fn test_line_column_clamps_past_end() {
        assert_eq!(line_column("ab", 99), (1, 3));
    }

    #[test]
    fn test_line_column_counts_chars() {
        // "é" is two bytes but one column.
        assert_eq!(line_column("é<", 2), (1, 2));
    }

    #[test]
    fn test_datetime_error_display() {
        let err = DateTimeError::new("2024-13-01", "%Y-%m-%d", "input is out of range");
        let rendered = err.to_string();
        assert!(rendered.contains("\"2024-13-01\""));
        assert!(rendered.contains("\"%Y-%m-%d\""));
        assert!(rendered.contains("out of range"));
    }
}
