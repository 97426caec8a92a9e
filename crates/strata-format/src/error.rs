//! # Formatter Errors
//!
//! Every formatting operation fails with exactly one [`FormatError`]
//! variant. Callers dispatch on the variant (or on the stable name from
//! [`FormatError::code`]), never on the message text.

use strata_core::{DateTimeError, JsonSyntaxError, ValueKind, XmlError};
use thiserror::Error;

/// Failure of a formatting operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A case name outside the supported set.
    #[error("unsupported case option: {case:?}")]
    UnsupportedCase {
        /// The rejected case name.
        case: String,
    },

    /// The value to format is not textual.
    #[error("input value must be a string, got {actual}")]
    InvalidInputType {
        /// Kind of the value that was supplied.
        actual: ValueKind,
    },

    /// The JSON input could not be parsed.
    #[error("invalid JSON data: {0}")]
    InvalidJson(#[from] JsonSyntaxError),

    /// The XML input is not well-formed.
    #[error("invalid XML data: {0}")]
    InvalidXml(#[from] XmlError),

    /// The date/time input did not match its pattern or could not be rendered.
    #[error("date formatting error: {0}")]
    InvalidDateTime(#[from] DateTimeError),

    /// No code formatter is registered for the requested style.
    #[error("unsupported code style: {style:?}")]
    UnsupportedStyle {
        /// The rejected style key.
        style: String,
    },

    /// The collaborator for a style could not be located.
    #[error("code formatter for style {style:?} is unavailable: {reason}")]
    FormatterUnavailable {
        /// Style whose collaborator is missing.
        style: String,
        /// What could not be found.
        reason: String,
    },

    /// The collaborator was located but did not produce formatted output.
    #[error("code formatter for style {style:?} failed: {reason}")]
    FormatterFailed {
        /// Style whose collaborator failed.
        style: String,
        /// Exit status or diagnostic output.
        reason: String,
    },
}

impl FormatError {
    /// Stable, dispatchable name of the failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedCase { .. } => "UnsupportedCase",
            Self::InvalidInputType { .. } => "InvalidInputType",
            Self::InvalidJson(_) => "InvalidJson",
            Self::InvalidXml(_) => "InvalidXml",
            Self::InvalidDateTime(_) => "InvalidDateTime",
            Self::UnsupportedStyle { .. } => "UnsupportedStyle",
            Self::FormatterUnavailable { .. } => "FormatterUnavailable",
            Self::FormatterFailed { .. } => "FormatterFailed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        let err = FormatError::UnsupportedCase {
            case: "snake".into(),
        };
        assert_eq!(err.code(), "UnsupportedCase");
        let err = FormatError::InvalidInputType {
            actual: ValueKind::Integer,
        };
        assert_eq!(err.code(), "InvalidInputType");
        assert_eq!(err.to_string(), "input value must be a string, got integer");
    }

    #[test]
    fn test_wrapped_xml_error_keeps_position() {
        let err = FormatError::from(XmlError {
            message: "mismatched tag".into(),
            line: 1,
            column: 8,
        });
        assert_eq!(err.code(), "InvalidXml");
        assert_eq!(err.to_string(), "invalid XML data: mismatched tag: line 1, column 8");
    }
}
