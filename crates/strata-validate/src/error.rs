//! # Validation Errors
//!
//! A failed validation surfaces exactly one [`ValidationError`]. Schema
//! failures carry the offending location so a caller can point at it
//! without re-running the check.

use strata_core::{DateTimeError, JsonSyntaxError, ValueKind, XmlError};
use thiserror::Error;

/// Failure of a validation operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// String validation was given a non-textual value.
    #[error("value must be a string, got {actual}")]
    NotAString {
        /// Kind of the value that was supplied.
        actual: ValueKind,
    },

    /// Fewer characters than the minimum.
    #[error("string length {length} is shorter than the minimum of {min_length}")]
    TooShort { length: usize, min_length: usize },

    /// More characters than the maximum.
    #[error("string length {length} is longer than the maximum of {max_length}")]
    TooLong { length: usize, max_length: usize },

    /// The string does not match the required pattern at its start.
    #[error("string does not match pattern {pattern:?}")]
    PatternMismatch { pattern: String },

    /// The pattern itself does not compile.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The JSON document does not parse.
    #[error("invalid JSON data: {0}")]
    InvalidJson(#[from] JsonSyntaxError),

    /// The XML document is not well-formed.
    #[error("invalid XML data: {0}")]
    InvalidXml(#[from] XmlError),

    /// The document parsed but broke a schema rule.
    #[error("schema violation at {path} ({rule}): {message}")]
    SchemaViolation {
        /// Location of the offending node: a JSON Pointer for JSON
        /// (`(root)` for the document itself) or an element path such as
        /// `/order/item[2]` for XML.
        path: String,
        /// The schema rule that failed.
        rule: String,
        /// Human-readable description.
        message: String,
    },

    /// The schema could not be compiled.
    #[error("invalid schema: {reason}")]
    InvalidSchema { reason: String },

    /// The date/time string does not fully match its pattern.
    #[error("invalid date/time: {0}")]
    InvalidDateTime(#[from] DateTimeError),

    /// A dynamic value is not of the expected kind.
    #[error("expected {expected}, got {actual}")]
    TypeMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },
}

impl ValidationError {
    /// Stable, dispatchable name of the failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAString { .. } => "NotAString",
            Self::TooShort { .. } => "TooShort",
            Self::TooLong { .. } => "TooLong",
            Self::PatternMismatch { .. } => "PatternMismatch",
            Self::InvalidPattern { .. } => "InvalidPattern",
            Self::InvalidJson(_) => "InvalidJson",
            Self::InvalidXml(_) => "InvalidXml",
            Self::SchemaViolation { .. } => "SchemaViolation",
            Self::InvalidSchema { .. } => "InvalidSchema",
            Self::InvalidDateTime(_) => "InvalidDateTime",
            Self::TypeMismatch { .. } => "TypeMismatch",
        }
    }

    pub(crate) fn violation(
        path: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SchemaViolation {
            path: path.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_schema(reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            reason: reason.into(),
        }
    }
}
