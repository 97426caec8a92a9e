//! # strata-validate — Validator
//!
//! Checks values of a known shape and returns `Ok(())` or exactly one
//! [`ValidationError`]. Nothing is ever partially valid, and nothing is
//! cached between calls.
//!
//! ## Operations
//!
//! - [`validate_string`] — type, length bounds, then a start-anchored pattern.
//! - [`validate_json`] — syntax, then an optional JSON Schema (first
//!   violation only, no network access during `$ref` resolution).
//! - [`validate_xml`] — well-formedness, then an optional [`XmlSchema`].
//! - [`validate_datetime`] — strict full-match strftime parse.
//! - [`validate_type`] — dynamic kind check against a [`ValueKind`].
//!
//! ## Crate Policy
//!
//! - Depends only on `strata-core` internally.
//! - Schema failures always carry the offending path.
//! - Unsupported schema constructs fail compilation; they are never
//!   silently skipped.

pub mod datetime;
pub mod error;
pub mod json;
pub mod kind;
pub mod string;
pub mod xml;
pub mod xsd;

pub use datetime::{validate_datetime, DEFAULT_DATETIME_PATTERN};
pub use error::ValidationError;
pub use json::validate_json;
pub use kind::validate_type;
pub use string::validate_string;
pub use strata_core::ValueKind;
pub use xml::validate_xml;
pub use xsd::{Builtin, XmlSchema};
