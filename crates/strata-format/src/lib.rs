//! # strata-format — Formatter
//!
//! Normalizes textual payloads into a canonical presentation. Every
//! operation is a free function returning `Result<String, FormatError>`;
//! none of them hold state between calls.
//!
//! ## Operations
//!
//! - [`format_string`] — apply a [`FormatCase`] to a string value.
//! - [`format_json`] — pretty-print with a per-level indent, keys kept in
//!   parse order.
//! - [`format_xml`] — recursive whitespace-only pretty-printing that
//!   leaves mixed content untouched.
//! - [`format_datetime`] — strict strftime parse, then re-render.
//! - [`format_code`] — delegate to a collaborator from a
//!   [`CodeStyleRegistry`].
//!
//! ## Crate Policy
//!
//! - Depends only on `strata-core` internally.
//! - Failures are reported through exactly one [`FormatError`] variant;
//!   codec errors from `strata-core` are wrapped, never returned bare.
//! - The only side effect in the crate is spawning an external formatter
//!   from [`ExternalCommand`].

pub mod case;
pub mod code;
pub mod datetime;
pub mod error;
pub mod json;
pub mod xml;

pub use case::{format_string, FormatCase, DEFAULT_CASE};
pub use code::{format_code, CodeFormatter, CodeStyleRegistry, ExternalCommand};
pub use datetime::{format_datetime, DEFAULT_DATETIME_PATTERN};
pub use error::FormatError;
pub use json::{format_json, DEFAULT_JSON_INDENT};
pub use xml::{format_xml, prettify, DEFAULT_XML_INDENT};
