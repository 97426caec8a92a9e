//! # strata-core — Shared Codecs
//!
//! The leaf crate of the Strata workspace. It owns every codec the
//! formatter and validator share, so both sides parse documents exactly
//! the same way and wrap the same low-level failures.
//!
//! ## Contents
//!
//! - [`document`] — `JsonDocument` / `XmlDocument`, the text-or-tree
//!   inputs accepted by JSON and XML operations.
//! - [`xml`] — `XmlNode`, an owned element tree with text/tail content,
//!   its well-formedness-checking parser and its serializer.
//! - [`temporal`] — strict full-match strftime parsing and rendering.
//! - [`kind`] — `ValueKind` type tags for dynamic JSON values.
//! - [`error`] — codec errors with line/column or value/pattern context.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `strata-*` crates.
//! - Every function is pure: no global state, no I/O.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod kind;
pub mod temporal;
pub mod xml;

pub use document::{JsonDocument, XmlDocument};
pub use error::{DateTimeError, JsonSyntaxError, XmlError};
pub use kind::{UnknownValueKind, ValueKind};
pub use temporal::{
    check_pattern, parse_strict, DateTimeSpec, ParsedDateTime, DEFAULT_DATETIME_PATTERN,
};
pub use xml::{is_blank, local_part, XmlNode, MAX_DEPTH as MAX_XML_DEPTH};
