//! # strata-cli — Command-Line Front End
//!
//! Provides the `strata` command, a thin shell over `strata-format` and
//! `strata-validate`.
//!
//! ## Subcommands
//!
//! - `strata format {string,json,xml,datetime,code}` — print the formatted
//!   value on stdout.
//! - `strata validate {string,json,xml,datetime,type}` — report whether the
//!   input is valid, as text or (`--output json`) a JSON report.
//!
//! ```bash
//! strata format json --indent 2 data.json
//! echo '<a><b/></a>' | strata format xml
//! strata validate xml order.xml --schema order.xsd --output json
//! ```
//!
//! ## Exit Codes
//!
//! - `0` — success.
//! - `1` — the input failed to format or validate; the error code and
//!   message are printed.
//! - `2` — usage, configuration or I/O error.

pub mod config;
pub mod format;
pub mod validate;

use std::fmt::Display;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

/// Exit code for a successful command.
pub const EXIT_OK: u8 = 0;
/// Exit code when the input fails to format or validate.
pub const EXIT_FAILURE: u8 = 1;
/// Exit code for usage, configuration and I/O errors.
pub const EXIT_ERROR: u8 = 2;

/// Read a document from `source`, or from stdin when it is absent or `-`.
pub fn read_document(source: Option<&Path>) -> Result<String> {
    match source {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display())),
        _ => read_stdin(),
    }
}

/// Take a value from the command line, or from stdin when it is absent or
/// `-`. A single trailing line break on stdin is dropped.
pub fn read_value(value: Option<&str>) -> Result<String> {
    match value {
        Some(value) if value != "-" => Ok(value.to_string()),
        _ => {
            let mut text = read_stdin()?;
            if text.ends_with('\n') {
                text.pop();
                if text.ends_with('\r') {
                    text.pop();
                }
            }
            Ok(text)
        }
    }
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("cannot read standard input")?;
    Ok(buf)
}

/// Print a library failure as `error[Code]: message` on stderr.
pub fn report_failure(code: &str, err: &dyn Display) {
    eprintln!("error[{code}]: {err}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_document_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "{\"a\": 1}\n").unwrap();
        assert_eq!(read_document(Some(&path)).unwrap(), "{\"a\": 1}\n");
    }

    #[test]
    fn test_read_document_missing_file() {
        let err = read_document(Some(Path::new("/nonexistent/doc.json"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/doc.json"));
    }

    #[test]
    fn test_read_value_literal() {
        assert_eq!(read_value(Some("hello world")).unwrap(), "hello world");
    }
}
