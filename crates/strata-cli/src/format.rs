//! # Format CLI — Reformat values and documents.
//!
//! ```bash
//! strata format string --case title "hello world"
//! strata format json --indent 2 data.json
//! strata format xml --indent 4 < feed.xml
//! strata format datetime "2024-09-27" --from "%Y-%m-%d" --to "%d/%m/%Y"
//! strata format code --style pep8 script.py
//! ```
//!
//! Options left off fall back to the loaded [`StrataConfig`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::Value;
use strata_format::{
    format_code, format_datetime, format_json, format_string, format_xml, FormatCase, FormatError,
};

use crate::config::StrataConfig;
use crate::{read_document, read_value, report_failure, EXIT_FAILURE, EXIT_OK};

/// Style used by `format code` when `--style` is omitted.
pub const DEFAULT_CODE_STYLE: &str = "pep8";

/// Format subcommand arguments.
#[derive(Args, Debug)]
pub struct FormatArgs {
    #[command(subcommand)]
    pub command: FormatCommand,
}

/// Available format subcommands.
#[derive(Subcommand, Debug)]
pub enum FormatCommand {
    /// Apply a case transform to a string.
    String {
        /// One of upper, lower, capitalize, title.
        #[arg(long)]
        case: Option<String>,

        /// Treat VALUE as a JSON value rather than literal text.
        #[arg(long)]
        json: bool,

        /// Value to transform; `-` or omitted reads stdin.
        value: Option<String>,
    },

    /// Pretty-print a JSON document, keeping key order.
    Json {
        /// Spaces per nesting level.
        #[arg(long)]
        indent: Option<usize>,

        /// Input file; `-` or omitted reads stdin.
        input: Option<PathBuf>,
    },

    /// Pretty-print an XML document.
    Xml {
        /// Indent unit: literal whitespace, or a number of spaces.
        #[arg(long)]
        indent: Option<String>,

        /// Input file; `-` or omitted reads stdin.
        input: Option<PathBuf>,
    },

    /// Reparse a date/time string and render it with another pattern.
    Datetime {
        /// Date/time string to reformat.
        value: String,

        /// Pattern VALUE must fully match.
        #[arg(long)]
        from: String,

        /// Output pattern.
        #[arg(long)]
        to: Option<String>,
    },

    /// Format source code with the collaborator registered for a style.
    Code {
        /// Style name (built in: pep8; more via `code_styles` in the config).
        #[arg(long, default_value = DEFAULT_CODE_STYLE)]
        style: String,

        /// Input file; `-` or omitted reads stdin.
        input: Option<PathBuf>,
    },
}

/// Execute the format subcommand.
pub fn run_format(args: &FormatArgs, config: &StrataConfig) -> Result<u8> {
    match execute(&args.command, config)? {
        Ok(formatted) => {
            if formatted.ends_with('\n') {
                print!("{formatted}");
            } else {
                println!("{formatted}");
            }
            Ok(EXIT_OK)
        }
        Err(e) => {
            report_failure(e.code(), &e);
            Ok(EXIT_FAILURE)
        }
    }
}

/// Produce the formatted text for `command`.
///
/// The outer `Result` carries I/O errors, the inner one formatting failures.
pub fn execute(
    command: &FormatCommand,
    config: &StrataConfig,
) -> Result<Result<String, FormatError>> {
    let outcome = match command {
        FormatCommand::String { case, json, value } => {
            let text = read_value(value.as_deref())?;
            let value = if *json {
                serde_json::from_str(&text).context("VALUE is not valid JSON")?
            } else {
                Value::String(text)
            };
            let case = match case {
                Some(name) => name.parse::<FormatCase>(),
                None => Ok(config.case),
            };
            case.and_then(|case| format_string(&value, case))
        }
        FormatCommand::Json { indent, input } => {
            let text = read_document(input.as_deref())?;
            format_json(text, indent.unwrap_or(config.json_indent))
        }
        FormatCommand::Xml { indent, input } => {
            let text = read_document(input.as_deref())?;
            let unit = match indent {
                Some(arg) => indent_unit(arg),
                None => config.xml_indent.clone(),
            };
            format_xml(text, &unit)
        }
        FormatCommand::Datetime { value, from, to } => {
            let output = to.as_deref().unwrap_or(&config.datetime_output);
            format_datetime(value, from, output)
        }
        FormatCommand::Code { style, input } => {
            let code = read_document(input.as_deref())?;
            format_code(&code, style, &config.code_registry())
        }
    };
    Ok(outcome)
}

/// `"4"` means four spaces; anything else is used verbatim.
fn indent_unit(arg: &str) -> String {
    match arg.parse::<usize>() {
        Ok(width) => " ".repeat(width),
        Err(_) => arg.to_string(),
    }
}
