//! # Validate CLI — Check values and documents.
//!
//! ```bash
//! strata validate string "AB-123" --pattern "[A-Z]{2}-" --min-length 6
//! strata validate json order.json --schema order.schema.json
//! strata validate xml order.xml --schema order.xsd --output json
//! strata validate datetime "2024-09-27 08:00:00"
//! strata validate type '[1, 2]' --expected array
//! ```
//!
//! Text output prints `valid` on stdout, or `error[Code]: message` on
//! stderr. JSON output always prints one report object on stdout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use strata_validate::{
    validate_datetime, validate_json, validate_string, validate_type, validate_xml,
    ValidationError, ValueKind, XmlSchema,
};

use crate::config::StrataConfig;
use crate::{read_document, report_failure, EXIT_FAILURE, EXIT_OK};

/// How validation results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Validate subcommand arguments.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Result format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: ValidateCommand,
}

/// Available validate subcommands.
#[derive(Subcommand, Debug)]
pub enum ValidateCommand {
    /// Check a string's length and leading pattern.
    String {
        value: String,

        /// Regular expression the value must match from its first character.
        #[arg(long)]
        pattern: Option<String>,

        #[arg(long)]
        min_length: Option<usize>,

        #[arg(long)]
        max_length: Option<usize>,

        /// Treat VALUE as a JSON value rather than literal text.
        #[arg(long)]
        json: bool,
    },

    /// Check JSON syntax, and a JSON Schema when given.
    Json {
        /// Input file; `-` or omitted reads stdin.
        input: Option<PathBuf>,

        /// JSON Schema file.
        #[arg(long)]
        schema: Option<PathBuf>,
    },

    /// Check XML well-formedness, and an XSD when given.
    Xml {
        /// Input file; `-` or omitted reads stdin.
        input: Option<PathBuf>,

        /// XSD file.
        #[arg(long)]
        schema: Option<PathBuf>,
    },

    /// Check that a date/time string fully matches a pattern.
    Datetime {
        value: String,

        #[arg(long)]
        pattern: Option<String>,
    },

    /// Check the kind of a JSON value.
    Type {
        /// A JSON value; text that does not parse is taken as a string.
        value: String,

        /// One of null, boolean, integer, number, string, array, object.
        #[arg(long)]
        expected: ValueKind,
    },
}

/// Machine-readable outcome of one validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl From<&Result<(), ValidationError>> for Report {
    fn from(outcome: &Result<(), ValidationError>) -> Self {
        let Err(err) = outcome else {
            return Self {
                valid: true,
                code: None,
                message: None,
                path: None,
                rule: None,
            };
        };
        let (path, rule) = match err {
            ValidationError::SchemaViolation { path, rule, .. } => {
                (Some(path.clone()), Some(rule.clone()))
            }
            _ => (None, None),
        };
        Self {
            valid: false,
            code: Some(err.code()),
            message: Some(err.to_string()),
            path,
            rule,
        }
    }
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, config: &StrataConfig) -> Result<u8> {
    let outcome = execute(&args.command, config)?;
    match args.output {
        OutputFormat::Json => {
            let report = Report::from(&outcome);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => match &outcome {
            Ok(()) => println!("valid"),
            Err(e) => report_failure(e.code(), e),
        },
    }
    Ok(if outcome.is_ok() { EXIT_OK } else { EXIT_FAILURE })
}

/// Run the validation for `command`.
///
/// The outer `Result` carries I/O errors, the inner one validation failures.
pub fn execute(
    command: &ValidateCommand,
    config: &StrataConfig,
) -> Result<Result<(), ValidationError>> {
    let outcome = match command {
        ValidateCommand::String {
            value,
            pattern,
            min_length,
            max_length,
            json,
        } => {
            let value = if *json {
                serde_json::from_str(value).context("VALUE is not valid JSON")?
            } else {
                Value::String(value.clone())
            };
            validate_string(&value, pattern.as_deref(), *min_length, *max_length)
        }
        ValidateCommand::Json { input, schema } => {
            let text = read_document(input.as_deref())?;
            match schema {
                Some(path) => match load_json_schema(path)? {
                    Ok(schema) => validate_json(text, Some(&schema)),
                    Err(e) => Err(e),
                },
                None => validate_json(text, None),
            }
        }
        ValidateCommand::Xml { input, schema } => {
            let text = read_document(input.as_deref())?;
            match schema {
                Some(path) => {
                    let xsd = std::fs::read_to_string(path)
                        .with_context(|| format!("cannot read schema {}", path.display()))?;
                    XmlSchema::parse(&xsd).and_then(|schema| validate_xml(text, Some(&schema)))
                }
                None => validate_xml(text, None),
            }
        }
        ValidateCommand::Datetime { value, pattern } => {
            validate_datetime(value, pattern.as_deref().unwrap_or(&config.datetime_pattern))
        }
        ValidateCommand::Type { value, expected } => {
            let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.clone()));
            validate_type(&value, *expected)
        }
    };
    Ok(outcome)
}

/// Read a JSON Schema file. A file that is not JSON is an invalid schema,
/// not an I/O error.
fn load_json_schema(path: &Path) -> Result<Result<Value, ValidationError>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read schema {}", path.display()))?;
    Ok(
        serde_json::from_str(&text).map_err(|e| ValidationError::InvalidSchema {
            reason: format!("{} is not valid JSON: {e}", path.display()),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_string_length_bounds() {
        let cmd = ValidateCommand::String {
            value: "ab".to_string(),
            pattern: None,
            min_length: Some(3),
            max_length: None,
            json: false,
        };
        let outcome = execute(&cmd, &StrataConfig::default()).unwrap();
        assert_eq!(outcome.unwrap_err().code(), "TooShort");
    }

    #[test]
    fn test_string_json_value_not_a_string() {
        let cmd = ValidateCommand::String {
            value: "[1]".to_string(),
            pattern: None,
            min_length: None,
            max_length: None,
            json: true,
        };
        let outcome = execute(&cmd, &StrataConfig::default()).unwrap();
        assert_eq!(outcome.unwrap_err().code(), "NotAString");
    }

    #[test]
    fn test_json_against_schema_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = write(dir.path(), "doc.json", r#"{"name":"x"}"#);
        let schema = write(
            dir.path(),
            "schema.json",
            r#"{"type":"object","required":["name","age"]}"#,
        );
        let cmd = ValidateCommand::Json {
            input: Some(doc),
            schema: Some(schema),
        };
        let outcome = execute(&cmd, &StrataConfig::default()).unwrap();
        let report = Report::from(&outcome);
        assert!(!report.valid);
        assert_eq!(report.code, Some("SchemaViolation"));
        assert_eq!(report.path.as_deref(), Some("(root)"));
        assert!(report.message.unwrap().contains("age"));
    }

    #[test]
    fn test_json_schema_file_not_json() {
        let dir = tempfile::tempdir().unwrap();
        let doc = write(dir.path(), "doc.json", "{}");
        let schema = write(dir.path(), "schema.json", "{type: object}");
        let cmd = ValidateCommand::Json {
            input: Some(doc),
            schema: Some(schema),
        };
        let outcome = execute(&cmd, &StrataConfig::default()).unwrap();
        assert_eq!(outcome.unwrap_err().code(), "InvalidSchema");
    }

    #[test]
    fn test_json_missing_schema_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = write(dir.path(), "doc.json", "{}");
        let cmd = ValidateCommand::Json {
            input: Some(doc),
            schema: Some(dir.path().join("absent.json")),
        };
        assert!(execute(&cmd, &StrataConfig::default()).is_err());
    }

    #[test]
    fn test_xml_against_xsd_file() {
        let dir = tempfile::tempdir().unwrap();
        let xsd = write(
            dir.path(),
            "note.xsd",
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:element name="note" type="xs:string"/>
               </xs:schema>"#,
        );
        let good = write(dir.path(), "good.xml", "<note>hi</note>");
        let bad = write(dir.path(), "bad.xml", "<memo>hi</memo>");

        let cmd = ValidateCommand::Xml {
            input: Some(good),
            schema: Some(xsd.clone()),
        };
        assert!(execute(&cmd, &StrataConfig::default()).unwrap().is_ok());

        let cmd = ValidateCommand::Xml {
            input: Some(bad),
            schema: Some(xsd),
        };
        let report = Report::from(&execute(&cmd, &StrataConfig::default()).unwrap());
        assert_eq!(report.code, Some("SchemaViolation"));
        assert_eq!(report.path.as_deref(), Some("/memo"));
    }

    #[test]
    fn test_datetime_uses_config_pattern() {
        let config = StrataConfig {
            datetime_pattern: "%d/%m/%Y".to_string(),
            ..StrataConfig::default()
        };
        let cmd = ValidateCommand::Datetime {
            value: "27/09/2024".to_string(),
            pattern: None,
        };
        assert!(execute(&cmd, &config).unwrap().is_ok());
        assert!(execute(&cmd, &StrataConfig::default()).unwrap().is_err());
    }

    #[test]
    fn test_type_falls_back_to_string() {
        let cmd = ValidateCommand::Type {
            value: "hello".to_string(),
            expected: ValueKind::String,
        };
        assert!(execute(&cmd, &StrataConfig::default()).unwrap().is_ok());

        let cmd = ValidateCommand::Type {
            value: "1.5".to_string(),
            expected: ValueKind::Integer,
        };
        let outcome = execute(&cmd, &StrataConfig::default()).unwrap();
        assert_eq!(
            outcome.unwrap_err(),
            ValidationError::TypeMismatch {
                expected: ValueKind::Integer,
                actual: ValueKind::Number,
            }
        );
    }

    #[test]
    fn test_report_for_success_is_minimal() {
        let report = Report::from(&Ok(()));
        assert_eq!(serde_json::to_string(&report).unwrap(), r#"{"valid":true}"#);
    }
}
