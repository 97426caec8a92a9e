//! # CLI Configuration
//!
//! Defaults for options the user leaves off the command line, read from a
//! YAML file. Lookup order: `--config FILE`, then the `STRATA_CONFIG`
//! environment variable, then `./strata.yaml`. An explicitly named file
//! must exist; when nothing is found the built-in defaults apply.
//!
//! ```yaml
//! case: title
//! json_indent: 2
//! xml_indent: "\t"
//! datetime_output: "%d/%m/%Y"
//! datetime_pattern: "%Y-%m-%dT%H:%M:%S"
//! code_styles:
//!   black:
//!     program: black
//!     args: ["--quiet", "-"]
//! ```

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use strata_format::{
    CodeStyleRegistry, ExternalCommand, FormatCase, DEFAULT_CASE, DEFAULT_DATETIME_PATTERN,
    DEFAULT_JSON_INDENT, DEFAULT_XML_INDENT,
};

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "STRATA_CONFIG";

/// File looked up in the working directory when nothing else names one.
pub const DEFAULT_CONFIG_FILE: &str = "strata.yaml";

/// Defaults applied by the CLI when an option is omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrataConfig {
    /// Case for `format string`.
    pub case: FormatCase,
    /// Spaces per level for `format json`.
    pub json_indent: usize,
    /// Indent unit for `format xml`.
    pub xml_indent: String,
    /// Output pattern for `format datetime`.
    pub datetime_output: String,
    /// Pattern for `validate datetime`.
    pub datetime_pattern: String,
    /// Extra code styles, registered on top of the built-in ones.
    pub code_styles: BTreeMap<String, CodeStyleConfig>,
}

/// An external program that formats code read from stdin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodeStyleConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for StrataConfig {
    fn default() -> Self {
        Self {
            case: DEFAULT_CASE,
            json_indent: DEFAULT_JSON_INDENT,
            xml_indent: DEFAULT_XML_INDENT.to_string(),
            datetime_output: DEFAULT_DATETIME_PATTERN.to_string(),
            datetime_pattern: DEFAULT_DATETIME_PATTERN.to_string(),
            code_styles: BTreeMap::new(),
        }
    }
}

impl StrataConfig {
    /// Parse a configuration document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty file deserializes to unit, not to an empty mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text).context("invalid configuration")?;
        Ok(config)
    }

    /// Locate, read and check the configuration for this invocation.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot determine working directory")?;
        let Some(path) = resolve_path(explicit, std::env::var_os(CONFIG_ENV), &cwd) else {
            tracing::debug!("no configuration file, using defaults");
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read configuration {}", path.display()))?;
        let config =
            Self::from_yaml(&text).with_context(|| format!("in {}", path.display()))?;

        let problems = config.validate();
        if !problems.is_empty() {
            bail!(
                "configuration {} is invalid:\n  - {}",
                path.display(),
                problems.join("\n  - ")
            );
        }
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Check the configuration for values that would fail at use time.
    ///
    /// Returns one message per problem; empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.xml_indent.chars().all(|c| matches!(c, ' ' | '\t')) {
            errors.push(format!(
                "xml_indent must contain only spaces and tabs, got {:?}",
                self.xml_indent
            ));
        }
        for (field, pattern) in [
            ("datetime_output", &self.datetime_output),
            ("datetime_pattern", &self.datetime_pattern),
        ] {
            if let Err(e) = strata_core::check_pattern(pattern) {
                errors.push(format!("{field}: {}", e.reason));
            }
        }
        for (name, style) in &self.code_styles {
            if name.trim().is_empty() {
                errors.push("code style names must not be empty".to_string());
            }
            if style.program.trim().is_empty() {
                errors.push(format!("code style {name:?} has an empty program"));
            }
        }
        errors
    }

    /// The built-in code styles plus those declared in `code_styles`.
    ///
    /// A declared style replaces a built-in one of the same name.
    pub fn code_registry(&self) -> CodeStyleRegistry {
        let mut registry = CodeStyleRegistry::with_defaults();
        for (name, style) in &self.code_styles {
            registry.register(
                name.clone(),
                Arc::new(ExternalCommand::new(style.program.clone(), style.args.clone())),
            );
        }
        registry
    }
}

/// Pick the configuration file: explicit flag, then environment, then
/// `strata.yaml` in `cwd` if it exists.
fn resolve_path(explicit: Option<&Path>, env: Option<OsString>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env.filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let local = cwd.join(DEFAULT_CONFIG_FILE);
    local.is_file().then_some(local)
}
