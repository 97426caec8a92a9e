//! # Code-Style Delegation
//!
//! Source-code formatting is never done in-process. Each style name maps to
//! a [`CodeFormatter`] collaborator held in a [`CodeStyleRegistry`]; the
//! stock registry knows `pep8`, which pipes the code through `autopep8 -`.
//!
//! Collaborators are resolved when a call is made, not when the registry is
//! built, so a missing tool only fails the calls that need it.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use std::sync::Arc;
use std::thread;

use crate::error::FormatError;

/// A collaborator that formats source code for one style.
pub trait CodeFormatter: Send + Sync {
    /// Format `code`. `style` is the registry key, used for error context.
    fn format(&self, style: &str, code: &str) -> Result<String, FormatError>;
}

/// Formats code by piping it through an external program's stdin/stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn locate(&self, style: &str) -> Result<PathBuf, FormatError> {
        which::which(&self.program).map_err(|e| FormatError::FormatterUnavailable {
            style: style.to_string(),
            reason: format!("{}: {e}", self.program),
        })
    }

    fn run(&self, style: &str, program: PathBuf, code: &str) -> Result<Output, FormatError> {
        let failed = |reason: String| FormatError::FormatterFailed {
            style: style.to_string(),
            reason,
        };

        let child = Command::new(&program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FormatError::FormatterUnavailable {
                style: style.to_string(),
                reason: format!("{}: {e}", program.display()),
            })?;
        let mut guard = ChildGuard(Some(child));

        let mut stdin = guard
            .child_mut()
            .and_then(|c| c.stdin.take())
            .ok_or_else(|| failed("stdin was not captured".to_string()))?;
        let input = code.to_owned();
        // Write on a separate thread so a large stdout cannot deadlock us.
        let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));

        let child = guard
            .take()
            .ok_or_else(|| failed("child process was already reaped".to_string()))?;
        let output = child
            .wait_with_output()
            .map_err(|e| failed(format!("waiting for {}: {e}", self.program)))?;

        match writer.join() {
            Ok(Ok(())) => {}
            // The tool may legitimately exit before reading everything.
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(failed(format!("writing to {}: {e}", self.program))),
            Err(_) => return Err(failed("stdin writer panicked".to_string())),
        }
        Ok(output)
    }
}

impl CodeFormatter for ExternalCommand {
    fn format(&self, style: &str, code: &str) -> Result<String, FormatError> {
        let program = self.locate(style)?;
        tracing::debug!(style, program = %program.display(), "running external code formatter");

        let output = self.run(style, program, code)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FormatError::FormatterFailed {
                style: style.to_string(),
                reason: format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            });
        }
        String::from_utf8(output.stdout).map_err(|e| FormatError::FormatterFailed {
            style: style.to_string(),
            reason: format!("{} produced non-UTF-8 output: {e}", self.program),
        })
    }
}

/// Kills and reaps the child if it is still owned when dropped.
struct ChildGuard(Option<Child>);

impl ChildGuard {
    fn child_mut(&mut self) -> Option<&mut Child> {
        self.0.as_mut()
    }

    fn take(&mut self) -> Option<Child> {
        self.0.take()
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.0.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Maps style names to their formatter collaborators.
#[derive(Clone, Default)]
pub struct CodeStyleRegistry {
    styles: HashMap<String, Arc<dyn CodeFormatter>>,
}

impl CodeStyleRegistry {
    /// A registry with no styles.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock registry: `pep8` via `autopep8 -`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("pep8", Arc::new(ExternalCommand::new("autopep8", ["-"])));
        registry
    }

    /// Add or replace the collaborator for `style`.
    pub fn register(&mut self, style: impl Into<String>, formatter: Arc<dyn CodeFormatter>) {
        self.styles.insert(style.into(), formatter);
    }

    pub fn get(&self, style: &str) -> Option<Arc<dyn CodeFormatter>> {
        self.styles.get(style).cloned()
    }

    /// Registered style names, sorted.
    pub fn styles(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.styles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for CodeStyleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeStyleRegistry")
            .field("styles", &self.styles())
            .finish()
    }
}

/// Format `code` with the collaborator registered for `style`.
///
/// # Errors
///
/// - [`FormatError::UnsupportedStyle`] if nothing is registered for `style`.
/// - [`FormatError::FormatterUnavailable`] if the collaborator cannot be located.
/// - [`FormatError::FormatterFailed`] if it runs but does not succeed.
pub fn format_code(
    code: &str,
    style: &str,
    registry: &CodeStyleRegistry,
) -> Result<String, FormatError> {
    let formatter = registry
        .get(style)
        .ok_or_else(|| FormatError::UnsupportedStyle {
            style: style.to_string(),
        })?;
    formatter.format(style, code)
}
