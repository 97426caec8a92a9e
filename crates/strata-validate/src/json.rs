//! # JSON Document Validation
//!
//! Syntax first, then an optional JSON Schema. The schema dialect is taken
//! from its `$schema` keyword (Draft 2020-12 when absent). Schemas are
//! compiled offline: `$ref`s into the schema itself resolve normally, but
//! any reference that would need to be fetched is a compile error.

use jsonschema::{Retrieve, Uri};
use serde_json::Value;
use strata_core::JsonDocument;

use crate::error::ValidationError;

/// Refuses every external `$ref`, so compilation never touches the network.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external schema reference {} is not resolvable offline", uri.as_str()).into())
    }
}

/// Parse a JSON document and, when `schema` is given, check it.
///
/// Only the first violation is reported.
///
/// # Errors
///
/// - [`ValidationError::InvalidJson`] if text input does not parse.
/// - [`ValidationError::InvalidSchema`] if `schema` does not compile.
/// - [`ValidationError::SchemaViolation`] naming the instance path (JSON
///   Pointer, `(root)` for the document itself), the schema keyword path
///   and the validator's message.
pub fn validate_json(
    document: impl Into<JsonDocument>,
    schema: Option<&Value>,
) -> Result<(), ValidationError> {
    let instance = document.into().into_value()?;
    let Some(schema) = schema else {
        return Ok(());
    };

    tracing::debug!("compiling JSON schema");
    let validator = jsonschema::options()
        .with_retriever(OfflineRetriever)
        .build(schema)
        .map_err(|e| ValidationError::invalid_schema(e.to_string()))?;

    let result = match validator.iter_errors(&instance).next() {
        None => Ok(()),
        Some(e) => {
            let path = e.instance_path.to_string();
            Err(ValidationError::violation(
                if path.is_empty() { "(root)".to_string() } else { path },
                e.schema_path.to_string(),
                e.to_string(),
            ))
        }
    };
    result
}
