//! # XML Document Validation

use strata_core::XmlDocument;

use crate::error::ValidationError;
use crate::xsd::XmlSchema;

/// Check well-formedness and, when `schema` is given, structure.
///
/// Well-formedness is always checked first, so a malformed document is
/// reported as `InvalidXml` even when a schema is supplied.
///
/// # Errors
///
/// - [`ValidationError::InvalidXml`] with line and column.
/// - [`ValidationError::SchemaViolation`] with an element path such as
///   `/order/item[2]`.
pub fn validate_xml(
    document: impl Into<XmlDocument>,
    schema: Option<&XmlSchema>,
) -> Result<(), ValidationError> {
    let root = document.into().into_root()?;
    match schema {
        Some(schema) => {
            tracing::debug!(root = %root.name, "validating XML against schema");
            schema.validate(&root)
        }
        None => Ok(()),
    }
}
