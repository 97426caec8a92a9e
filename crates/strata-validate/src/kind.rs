//! # Dynamic Type Checks

use serde_json::Value;
use strata_core::ValueKind;

use crate::error::ValidationError;

/// Check that `value` is of the `expected` kind.
///
/// An expected [`ValueKind::Number`] also accepts integers; every other
/// kind must match exactly.
///
/// # Errors
///
/// Returns [`ValidationError::TypeMismatch`] with both kinds.
pub fn validate_type(value: &Value, expected: ValueKind) -> Result<(), ValidationError> {
    let actual = ValueKind::of(value);
    if expected.accepts(actual) {
        Ok(())
    } else {
        Err(ValidationError::TypeMismatch { expected, actual })
    }
}
