//! # Date/Time Pattern Validation

use strata_core::parse_strict;

use crate::error::ValidationError;

pub use strata_core::DEFAULT_DATETIME_PATTERN;

/// Check that `value` is fully matched by the strftime-style `pattern`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDateTime`] naming the value and
/// pattern if the pattern is malformed, the parse leaves input unconsumed,
/// or the fields name an impossible date.
pub fn validate_datetime(value: &str, pattern: &str) -> Result<(), ValidationError> {
    parse_strict(value, pattern)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern() {
        assert!(validate_datetime("2024-09-27 13:45:00", DEFAULT_DATETIME_PATTERN).is_ok());
        assert!(validate_datetime("2024-09-27", DEFAULT_DATETIME_PATTERN).is_err());
    }

    #[test]
    fn test_custom_pattern() {
        assert!(validate_datetime("27/09/2024", "%d/%m/%Y").is_ok());
    }

    #[test]
    fn test_trailing_input_rejected() {
        let err = validate_datetime("2024-09-27 13:45:00Z", DEFAULT_DATETIME_PATTERN).unwrap_err();
        match err {
            ValidationError::InvalidDateTime(inner) => {
                assert_eq!(inner.value, "2024-09-27 13:45:00Z");
                assert_eq!(inner.pattern, DEFAULT_DATETIME_PATTERN);
            }
            other => panic!("expected InvalidDateTime, got {other}"),
        }
    }

    #[test]
    fn test_impossible_date_rejected() {
        assert!(validate_datetime("2023-02-29", "%Y-%m-%d").is_err());
        assert!(validate_datetime("2024-02-29", "%Y-%m-%d").is_ok());
    }

    #[test]
    fn test_malformed_pattern() {
        let err = validate_datetime("2024", "%Y-%").unwrap_err();
        assert_eq!(err.code(), "InvalidDateTime");
    }
}
