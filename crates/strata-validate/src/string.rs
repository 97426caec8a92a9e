//! # String Constraints

use regex::Regex;
use serde_json::Value;
use strata_core::ValueKind;

use crate::error::ValidationError;

/// Check a dynamic value against optional length bounds and a pattern.
///
/// Checks run in a fixed order and the first failure wins: the value must
/// be a string, then at least `min_length` characters, then at most
/// `max_length`, then `pattern` must match at the start of the string
/// (it need not consume the whole string). Lengths count Unicode scalar
/// values. An empty pattern imposes no constraint.
///
/// # Errors
///
/// `NotAString`, `TooShort`, `TooLong`, `PatternMismatch`, or
/// `InvalidPattern` when `pattern` does not compile.
pub fn validate_string(
    value: &Value,
    pattern: Option<&str>,
    min_length: Option<usize>,
    max_length: Option<usize>,
) -> Result<(), ValidationError> {
    let Value::String(text) = value else {
        return Err(ValidationError::NotAString {
            actual: ValueKind::of(value),
        });
    };

    let length = text.chars().count();
    if let Some(min_length) = min_length {
        if length < min_length {
            return Err(ValidationError::TooShort { length, min_length });
        }
    }
    if let Some(max_length) = max_length {
        if length > max_length {
            return Err(ValidationError::TooLong { length, max_length });
        }
    }

    match pattern {
        Some(pattern) if !pattern.is_empty() => check_prefix_match(text, pattern),
        _ => Ok(()),
    }
}

fn check_prefix_match(text: &str, pattern: &str) -> Result<(), ValidationError> {
    let re = Regex::new(pattern).map_err(|e| ValidationError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    // The leftmost match starts at 0 whenever any match does.
    let anchored = re.find(text).is_some_and(|m| m.start() == 0);
    if anchored {
        Ok(())
    } else {
        Err(ValidationError::PatternMismatch {
            pattern: pattern.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_min_length_boundary() {
        assert_eq!(
            validate_string(&json!("ab"), None, Some(3), None),
            Err(ValidationError::TooShort {
                length: 2,
                min_length: 3
            })
        );
        assert!(validate_string(&json!("abc"), None, Some(3), Some(3)).is_ok());
    }

    #[test]
    fn test_max_length_boundary() {
        assert_eq!(
            validate_string(&json!("abcd"), None, None, Some(3)),
            Err(ValidationError::TooLong {
                length: 4,
                max_length: 3
            })
        );
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(validate_string(&json!("été"), None, Some(3), Some(3)).is_ok());
    }

    #[test]
    fn test_pattern_anchored_at_start_only() {
        assert!(validate_string(&json!("abc123"), Some("[a-z]+"), None, None).is_ok());
        assert_eq!(
            validate_string(&json!("123abc"), Some("[a-z]+"), None, None),
            Err(ValidationError::PatternMismatch {
                pattern: "[a-z]+".into()
            })
        );
    }

    #[test]
    fn test_empty_pattern_is_no_constraint() {
        assert!(validate_string(&json!("anything"), Some(""), None, None).is_ok());
    }

    #[test]
    fn test_type_checked_first() {
        let err = validate_string(&json!(12), Some("x"), Some(5), None).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotAString {
                actual: ValueKind::Integer
            }
        );
    }

    #[test]
    fn test_length_checked_before_pattern() {
        let err = validate_string(&json!("1"), Some("[a-z]"), Some(2), None).unwrap_err();
        assert_eq!(err.code(), "TooShort");
    }

    #[test]
    fn test_invalid_pattern() {
        let err = validate_string(&json!("a"), Some("(unclosed"), None, None).unwrap_err();
        assert_eq!(err.code(), "InvalidPattern");
    }

    #[test]
    fn test_email_like_pattern() {
        let pattern = r"[\w.+-]+@[\w-]+\.[\w.]+";
        assert!(validate_string(&json!("dev@example.org"), Some(pattern), None, None).is_ok());
        assert!(validate_string(&json!("not an email"), Some(pattern), None, None).is_err());
    }
}
