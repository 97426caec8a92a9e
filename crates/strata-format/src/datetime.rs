//! # Date/Time Reformatting

use strata_core::DateTimeSpec;

use crate::error::FormatError;

pub use strata_core::DEFAULT_DATETIME_PATTERN;

/// Parse `value` strictly with `input_pattern` and render it with `output_pattern`.
///
/// # Errors
///
/// Returns [`FormatError::InvalidDateTime`] naming the offending value and
/// pattern when either pattern is malformed, the parse is not a full match,
/// or the output pattern needs a field the input did not provide.
pub fn format_datetime(
    value: &str,
    input_pattern: &str,
    output_pattern: &str,
) -> Result<String, FormatError> {
    let spec = DateTimeSpec::new(input_pattern, output_pattern).map_err(|e| {
        FormatError::InvalidDateTime(strata_core::DateTimeError {
            value: value.to_string(),
            ..e
        })
    })?;
    Ok(spec.reformat(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_to_european() {
        assert_eq!(
            format_datetime("2024-09-27", "%Y-%m-%d", "%d/%m/%Y").unwrap(),
            "27/09/2024"
        );
    }

    #[test]
    fn test_default_output_pattern() {
        assert_eq!(
            format_datetime("27/09/2024", "%d/%m/%Y", DEFAULT_DATETIME_PATTERN).unwrap(),
            "2024-09-27 00:00:00"
        );
    }

    #[test]
    fn test_month_names() {
        assert_eq!(
            format_datetime("Sep 27 2024", "%b %d %Y", "%A, %B %-d").unwrap(),
            "Friday, September 27"
        );
    }

    #[test]
    fn test_microsecond_fraction() {
        assert_eq!(
            format_datetime("12:00:00.123456", "%H:%M:%S.%f", "%H:%M:%S.%f").unwrap(),
            "12:00:00.123456"
        );
        assert_eq!(
            format_datetime("12:00:00.5", "%H:%M:%S.%f", "%H:%M:%S%.3f").unwrap(),
            "12:00:00.500"
        );
    }

    #[test]
    fn test_trailing_characters_rejected() {
        let err = format_datetime("2024-09-27T10", "%Y-%m-%d", "%d/%m/%Y").unwrap_err();
        match err {
            FormatError::InvalidDateTime(inner) => {
                assert_eq!(inner.value, "2024-09-27T10");
                assert_eq!(inner.pattern, "%Y-%m-%d");
            }
            other => panic!("expected InvalidDateTime, got {other}"),
        }
    }

    #[test]
    fn test_bad_output_pattern_names_value() {
        let err = format_datetime("2024-09-27", "%Y-%m-%d", "%Q").unwrap_err();
        match err {
            FormatError::InvalidDateTime(inner) => {
                assert_eq!(inner.value, "2024-09-27");
                assert_eq!(inner.pattern, "%Q");
            }
            other => panic!("expected InvalidDateTime, got {other}"),
        }
    }

    #[test]
    fn test_round_trip_lossless_pair() {
        let there = format_datetime("2024-02-29 23:59:58", "%Y-%m-%d %H:%M:%S", "%d.%m.%Y %H:%M:%S")
            .unwrap();
        let back =
            format_datetime(&there, "%d.%m.%Y %H:%M:%S", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(back, "2024-02-29 23:59:58");
    }
}
