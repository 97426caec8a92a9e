//! # Temporal Patterns — Strict strftime Parsing
//!
//! Parses date/time strings against strftime-style patterns and renders
//! them back out. Parsing is a **strict full match**: every character of
//! the input must be consumed by the pattern, so trailing text is an error
//! rather than silently ignored.
//!
//! Fields the input pattern does not mention take fixed defaults, so a
//! date-only pattern yields midnight and a time-only pattern yields
//! 1900-01-01:
//!
//! | Missing field | Default |
//! |---|---|
//! | year | 1900 |
//! | month | 1 |
//! | day | 1 |
//! | hour / minute / second | 0 |
//! | AM/PM marker (with `%I`) | AM |
//!
//! Two directives follow the C/Python `strptime` convention rather than
//! chrono's:
//!
//! - `%f` is a fraction of a second of 1 to 6 digits, right-padded to
//!   microseconds when parsing (`.5` is half a second) and always rendered
//!   as exactly 6 digits.
//! - `%y` maps `69`-`99` to 1969-1999 and `00`-`68` to 2000-2068.
//!
//! When the pattern carries a UTC offset (`%z`, `%:z`), the parsed value
//! keeps it and offset-aware output tokens render correctly; otherwise the
//! value is naive and rendering an offset token fails cleanly.

use std::fmt::Write as _;

use chrono::format::{self, Item, Parsed, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::DateTimeError;

/// Output pattern used when a caller does not supply one.
pub const DEFAULT_DATETIME_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

/// A date/time value produced by a strict parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDateTime {
    /// No offset information was present in the input.
    Naive(NaiveDateTime),
    /// The input carried an explicit UTC offset.
    Offset(DateTime<FixedOffset>),
}

impl ParsedDateTime {
    /// Wall-clock date and time, ignoring any offset.
    pub fn naive_local(&self) -> NaiveDateTime {
        match self {
            Self::Naive(dt) => *dt,
            Self::Offset(dt) => dt.naive_local(),
        }
    }

    /// Render with a strftime-style pattern.
    ///
    /// # Errors
    ///
    /// Returns [`DateTimeError`] if the pattern is malformed or asks for a
    /// field the value does not carry (e.g. `%z` on a naive value).
    pub fn render(&self, pattern: &str) -> Result<String, DateTimeError> {
        let translated = split_micros(pattern).join("%6f");
        let items = compile_items(&translated, pattern, "")?;
        let mut out = String::new();
        let written = match self {
            Self::Naive(dt) => write!(out, "{}", dt.format_with_items(items.iter())),
            Self::Offset(dt) => write!(out, "{}", dt.format_with_items(items.iter())),
        };
        written.map_err(|_| {
            DateTimeError::new(
                "",
                pattern,
                "pattern requests a field the value does not carry",
            )
        })?;
        Ok(out)
    }
}

/// A pair of (input pattern, output pattern) used to reformat date strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeSpec {
    /// Pattern the input must fully match.
    pub input_pattern: String,
    /// Pattern used to render the result.
    pub output_pattern: String,
}

impl DateTimeSpec {
    /// Build a spec, checking both patterns up front.
    ///
    /// # Errors
    ///
    /// Returns [`DateTimeError`] naming the first malformed pattern.
    pub fn new(
        input_pattern: impl Into<String>,
        output_pattern: impl Into<String>,
    ) -> Result<Self, DateTimeError> {
        let spec = Self {
            input_pattern: input_pattern.into(),
            output_pattern: output_pattern.into(),
        };
        check_pattern(&spec.input_pattern)?;
        check_pattern(&spec.output_pattern)?;
        Ok(spec)
    }

    /// Parse `value` with the input pattern and render it with the output pattern.
    ///
    /// # Errors
    ///
    /// Returns [`DateTimeError`] if the parse is not a full match or the
    /// value cannot be rendered.
    pub fn reformat(&self, value: &str) -> Result<String, DateTimeError> {
        let parsed = parse_strict(value, &self.input_pattern)?;
        parsed.render(&self.output_pattern).map_err(|e| DateTimeError {
            value: value.to_string(),
            ..e
        })
    }
}

/// Check that `pattern` contains only recognized strftime tokens.
///
/// # Errors
///
/// Returns [`DateTimeError`] if any `%` directive is unknown or truncated.
pub fn check_pattern(pattern: &str) -> Result<(), DateTimeError> {
    compile_pattern(pattern, "").map(|_| ())
}

/// Parse `value` so that `pattern` consumes it completely.
///
/// # Errors
///
/// Returns [`DateTimeError`] if the pattern is malformed, the input does
/// not match, has trailing characters, or names an impossible date.
pub fn parse_strict(value: &str, pattern: &str) -> Result<ParsedDateTime, DateTimeError> {
    let segments = compile_pattern(pattern, value)?;
    let mut parsed = Parsed::new();
    let mut rest = value;
    for segment in &segments {
        rest = match segment {
            Segment::Items(items) => format::parse_and_remainder(&mut parsed, rest, items.iter())
                .map_err(|e| DateTimeError::new(value, pattern, e.to_string()))?,
            Segment::Micros => parse_micros(&mut parsed, rest)
                .map_err(|reason| DateTimeError::new(value, pattern, reason))?,
        };
    }
    if !rest.is_empty() {
        return Err(DateTimeError::new(
            value,
            pattern,
            format!("unconverted data remains: {rest:?}"),
        ));
    }

    apply_defaults(&mut parsed).map_err(|e| DateTimeError::new(value, pattern, e.to_string()))?;

    let date: NaiveDate = parsed
        .to_naive_date()
        .map_err(|e| DateTimeError::new(value, pattern, e.to_string()))?;
    let time: NaiveTime = parsed
        .to_naive_time()
        .map_err(|e| DateTimeError::new(value, pattern, e.to_string()))?;
    let naive = NaiveDateTime::new(date, time);

    match parsed.offset() {
        None => Ok(ParsedDateTime::Naive(naive)),
        Some(secs) => {
            let offset = FixedOffset::east_opt(secs).ok_or_else(|| {
                DateTimeError::new(value, pattern, format!("offset out of range: {secs}s"))
            })?;
            let zoned = naive.and_local_timezone(offset).single().ok_or_else(|| {
                DateTimeError::new(value, pattern, "ambiguous local time for offset")
            })?;
            Ok(ParsedDateTime::Offset(zoned))
        }
    }
}

/// A pattern cut at each `%f`, which chrono would read as nanoseconds.
enum Segment<'p> {
    Items(Vec<Item<'p>>),
    Micros,
}

fn compile_pattern<'p>(pattern: &'p str, value: &str) -> Result<Vec<Segment<'p>>, DateTimeError> {
    let mut segments = Vec::new();
    for (i, chunk) in split_micros(pattern).into_iter().enumerate() {
        if i > 0 {
            segments.push(Segment::Micros);
        }
        segments.push(Segment::Items(compile_items(chunk, pattern, value)?));
    }
    Ok(segments)
}

fn compile_items<'p>(
    chunk: &'p str,
    pattern: &str,
    value: &str,
) -> Result<Vec<Item<'p>>, DateTimeError> {
    let items: Vec<Item<'p>> = StrftimeItems::new(chunk).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(DateTimeError::new(
            value,
            pattern,
            "pattern contains an unknown or incomplete directive",
        ));
    }
    Ok(items)
}

/// Split `pattern` around every `%f` directive. `%%f` is a literal `%f`.
fn split_micros(pattern: &str) -> Vec<&str> {
    let bytes = pattern.as_bytes();
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            Some(b'f') => {
                chunks.push(&pattern[start..i]);
                i += 2;
                start = i;
            }
            Some(_) => i += 2,
            None => i += 1,
        }
    }
    chunks.push(&pattern[start..]);
    chunks
}

/// Consume 1 to 6 digits as a fraction of a second.
fn parse_micros<'a>(parsed: &mut Parsed, input: &'a str) -> Result<&'a str, String> {
    let digits = input
        .bytes()
        .take(6)
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return Err("expected 1 to 6 digits for %f".to_string());
    }
    let (fraction, rest) = input.split_at(digits);
    let value: i64 = fraction.parse().map_err(|e| format!("invalid %f: {e}"))?;
    let scale = 10_i64.pow(6 - digits as u32);
    parsed
        .set_nanosecond(value * scale * 1_000)
        .map_err(|e| e.to_string())?;
    Ok(rest)
}

/// Fill in the fields a pattern left unspecified.
///
/// A field is only defaulted when nothing else in the parse could determine
/// it (e.g. `%y`, `%j`, or week numbers), so explicit input always wins.
fn apply_defaults(parsed: &mut Parsed) -> format::ParseResult<()> {
    if parsed.timestamp().is_some() {
        return Ok(());
    }

    let year_known = parsed.year().is_some()
        || parsed.year_mod_100().is_some()
        || parsed.isoyear().is_some()
        || parsed.isoyear_mod_100().is_some();
    if !year_known {
        parsed.set_year(1900)?;
    }
    if let (Some(yy), None, None) = (parsed.year_mod_100(), parsed.year_div_100(), parsed.year()) {
        parsed.set_year_div_100(if yy < 69 { 20 } else { 19 })?;
    }

    let week_known = parsed.week_from_sun().is_some()
        || parsed.week_from_mon().is_some()
        || parsed.isoweek().is_some();
    let ordinal_known = parsed.ordinal().is_some();
    if parsed.month().is_none() && !ordinal_known && !week_known {
        parsed.set_month(1)?;
    }
    if parsed.day().is_none() && !ordinal_known && !week_known {
        parsed.set_day(1)?;
    }

    match (parsed.hour_div_12(), parsed.hour_mod_12()) {
        (None, None) => parsed.set_hour(0)?,
        (Some(_), None) => parsed.set_hour12(12)?,
        (None, Some(_)) => parsed.set_ampm(false)?,
        (Some(_), Some(_)) => {}
    }
    if parsed.minute().is_none() {
        parsed.set_minute(0)?;
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::Datelike;
    use proptest::prelude::*;

    proptest! {
        /// Reformatting through a lossless pattern pair and back is the identity.
        #[test]
        fn iso_and_european_patterns_round_trip(
            year in 1000i32..=9999,
            month in 1u32..=12,
            day in 1u32..=28,
        ) {
            let original = format!("{year:04}-{month:02}-{day:02}");
            let forward = DateTimeSpec::new("%Y-%m-%d", "%d/%m/%Y").unwrap();
            let backward = DateTimeSpec::new("%d/%m/%Y", "%Y-%m-%d").unwrap();
            let there = forward.reformat(&original).unwrap();
            let back = backward.reformat(&there).unwrap();
            prop_assert_eq!(back, original);
        }

        /// Microsecond fractions survive a reformat through another layout.
        #[test]
        fn fraction_round_trips(
            hour in 0u32..24,
            minute in 0u32..60,
            second in 0u32..60,
            micros in 0u32..1_000_000,
        ) {
            let original = format!("{hour:02}:{minute:02}:{second:02}.{micros:06}");
            let forward = DateTimeSpec::new("%H:%M:%S.%f", "%f|%S|%M|%H").unwrap();
            let backward = DateTimeSpec::new("%f|%S|%M|%H", "%H:%M:%S.%f").unwrap();
            let there = forward.reformat(&original).unwrap();
            prop_assert_eq!(backward.reformat(&there).unwrap(), original);
        }

        /// Any trailing suffix breaks the full-match requirement.
        #[test]
        fn trailing_suffix_is_rejected(suffix in "[a-zA-Z0-9 ]{1,8}") {
            let input = format!("2024-09-27{suffix}");
            prop_assert!(parse_strict(&input, "%Y-%m-%d").is_err());
        }

        /// Parsed calendar fields match the rendered string.
        #[test]
        fn parsed_fields_match_input(month in 1u32..=12, day in 1u32..=28) {
            let input = format!("2020-{month:02}-{day:02}");
            let dt = parse_strict(&input, "%Y-%m-%d").unwrap().naive_local();
            prop_assert_eq!(dt.month(), month);
            prop_assert_eq!(dt.day(), day);
        }
    }
}
