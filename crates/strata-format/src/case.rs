//! # String Case Transforms

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strata_core::ValueKind;

use crate::error::FormatError;

/// The case transforms `format_string` supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatCase {
    /// Every character upper-cased.
    Upper,
    /// Every character lower-cased.
    Lower,
    /// First character upper-cased, the rest lower-cased.
    Capitalize,
    /// First character of every word upper-cased, the rest lower-cased.
    Title,
}

/// Case applied when a caller does not choose one.
pub const DEFAULT_CASE: FormatCase = FormatCase::Capitalize;

impl FormatCase {
    pub fn all() -> &'static [FormatCase] {
        &[Self::Upper, Self::Lower, Self::Capitalize, Self::Title]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upper => "upper",
            Self::Lower => "lower",
            Self::Capitalize => "capitalize",
            Self::Title => "title",
        }
    }

    /// Apply the transform to `text`.
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::Upper => text.to_uppercase(),
            Self::Lower => text.to_lowercase(),
            Self::Capitalize => capitalize(text),
            Self::Title => title(text),
        }
    }
}

impl std::fmt::Display for FormatCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatCase {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upper" => Ok(Self::Upper),
            "lower" => Ok(Self::Lower),
            "capitalize" => Ok(Self::Capitalize),
            "title" => Ok(Self::Title),
            other => Err(FormatError::UnsupportedCase {
                case: other.to_string(),
            }),
        }
    }
}

/// Apply `case` to a dynamic value that must be a string.
///
/// # Errors
///
/// Returns [`FormatError::InvalidInputType`] if `value` is not a string.
pub fn format_string(value: &Value, case: FormatCase) -> Result<String, FormatError> {
    match value {
        Value::String(text) => Ok(case.apply(text)),
        other => Err(FormatError::InvalidInputType {
            actual: ValueKind::of(other),
        }),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    // Lower-case the whole string so a final sigma sees its left context.
    let lowered = text.to_lowercase();
    let skip: usize = first.to_lowercase().map(char::len_utf8).sum();
    let mut out = titlecase(first);
    out.push_str(&lowered[skip..]);
    out
}

fn title(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_cased = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if !previous_cased {
            out.push_str(&titlecase(c));
        } else if c == 'Σ' && !chars.peek().is_some_and(|&next| is_cased(next)) {
            out.push('ς');
        } else {
            out.extend(c.to_lowercase());
        }
        previous_cased = is_cased(c);
    }
    out
}

/// Unicode titlecase mapping of `c`.
///
/// Differs from upper-casing for the Latin digraphs (`ǆ` becomes `ǅ`) and
/// Greek letters with iota subscript. Other multi-character upper-case
/// expansions keep only their first character upper-cased (`ß` becomes `Ss`).
fn titlecase(c: char) -> String {
    let mapped = match u32::from(c) {
        0x01C4..=0x01C6 => Some(0x01C5),
        0x01C7..=0x01C9 => Some(0x01C8),
        0x01CA..=0x01CC => Some(0x01CB),
        0x01F1..=0x01F3 => Some(0x01F2),
        cp @ (0x1F80..=0x1F87 | 0x1F90..=0x1F97 | 0x1FA0..=0x1FA7) => Some(cp + 8),
        0x1FB3 => Some(0x1FBC),
        0x1FC3 => Some(0x1FCC),
        0x1FF3 => Some(0x1FFC),
        _ if is_titlecase_letter(c) => Some(u32::from(c)),
        _ => None,
    };
    if let Some(title) = mapped.and_then(char::from_u32) {
        return title.to_string();
    }
    let mut upper = c.to_uppercase();
    match upper.next() {
        Some(head) => std::iter::once(head)
            .chain(upper.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// General category Lt.
fn is_titlecase_letter(c: char) -> bool {
    matches!(
        u32::from(c),
        0x01C5 | 0x01C8 | 0x01CB | 0x01F2
            | 0x1F88..=0x1F8F
            | 0x1F98..=0x1F9F
            | 0x1FA8..=0x1FAF
            | 0x1FBC
            | 0x1FCC
            | 0x1FFC
    )
}

fn is_cased(c: char) -> bool {
    c.is_uppercase() || c.is_lowercase() || is_titlecase_letter(c)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn upper_is_idempotent(s in "[a-zA-Zà-þÀ-Þß0-9 .,!?-]{0,40}") {
            let once = FormatCase::Upper.apply(&s);
            prop_assert_eq!(FormatCase::Upper.apply(&once), once);
        }

        #[test]
        fn lower_is_idempotent(s in "[a-zA-Zà-þÀ-Þß0-9 .,!?-]{0,40}") {
            let once = FormatCase::Lower.apply(&s);
            prop_assert_eq!(FormatCase::Lower.apply(&once), once);
        }

        #[test]
        fn ascii_title_and_capitalize_are_idempotent(s in "[a-zA-Z0-9 _'-]{0,40}") {
            for case in [FormatCase::Capitalize, FormatCase::Title] {
                let once = case.apply(&s);
                prop_assert_eq!(case.apply(&once), once);
            }
        }

        #[test]
        fn case_transforms_preserve_ascii_length(s in "[a-zA-Z0-9 ]{0,40}") {
            for case in FormatCase::all() {
                prop_assert_eq!(case.apply(&s).len(), s.len());
            }
        }
    }
}
