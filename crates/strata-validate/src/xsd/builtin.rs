//! Built-in XSD simple types.

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// The XML Schema built-in types this validator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    AnyType,
    AnySimpleType,
    String,
    NormalizedString,
    Token,
    Language,
    Name,
    NcName,
    Id,
    IdRef,
    NmToken,
    AnyUri,
    Boolean,
    Decimal,
    Integer,
    Long,
    Int,
    Short,
    Byte,
    NonNegativeInteger,
    PositiveInteger,
    NonPositiveInteger,
    NegativeInteger,
    UnsignedLong,
    UnsignedInt,
    UnsignedShort,
    UnsignedByte,
    Float,
    Double,
    Date,
    DateTime,
    Time,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        let builtin = match name {
            "anyType" => Self::AnyType,
            "anySimpleType" => Self::AnySimpleType,
            "string" => Self::String,
            "normalizedString" => Self::NormalizedString,
            "token" => Self::Token,
            "language" => Self::Language,
            "Name" => Self::Name,
            "NCName" => Self::NcName,
            "ID" => Self::Id,
            "IDREF" => Self::IdRef,
            "NMTOKEN" => Self::NmToken,
            "anyURI" => Self::AnyUri,
            "boolean" => Self::Boolean,
            "decimal" => Self::Decimal,
            "integer" => Self::Integer,
            "long" => Self::Long,
            "int" => Self::Int,
            "short" => Self::Short,
            "byte" => Self::Byte,
            "nonNegativeInteger" => Self::NonNegativeInteger,
            "positiveInteger" => Self::PositiveInteger,
            "nonPositiveInteger" => Self::NonPositiveInteger,
            "negativeInteger" => Self::NegativeInteger,
            "unsignedLong" => Self::UnsignedLong,
            "unsignedInt" => Self::UnsignedInt,
            "unsignedShort" => Self::UnsignedShort,
            "unsignedByte" => Self::UnsignedByte,
            "float" => Self::Float,
            "double" => Self::Double,
            "date" => Self::Date,
            "dateTime" => Self::DateTime,
            "time" => Self::Time,
            _ => return None,
        };
        Some(builtin)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AnyType => "anyType",
            Self::AnySimpleType => "anySimpleType",
            Self::String => "string",
            Self::NormalizedString => "normalizedString",
            Self::Token => "token",
            Self::Language => "language",
            Self::Name => "Name",
            Self::NcName => "NCName",
            Self::Id => "ID",
            Self::IdRef => "IDREF",
            Self::NmToken => "NMTOKEN",
            Self::AnyUri => "anyURI",
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Int => "int",
            Self::Short => "short",
            Self::Byte => "byte",
            Self::NonNegativeInteger => "nonNegativeInteger",
            Self::PositiveInteger => "positiveInteger",
            Self::NonPositiveInteger => "nonPositiveInteger",
            Self::NegativeInteger => "negativeInteger",
            Self::UnsignedLong => "unsignedLong",
            Self::UnsignedInt => "unsignedInt",
            Self::UnsignedShort => "unsignedShort",
            Self::UnsignedByte => "unsignedByte",
            Self::Float => "float",
            Self::Double => "double",
            Self::Date => "date",
            Self::DateTime => "dateTime",
            Self::Time => "time",
        }
    }

    /// Whether bound facets compare values of this type numerically.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Decimal
                | Self::Integer
                | Self::Long
                | Self::Int
                | Self::Short
                | Self::Byte
                | Self::NonNegativeInteger
                | Self::PositiveInteger
                | Self::NonPositiveInteger
                | Self::NegativeInteger
                | Self::UnsignedLong
                | Self::UnsignedInt
                | Self::UnsignedShort
                | Self::UnsignedByte
                | Self::Float
                | Self::Double
        )
    }

    /// Apply the type's whitespace facet: `string` preserves, the
    /// `normalizedString` family replaces, everything else collapses.
    pub fn normalize<'v>(&self, raw: &'v str) -> Cow<'v, str> {
        match self {
            Self::String | Self::AnyType | Self::AnySimpleType => Cow::Borrowed(raw),
            Self::NormalizedString => {
                if raw.contains(['\t', '\n', '\r']) {
                    Cow::Owned(raw.replace(['\t', '\n', '\r'], " "))
                } else {
                    Cow::Borrowed(raw)
                }
            }
            _ => {
                let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
                if collapsed == raw {
                    Cow::Borrowed(raw)
                } else {
                    Cow::Owned(collapsed)
                }
            }
        }
    }

    /// Whether an already-normalized value is in the type's lexical space.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::AnyType
            | Self::AnySimpleType
            | Self::String
            | Self::NormalizedString
            | Self::Token
            | Self::AnyUri => true,
            Self::Language => is_language(value),
            Self::Name => is_name(value, true),
            Self::NcName | Self::Id | Self::IdRef => is_name(value, false),
            Self::NmToken => !value.is_empty() && value.chars().all(is_name_char),
            Self::Boolean => matches!(value, "true" | "false" | "1" | "0"),
            Self::Decimal => is_decimal(value),
            Self::Integer => is_integer(value),
            Self::NonNegativeInteger => is_integer(value) && (!is_negative(value) || is_zero(value)),
            Self::PositiveInteger => is_integer(value) && !is_negative(value) && !is_zero(value),
            Self::NonPositiveInteger => is_integer(value) && (is_negative(value) || is_zero(value)),
            Self::NegativeInteger => is_integer(value) && is_negative(value) && !is_zero(value),
            Self::Long => in_range(value, i64::MIN.into(), i64::MAX.into()),
            Self::Int => in_range(value, i32::MIN.into(), i32::MAX.into()),
            Self::Short => in_range(value, i16::MIN.into(), i16::MAX.into()),
            Self::Byte => in_range(value, i8::MIN.into(), i8::MAX.into()),
            Self::UnsignedLong => in_range(value, 0, u64::MAX.into()),
            Self::UnsignedInt => in_range(value, 0, u32::MAX.into()),
            Self::UnsignedShort => in_range(value, 0, u16::MAX.into()),
            Self::UnsignedByte => in_range(value, 0, u8::MAX.into()),
            Self::Float | Self::Double => is_floating(value),
            Self::Date => strip_timezone(value)
                .is_some_and(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").is_ok()),
            Self::DateTime => strip_timezone(value)
                .is_some_and(|v| NaiveDateTime::parse_from_str(v, "%Y-%m-%dT%H:%M:%S%.f").is_ok()),
            Self::Time => strip_timezone(value)
                .is_some_and(|v| NaiveTime::parse_from_str(v, "%H:%M:%S%.f").is_ok()),
        }
    }
}

impl std::fmt::Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "xs:{}", self.name())
    }
}

fn digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn unsigned_part(value: &str) -> &str {
    value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value)
}

fn is_integer(value: &str) -> bool {
    digits(unsigned_part(value))
}

fn is_negative(value: &str) -> bool {
    value.starts_with('-')
}

fn is_zero(value: &str) -> bool {
    unsigned_part(value).bytes().all(|b| b == b'0')
}

fn in_range(value: &str, min: i128, max: i128) -> bool {
    is_integer(value)
        && value
            .parse::<i128>()
            .is_ok_and(|n| (min..=max).contains(&n))
}

fn is_decimal(value: &str) -> bool {
    let body = unsigned_part(value);
    match body.split_once('.') {
        None => digits(body),
        Some((int, frac)) => {
            (int.is_empty() || digits(int))
                && (frac.is_empty() || digits(frac))
                && !(int.is_empty() && frac.is_empty())
        }
    }
}

fn is_floating(value: &str) -> bool {
    if matches!(value, "INF" | "+INF" | "-INF" | "NaN") {
        return true;
    }
    // Rust also parses "inf"/"infinity"; the XSD lexical space does not.
    value
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
        && value.parse::<f64>().is_ok()
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '\u{B7}')
}

fn is_name(value: &str, allow_colon: bool) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let first_ok = first.is_alphabetic() || first == '_' || (allow_colon && first == ':');
    first_ok && chars.all(|c| is_name_char(c) && (allow_colon || c != ':'))
}

fn is_language(value: &str) -> bool {
    let mut parts = value.split('-');
    let primary_ok = parts
        .next()
        .is_some_and(|p| (1..=8).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_alphabetic()));
    primary_ok && parts.all(|p| (1..=8).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_alphanumeric()))
}

/// Drop a trailing `Z` or `±hh:mm` timezone, checking its shape.
fn strip_timezone(value: &str) -> Option<&str> {
    if let Some(rest) = value.strip_suffix('Z') {
        return Some(rest);
    }
    let bytes = value.as_bytes();
    let n = bytes.len();
    if n >= 6 && matches!(bytes[n - 6], b'+' | b'-') && bytes[n - 3] == b':' {
        let (hh, mm) = (&value[n - 5..n - 3], &value[n - 2..]);
        let valid = digits(hh)
            && digits(mm)
            && hh.parse::<u32>().is_ok_and(|h| h <= 14)
            && mm.parse::<u32>().is_ok_and(|m| m < 60);
        return valid.then(|| &value[..n - 6]);
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for name in ["string", "integer", "unsignedByte", "dateTime", "NCName", "anyURI"] {
            assert_eq!(Builtin::from_name(name).unwrap().name(), name);
        }
        assert!(Builtin::from_name("gYear").is_none());
    }

    #[test]
    fn test_integer_family() {
        assert!(Builtin::Integer.accepts("-123456789012345678901234567890"));
        assert!(Builtin::Integer.accepts("+7"));
        assert!(!Builtin::Integer.accepts("7.0"));
        assert!(Builtin::Byte.accepts("-128"));
        assert!(!Builtin::Byte.accepts("128"));
        assert!(Builtin::UnsignedByte.accepts("255"));
        assert!(!Builtin::UnsignedByte.accepts("-1"));
        assert!(Builtin::PositiveInteger.accepts("1"));
        assert!(!Builtin::PositiveInteger.accepts("0"));
        assert!(Builtin::NonNegativeInteger.accepts("-0"));
        assert!(Builtin::NegativeInteger.accepts("-5"));
        assert!(!Builtin::NegativeInteger.accepts("-0"));
    }

    #[test]
    fn test_decimal_and_floating() {
        assert!(Builtin::Decimal.accepts("3.14"));
        assert!(Builtin::Decimal.accepts(".5"));
        assert!(Builtin::Decimal.accepts("-2."));
        assert!(!Builtin::Decimal.accepts("."));
        assert!(!Builtin::Decimal.accepts("1e3"));
        assert!(Builtin::Double.accepts("1e3"));
        assert!(Builtin::Float.accepts("INF"));
        assert!(!Builtin::Float.accepts("inf"));
    }

    #[test]
    fn test_boolean() {
        for ok in ["true", "false", "1", "0"] {
            assert!(Builtin::Boolean.accepts(ok));
        }
        assert!(!Builtin::Boolean.accepts("yes"));
    }

    #[test]
    fn test_temporal_types() {
        assert!(Builtin::Date.accepts("2024-09-27"));
        assert!(Builtin::Date.accepts("2024-09-27Z"));
        assert!(Builtin::Date.accepts("2024-09-27+05:30"));
        assert!(!Builtin::Date.accepts("2024-02-30"));
        assert!(Builtin::DateTime.accepts("2024-09-27T10:15:00"));
        assert!(Builtin::DateTime.accepts("2024-09-27T10:15:00.250-04:00"));
        assert!(!Builtin::DateTime.accepts("2024-09-27 10:15:00"));
        assert!(Builtin::Time.accepts("23:59:59"));
        assert!(!Builtin::Time.accepts("24:01:00"));
    }

    #[test]
    fn test_names() {
        assert!(Builtin::NcName.accepts("item_1"));
        assert!(!Builtin::NcName.accepts("xs:item"));
        assert!(Builtin::Name.accepts("xs:item"));
        assert!(!Builtin::Name.accepts("1item"));
        assert!(Builtin::NmToken.accepts("1item"));
        assert!(Builtin::Language.accepts("en-GB"));
        assert!(!Builtin::Language.accepts("en_GB"));
        assert!(!Builtin::Language.accepts("abcdefghi"));
    }

    #[test]
    fn test_whitespace_normalization() {
        assert_eq!(Builtin::String.normalize(" a\tb "), " a\tb ");
        assert_eq!(Builtin::NormalizedString.normalize("a\tb\n"), "a b ");
        assert_eq!(Builtin::Token.normalize("  a \n b  "), "a b");
        assert_eq!(Builtin::Integer.normalize("\n  42\n"), "42");
    }
}
