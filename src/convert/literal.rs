//! Literal grammars for the built-in conversion rules.
//!
//! These are wire formats shared with existing settings stores: the boolean
//! literal table, the four-form numeric grammar and the `pos:value` bit pairs
//! must stay byte-for-byte compatible.

use super::kind::{NumericKind, ValueKind};
use super::value::{BitPair, Number};
use crate::error::ConversionError;
use fancy_regex::Regex;
use once_cell::sync::Lazy;

/// Hex, binary, octal, then decimal. A leading `0` is only decimal when a
/// fractional part follows it (`0.5`, `00.25`); otherwise it is octal.
static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        "^(?:",
        r"0x[0-9a-fA-F]+",
        "|",
        r"0b[01]+",
        "|",
        r"0[0-7]*",
        "|",
        r"(?:(?!0)|[-+]|(?=0+\.))(?:[0-9]*\.)?[0-9]+(?:e[0-9]+)?",
        ")$"
    ))
    .expect("valid numeric literal regex")
});

static OCTAL_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0[0-7]*$").expect("valid octal literal regex"));

/// Parse a boolean from the case-insensitive literal table.
pub fn parse_bool(raw: &str) -> Result<bool, ConversionError> {
    if raw.is_empty() {
        return Err(ConversionError::Empty { kind: ValueKind::Bool });
    }
    match raw.to_ascii_uppercase().as_str() {
        "TRUE" | "1" | "YES" | "Y" | "P" => Ok(true),
        "FALSE" | "0" | "NO" | "N" | "F" => Ok(false),
        _ => Err(ConversionError::InvalidLiteral {
            kind: ValueKind::Bool,
            value: raw.to_string(),
        }),
    }
}

/// Returns true if `raw` matches one of the four numeric lexical forms.
pub fn is_numeric_literal(raw: &str) -> bool {
    NUMERIC_LITERAL.is_match(raw).unwrap_or(false)
}

/// Parse a numeric literal into the requested width.
pub fn parse_number(raw: &str, kind: NumericKind) -> Result<Number, ConversionError> {
    let value_kind = ValueKind::Numeric(kind);
    let invalid = || ConversionError::InvalidLiteral { kind: value_kind, value: raw.to_string() };
    let overflow = || ConversionError::Overflow { kind: value_kind, value: raw.to_string() };

    if raw.is_empty() {
        return Err(ConversionError::Empty { kind: value_kind });
    }
    if !is_numeric_literal(raw) {
        return Err(invalid());
    }

    let radix_digits = if let Some(hex) = raw.strip_prefix("0x") {
        Some((hex, 16))
    } else if let Some(bin) = raw.strip_prefix("0b") {
        Some((bin, 2))
    } else if OCTAL_LITERAL.is_match(raw).unwrap_or(false) {
        Some((&raw[1..], 8))
    } else {
        None
    };

    if let Some((digits, radix)) = radix_digits {
        if digits.is_empty() {
            return Number::from_integer(0, kind);
        }
        let value = i128::from_str_radix(digits, radix).map_err(|_| overflow())?;
        return Number::from_integer(value, kind);
    }

    if kind.is_integer() {
        if raw.contains(['.', 'e']) {
            return Err(invalid());
        }
        // The grammar already guarantees an optional sign followed by digits.
        let value: i128 = raw.parse().map_err(|_| overflow())?;
        Number::from_integer(value, kind)
    } else {
        let value: f64 = raw.parse().map_err(|_| invalid())?;
        Number::from_float(value, kind).map_err(|_| overflow())
    }
}

/// Split on `delimiter`; an input without the delimiter is a single element.
pub fn split_delimited(raw: &str, delimiter: char) -> Vec<&str> {
    raw.split(delimiter).collect()
}

/// Parse a single `position<delimiter>value` pair.
pub fn parse_bit_pair(raw: &str, value_delimiter: char) -> Result<BitPair, ConversionError> {
    let tokens = split_delimited(raw, value_delimiter);
    let [position, value] = tokens.as_slice() else {
        return Err(ConversionError::InvalidBitPair { value: raw.to_string() });
    };

    let position = match parse_number(position, NumericKind::U32)? {
        Number::U32(p) => p,
        other => {
            return Err(ConversionError::Mismatch {
                expected: ValueKind::Numeric(NumericKind::U32),
                found: ValueKind::Numeric(other.kind()),
            })
        }
    };
    Ok(BitPair::new(position, parse_bool(value)?))
}

/// Parse a delimited list of bit pairs.
pub fn parse_bit_pairs(
    raw: &str,
    pair_delimiter: char,
    value_delimiter: char,
) -> Result<Vec<BitPair>, ConversionError> {
    split_delimited(raw, pair_delimiter)
        .into_iter()
        .map(|pair| parse_bit_pair(pair, value_delimiter))
        .collect()
}

/// Assemble bit pairs into a byte, bit 0 least significant.
///
/// Positions not mentioned stay clear; a later pair for the same position
/// overrides an earlier one.
pub fn pack_bits(pairs: &[BitPair]) -> Result<u8, ConversionError> {
    if pairs.is_empty() || pairs.len() > 8 {
        return Err(ConversionError::BitCount { count: pairs.len() });
    }

    let mut byte = 0u8;
    for pair in pairs {
        if pair.position > 7 {
            return Err(ConversionError::BitPosition { position: pair.position });
        }
        let mask = 1u8 << pair.position;
        if pair.value {
            byte |= mask;
        } else {
            byte &= !mask;
        }
    }
    Ok(byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(raw: &str, kind: NumericKind) -> Number {
        parse_number(raw, kind).expect("numeric literal")
    }

    #[test]
    fn bool_literal_table() {
        for raw in ["true", "TRUE", "1", "yes", "Y", "p"] {
            assert_eq!(parse_bool(raw), Ok(true), "{raw}");
        }
        for raw in ["false", "0", "no", "N", "f"] {
            assert_eq!(parse_bool(raw), Ok(false), "{raw}");
        }
        assert_eq!(parse_bool(""), Err(ConversionError::Empty { kind: ValueKind::Bool }));
        assert!(matches!(parse_bool("maybe"), Err(ConversionError::InvalidLiteral { .. })));
        assert!(matches!(parse_bool("on"), Err(ConversionError::InvalidLiteral { .. })));
    }

    #[test]
    fn numeric_bases() {
        assert_eq!(number("0x1F", NumericKind::I32), Number::I32(31));
        assert_eq!(number("0x1f", NumericKind::U64), Number::U64(31));
        assert_eq!(number("0b101", NumericKind::I32), Number::I32(5));
        assert_eq!(number("017", NumericKind::I32), Number::I32(15));
        assert_eq!(number("0", NumericKind::U16), Number::U16(0));
        assert_eq!(number("-42", NumericKind::I64), Number::I64(-42));
        assert_eq!(number("+7", NumericKind::U32), Number::U32(7));
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn numeric_floats() {
        assert_eq!(number("3.14", NumericKind::F64), Number::F64(3.14));
        assert_eq!(number("0.5", NumericKind::F32), Number::F32(0.5));
        assert_eq!(number(".25", NumericKind::Decimal), Number::Decimal(0.25));
        assert_eq!(number("1e3", NumericKind::F64), Number::F64(1000.0));
        assert_eq!(number("0x10", NumericKind::F64), Number::F64(16.0));
    }

    #[test]
    fn numeric_grammar_rejections() {
        for raw in ["abc", "0x", "0b2", "08", "1.", "1E3", "0e5", "--1", " 1", "1_000"] {
            assert!(!is_numeric_literal(raw), "{raw} should be rejected");
        }
        assert!(matches!(
            parse_number("abc", NumericKind::I32),
            Err(ConversionError::InvalidLiteral { .. })
        ));
        assert!(matches!(
            parse_number("", NumericKind::I32),
            Err(ConversionError::Empty { .. })
        ));
    }

    #[test]
    fn integer_kinds_reject_fractions() {
        assert!(matches!(
            parse_number("3.14", NumericKind::I32),
            Err(ConversionError::InvalidLiteral { .. })
        ));
        assert!(matches!(
            parse_number("2e2", NumericKind::I64),
            Err(ConversionError::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn width_overflow_fails() {
        assert!(matches!(
            parse_number("40000", NumericKind::I16),
            Err(ConversionError::Overflow { .. })
        ));
        assert!(matches!(
            parse_number("-1", NumericKind::U32),
            Err(ConversionError::Overflow { .. })
        ));
        assert!(matches!(
            parse_number("0x10000", NumericKind::U16),
            Err(ConversionError::Overflow { .. })
        ));
        assert!(matches!(
            parse_number("1e39", NumericKind::F32),
            Err(ConversionError::Overflow { .. })
        ));
        assert_eq!(number("32767", NumericKind::I16), Number::I16(i16::MAX));
    }

    #[test]
    fn bit_pair_requires_two_tokens() {
        assert_eq!(parse_bit_pair("3:y", ':'), Ok(BitPair::new(3, true)));
        assert!(matches!(
            parse_bit_pair("3", ':'),
            Err(ConversionError::InvalidBitPair { .. })
        ));
        assert!(matches!(
            parse_bit_pair("3:1:0", ':'),
            Err(ConversionError::InvalidBitPair { .. })
        ));
        assert!(matches!(parse_bit_pair("x:1", ':'), Err(ConversionError::InvalidLiteral { .. })));
    }

    #[test]
    fn pack_bits_sets_requested_positions() {
        let pairs = parse_bit_pairs("0:true;7:true", ';', ':').expect("pairs");
        assert_eq!(pack_bits(&pairs), Ok(0b1000_0001));

        let pairs = parse_bit_pairs("1:y;1:n;2:p", ';', ':').expect("pairs");
        assert_eq!(pack_bits(&pairs), Ok(0b0000_0100));
    }

    #[test]
    fn pack_bits_bounds() {
        assert_eq!(pack_bits(&[]), Err(ConversionError::BitCount { count: 0 }));

        let eight: Vec<BitPair> = (0..8).map(|p| BitPair::new(p, true)).collect();
        assert_eq!(pack_bits(&eight), Ok(0xFF));

        let nine: Vec<BitPair> = (0..9).map(|p| BitPair::new(p % 8, true)).collect();
        assert_eq!(pack_bits(&nine), Err(ConversionError::BitCount { count: 9 }));

        assert_eq!(
            pack_bits(&[BitPair::new(8, true)]),
            Err(ConversionError::BitPosition { position: 8 })
        );
    }
}
