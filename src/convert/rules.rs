//! Built-in conversion rules.

use super::kind::{NumericKind, ValueKind};
use super::literal::{
    pack_bits, parse_bit_pair, parse_bit_pairs, parse_bool, parse_number, split_delimited,
};
use super::value::Value;
use crate::error::ConversionError;

/// A pure `raw string -> Value` conversion registered under a [`ValueKind`].
pub trait ConversionRule: Send + Sync {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError>;
}

impl<F> ConversionRule for F
where
    F: Fn(&str) -> Result<Value, ConversionError> + Send + Sync,
{
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        self(raw)
    }
}

/// Delimiters used by the array and bit-pair rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    /// Separates array elements.
    pub array: char,
    /// Separates `position:value` pairs from each other.
    pub pair: char,
    /// Separates a position from its value.
    pub value: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self { array: ';', pair: ';', value: ':' }
    }
}

pub struct StringRule;

impl ConversionRule for StringRule {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        Ok(Value::String(raw.to_string()))
    }
}

/// Takes the first character of the input.
pub struct CharRule;

impl ConversionRule for CharRule {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        raw.chars()
            .next()
            .map(Value::Char)
            .ok_or(ConversionError::Empty { kind: ValueKind::Char })
    }
}

pub struct BoolRule;

impl ConversionRule for BoolRule {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        parse_bool(raw).map(Value::Bool)
    }
}

pub struct NumericRule(pub NumericKind);

impl ConversionRule for NumericRule {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        parse_number(raw, self.0).map(Value::Number)
    }
}

pub struct StringArrayRule {
    pub delimiter: char,
}

impl ConversionRule for StringArrayRule {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        let items = split_delimited(raw, self.delimiter).into_iter().map(str::to_string).collect();
        Ok(Value::StringArray(items))
    }
}

pub struct NumericArrayRule {
    pub kind: NumericKind,
    pub delimiter: char,
}

impl ConversionRule for NumericArrayRule {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        let items = split_delimited(raw, self.delimiter)
            .into_iter()
            .map(|item| parse_number(item, self.kind))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::NumberArray(self.kind, items))
    }
}

pub struct BitPairRule {
    pub value_delimiter: char,
}

impl ConversionRule for BitPairRule {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        parse_bit_pair(raw, self.value_delimiter).map(Value::BitPair)
    }
}

pub struct BitPairsRule {
    pub pair_delimiter: char,
    pub value_delimiter: char,
}

impl ConversionRule for BitPairsRule {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        parse_bit_pairs(raw, self.pair_delimiter, self.value_delimiter).map(Value::BitPairs)
    }
}

/// Packs `0:1;3:y;7:no` style input into a single byte.
pub struct PackedByteRule {
    pub pair_delimiter: char,
    pub value_delimiter: char,
}

impl ConversionRule for PackedByteRule {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        if raw.is_empty() {
            return Err(ConversionError::BitCount { count: 0 });
        }
        let pairs = parse_bit_pairs(raw, self.pair_delimiter, self.value_delimiter)?;
        pack_bits(&pairs).map(Value::Byte)
    }
}
