//! Value kinds: the logical targets a conversion rule produces.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Numeric widths understood by the numeric literal grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NumericKind {
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// Decimal values are carried as `f64`.
    Decimal,
}

impl NumericKind {
    pub const ALL: [NumericKind; 9] = [
        NumericKind::I16,
        NumericKind::U16,
        NumericKind::I32,
        NumericKind::U32,
        NumericKind::I64,
        NumericKind::U64,
        NumericKind::F32,
        NumericKind::F64,
        NumericKind::Decimal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericKind::I16 => "i16",
            NumericKind::U16 => "u16",
            NumericKind::I32 => "i32",
            NumericKind::U32 => "u32",
            NumericKind::I64 => "i64",
            NumericKind::U64 => "u64",
            NumericKind::F32 => "f32",
            NumericKind::F64 => "f64",
            NumericKind::Decimal => "decimal",
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, NumericKind::F32 | NumericKind::F64 | NumericKind::Decimal)
    }
}

/// The logical type a raw string is converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    String,
    Char,
    Bool,
    Numeric(NumericKind),
    StringArray,
    NumericArray(NumericKind),
    /// A single `position:value` pair.
    BitPair,
    /// A delimited list of `position:value` pairs.
    BitPairs,
    /// Up to eight bit pairs packed into one byte, bit 0 least significant.
    PackedByte,
}

impl ValueKind {
    /// Every kind a default registry knows how to produce.
    pub fn all() -> Vec<ValueKind> {
        let mut kinds = vec![ValueKind::String, ValueKind::Char, ValueKind::Bool];
        kinds.extend(NumericKind::ALL.iter().map(|k| ValueKind::Numeric(*k)));
        kinds.push(ValueKind::StringArray);
        kinds.extend(NumericKind::ALL.iter().map(|k| ValueKind::NumericArray(*k)));
        kinds.extend([ValueKind::BitPair, ValueKind::BitPairs, ValueKind::PackedByte]);
        kinds
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::String => f.write_str("string"),
            ValueKind::Char => f.write_str("char"),
            ValueKind::Bool => f.write_str("bool"),
            ValueKind::Numeric(kind) => f.write_str(kind.name()),
            ValueKind::StringArray => f.write_str("string-array"),
            ValueKind::NumericArray(kind) => write!(f, "{}-array", kind.name()),
            ValueKind::BitPair => f.write_str("bit-pair"),
            ValueKind::BitPairs => f.write_str("bit-pairs"),
            ValueKind::PackedByte => f.write_str("packed-byte"),
        }
    }
}

impl Serialize for ValueKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown value kind '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for ValueKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let numeric = |name: &str| NumericKind::ALL.into_iter().find(|k| k.name() == name);

        let kind = match name.as_str() {
            "string" | "str" => ValueKind::String,
            "char" => ValueKind::Char,
            "bool" | "boolean" => ValueKind::Bool,
            "string-array" => ValueKind::StringArray,
            "bit-pair" => ValueKind::BitPair,
            "bit-pairs" => ValueKind::BitPairs,
            "packed-byte" | "byte" => ValueKind::PackedByte,
            other => match other.strip_suffix("-array") {
                Some(element) => numeric(element).map(ValueKind::NumericArray),
                None => numeric(other).map(ValueKind::Numeric),
            }
            .ok_or_else(|| UnknownKind(s.to_string()))?,
        };
        Ok(kind)
    }
}
