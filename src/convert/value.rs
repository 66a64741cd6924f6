//! Dynamic typed values produced by conversions and stored in table cells.

use super::kind::{NumericKind, ValueKind};
use crate::error::ConversionError;
use serde::{Serialize, Serializer};
use std::fmt;

/// A `(position, value)` literal used to selectively set bits within a packed byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BitPair {
    pub position: u32,
    pub value: bool,
}

impl BitPair {
    pub fn new(position: u32, value: bool) -> Self {
        Self { position, value }
    }
}

impl fmt::Display for BitPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.position, self.value)
    }
}

/// A value of the `decimal` kind, carried as `f64`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Decimal(pub f64);

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(f64),
}

impl Number {
    pub fn kind(&self) -> NumericKind {
        match self {
            Number::I16(_) => NumericKind::I16,
            Number::U16(_) => NumericKind::U16,
            Number::I32(_) => NumericKind::I32,
            Number::U32(_) => NumericKind::U32,
            Number::I64(_) => NumericKind::I64,
            Number::U64(_) => NumericKind::U64,
            Number::F32(_) => NumericKind::F32,
            Number::F64(_) => NumericKind::F64,
            Number::Decimal(_) => NumericKind::Decimal,
        }
    }

    /// The zero value of `kind`.
    pub fn zero(kind: NumericKind) -> Self {
        match kind {
            NumericKind::I16 => Number::I16(0),
            NumericKind::U16 => Number::U16(0),
            NumericKind::I32 => Number::I32(0),
            NumericKind::U32 => Number::U32(0),
            NumericKind::I64 => Number::I64(0),
            NumericKind::U64 => Number::U64(0),
            NumericKind::F32 => Number::F32(0.0),
            NumericKind::F64 => Number::F64(0.0),
            NumericKind::Decimal => Number::Decimal(0.0),
        }
    }

    /// Integer payload, `None` for floating kinds.
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Number::I16(v) => Some(v.into()),
            Number::U16(v) => Some(v.into()),
            Number::I32(v) => Some(v.into()),
            Number::U32(v) => Some(v.into()),
            Number::I64(v) => Some(v.into()),
            Number::U64(v) => Some(v.into()),
            Number::F32(_) | Number::F64(_) | Number::Decimal(_) => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::F32(v) => v.into(),
            Number::F64(v) | Number::Decimal(v) => v,
            _ => self.as_integer().unwrap_or_default() as f64,
        }
    }

    /// Narrow an integer into `kind`, failing when it does not fit.
    pub fn from_integer(value: i128, kind: NumericKind) -> Result<Self, ConversionError> {
        let overflow = || ConversionError::Overflow {
            kind: ValueKind::Numeric(kind),
            value: value.to_string(),
        };
        let number = match kind {
            NumericKind::I16 => Number::I16(i16::try_from(value).map_err(|_| overflow())?),
            NumericKind::U16 => Number::U16(u16::try_from(value).map_err(|_| overflow())?),
            NumericKind::I32 => Number::I32(i32::try_from(value).map_err(|_| overflow())?),
            NumericKind::U32 => Number::U32(u32::try_from(value).map_err(|_| overflow())?),
            NumericKind::I64 => Number::I64(i64::try_from(value).map_err(|_| overflow())?),
            NumericKind::U64 => Number::U64(u64::try_from(value).map_err(|_| overflow())?),
            NumericKind::F32 | NumericKind::F64 | NumericKind::Decimal => {
                Self::from_float(value as f64, kind)?
            }
        };
        Ok(number)
    }

    /// Store a float into a floating `kind`, failing when it overflows to infinity.
    pub fn from_float(value: f64, kind: NumericKind) -> Result<Self, ConversionError> {
        let overflow = || ConversionError::Overflow {
            kind: ValueKind::Numeric(kind),
            value: value.to_string(),
        };
        if !value.is_finite() {
            return Err(overflow());
        }
        match kind {
            NumericKind::F32 => {
                let narrowed = value as f32;
                if narrowed.is_finite() {
                    Ok(Number::F32(narrowed))
                } else {
                    Err(overflow())
                }
            }
            NumericKind::F64 => Ok(Number::F64(value)),
            NumericKind::Decimal => Ok(Number::Decimal(value)),
            _ => Err(ConversionError::Mismatch {
                expected: ValueKind::Numeric(kind),
                found: ValueKind::Numeric(NumericKind::F64),
            }),
        }
    }

    /// Coerce into another numeric kind: integers narrow or widen when the value
    /// fits, any number widens into a floating kind.
    pub fn coerce(self, kind: NumericKind) -> Result<Self, ConversionError> {
        if self.kind() == kind {
            return Ok(self);
        }
        match self.as_integer() {
            Some(value) => Self::from_integer(value, kind),
            None if !kind.is_integer() => Self::from_float(self.as_f64(), kind),
            None => Err(ConversionError::Mismatch {
                expected: ValueKind::Numeric(kind),
                found: ValueKind::Numeric(self.kind()),
            }),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I16(v) => write!(f, "{v}"),
            Number::U16(v) => write!(f, "{v}"),
            Number::I32(v) => write!(f, "{v}"),
            Number::U32(v) => write!(f, "{v}"),
            Number::I64(v) => write!(f, "{v}"),
            Number::U64(v) => write!(f, "{v}"),
            Number::F32(v) => write!(f, "{v}"),
            Number::F64(v) | Number::Decimal(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Char(char),
    Bool(bool),
    Number(Number),
    StringArray(Vec<String>),
    NumberArray(NumericKind, Vec<Number>),
    BitPair(BitPair),
    BitPairs(Vec<BitPair>),
    Byte(u8),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Char(_) => ValueKind::Char,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(n) => ValueKind::Numeric(n.kind()),
            Value::StringArray(_) => ValueKind::StringArray,
            Value::NumberArray(kind, _) => ValueKind::NumericArray(*kind),
            Value::BitPair(_) => ValueKind::BitPair,
            Value::BitPairs(_) => ValueKind::BitPairs,
            Value::Byte(_) => ValueKind::PackedByte,
        }
    }

    /// The zero value written for `kind` when no source value exists.
    pub fn zero(kind: ValueKind) -> Self {
        match kind {
            ValueKind::String => Value::String(String::new()),
            ValueKind::Char => Value::Char('\0'),
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Numeric(n) => Value::Number(Number::zero(n)),
            ValueKind::StringArray => Value::StringArray(Vec::new()),
            ValueKind::NumericArray(n) => Value::NumberArray(n, Vec::new()),
            ValueKind::BitPair => Value::BitPair(BitPair::new(0, false)),
            ValueKind::BitPairs => Value::BitPairs(Vec::new()),
            ValueKind::PackedByte => Value::Byte(0),
        }
    }

    fn mismatch(&self, expected: ValueKind) -> ConversionError {
        ConversionError::Mismatch { expected, found: self.kind() }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Char(c) => serializer.serialize_char(*c),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::StringArray(items) => items.serialize(serializer),
            Value::NumberArray(_, items) => items.serialize(serializer),
            Value::BitPair(pair) => pair.serialize(serializer),
            Value::BitPairs(pairs) => pairs.serialize(serializer),
            Value::Byte(b) => serializer.serialize_u8(*b),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: fmt::Display>(items: &[T]) -> String {
            items.iter().map(ToString::to_string).collect::<Vec<_>>().join(";")
        }

        match self {
            Value::String(s) => f.write_str(s),
            Value::Char(c) => write!(f, "{c}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::StringArray(items) => f.write_str(&items.join(";")),
            Value::NumberArray(_, items) => f.write_str(&join(items)),
            Value::BitPair(pair) => write!(f, "{pair}"),
            Value::BitPairs(pairs) => f.write_str(&join(pairs)),
            Value::Byte(b) => write!(f, "{b}"),
        }
    }
}

/// Extraction of a concrete Rust type from a [`Value`].
pub trait FromValue: Sized {
    /// The kind a resolver converts raw strings into for this type.
    const KIND: ValueKind;

    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Byte(value)
    }
}

impl From<BitPair> for Value {
    fn from(value: BitPair) -> Self {
        Value::BitPair(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::StringArray(value)
    }
}

impl From<Vec<BitPair>> for Value {
    fn from(value: Vec<BitPair>) -> Self {
        Value::BitPairs(value)
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl FromValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(other.mismatch(Self::KIND)),
        }
    }
}

impl FromValue for char {
    const KIND: ValueKind = ValueKind::Char;

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Char(c) => Ok(c),
            other => Err(other.mismatch(Self::KIND)),
        }
    }
}

impl FromValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(other.mismatch(Self::KIND)),
        }
    }
}

impl FromValue for u8 {
    const KIND: ValueKind = ValueKind::PackedByte;

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Byte(b) => Ok(b),
            other => Err(other.mismatch(Self::KIND)),
        }
    }
}

impl FromValue for BitPair {
    const KIND: ValueKind = ValueKind::BitPair;

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::BitPair(pair) => Ok(pair),
            other => Err(other.mismatch(Self::KIND)),
        }
    }
}

impl FromValue for Vec<String> {
    const KIND: ValueKind = ValueKind::StringArray;

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::StringArray(items) => Ok(items),
            other => Err(other.mismatch(Self::KIND)),
        }
    }
}

impl FromValue for Vec<BitPair> {
    const KIND: ValueKind = ValueKind::BitPairs;

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::BitPairs(pairs) => Ok(pairs),
            other => Err(other.mismatch(Self::KIND)),
        }
    }
}

macro_rules! numeric_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::Number(Number::$variant(value))
            }
        }

        impl From<Vec<$ty>> for Value {
            fn from(values: Vec<$ty>) -> Self {
                Value::NumberArray(
                    NumericKind::$variant,
                    values.into_iter().map(Number::$variant).collect(),
                )
            }
        }

        impl FromValue for $ty {
            const KIND: ValueKind = ValueKind::Numeric(NumericKind::$variant);

            fn from_value(value: Value) -> Result<Self, ConversionError> {
                match value {
                    Value::Number(n) => match n.coerce(NumericKind::$variant)? {
                        Number::$variant(v) => Ok(v),
                        other => Err(ConversionError::Mismatch {
                            expected: Self::KIND,
                            found: ValueKind::Numeric(other.kind()),
                        }),
                    },
                    other => Err(other.mismatch(Self::KIND)),
                }
            }
        }

        impl FromValue for Vec<$ty> {
            const KIND: ValueKind = ValueKind::NumericArray(NumericKind::$variant);

            fn from_value(value: Value) -> Result<Self, ConversionError> {
                match value {
                    Value::NumberArray(_, items) => items
                        .into_iter()
                        .map(|n| <$ty>::from_value(Value::Number(n)))
                        .collect(),
                    other => Err(other.mismatch(Self::KIND)),
                }
            }
        }
    )*};
}

numeric_value! {
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Number(Number::Decimal(value.0))
    }
}

impl From<Vec<Decimal>> for Value {
    fn from(values: Vec<Decimal>) -> Self {
        let numbers = values.into_iter().map(|d| Number::Decimal(d.0)).collect();
        Value::NumberArray(NumericKind::Decimal, numbers)
    }
}

impl FromValue for Decimal {
    const KIND: ValueKind = ValueKind::Numeric(NumericKind::Decimal);

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Number(n) => match n.coerce(NumericKind::Decimal)? {
                Number::Decimal(v) => Ok(Decimal(v)),
                other => Err(ConversionError::Mismatch {
                    expected: Self::KIND,
                    found: ValueKind::Numeric(other.kind()),
                }),
            },
            other => Err(other.mismatch(Self::KIND)),
        }
    }
}

impl FromValue for Vec<Decimal> {
    const KIND: ValueKind = ValueKind::NumericArray(NumericKind::Decimal);

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::NumberArray(_, items) => {
                items.into_iter().map(|n| Decimal::from_value(Value::Number(n))).collect()
            }
            other => Err(other.mismatch(Self::KIND)),
        }
    }
}
