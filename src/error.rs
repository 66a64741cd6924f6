//! Error taxonomy shared by the attribute cache, the tabular mapper and the
//! config resolver.

use crate::convert::ValueKind;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A raw literal that does not fit the grammar of its target kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("cannot convert an empty string to {kind}")]
    Empty { kind: ValueKind },

    #[error("value '{value}' cannot be parsed as {kind}")]
    InvalidLiteral { kind: ValueKind, value: String },

    #[error("value '{value}' is out of range for {kind}")]
    Overflow { kind: ValueKind, value: String },

    #[error("invalid position/value pair: '{value}'")]
    InvalidBitPair { value: String },

    #[error("invalid input: bit count {count} outside 1..=8")]
    BitCount { count: usize },

    #[error("invalid bit position {position}: must be within 0..=7")]
    BitPosition { position: u32 },

    #[error("{found} value cannot be assigned to {expected}")]
    Mismatch { expected: ValueKind, found: ValueKind },

    #[error("no conversion rule registered for {kind}")]
    Unsupported { kind: ValueKind },
}

/// A mapping that callers declared mandatory is missing. Always fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("required entry '{property}' in section '{section}' is missing: {reason}")]
    MissingEntry { section: String, property: String, reason: String },

    #[error("required {marker} marker is missing on {owner}::{member}")]
    MissingMarker { owner: &'static str, member: String, marker: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Conversion,
    Structural,
    Source,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{context} -> {reason}")]
    Validation { context: String, reason: String },

    #[error("{context} -> {reason}")]
    NotFound { context: String, reason: String },

    #[error("{context} -> {source}")]
    Conversion {
        context: String,
        #[source]
        source: ConversionError,
    },

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("{context} -> {reason}")]
    Source { context: String, reason: String },
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Validation { .. } => ErrorCategory::Validation,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Conversion { .. } => ErrorCategory::Conversion,
            Error::Structural(_) => ErrorCategory::Structural,
            Error::Source { .. } => ErrorCategory::Source,
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, Error::Structural(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::NumericKind;

    #[test]
    fn conversion_errors_name_the_kind() {
        let err = ConversionError::Overflow {
            kind: ValueKind::Numeric(NumericKind::I16),
            value: "40000".into(),
        };
        assert_eq!(err.to_string(), "value '40000' is out of range for i16");
    }

    #[test]
    fn category_follows_variant() {
        let err = Error::from(StructuralError::MissingMarker {
            owner: "Setting",
            member: "Pulse".into(),
            marker: "Alias",
        });
        assert_eq!(err.category(), ErrorCategory::Structural);
        assert!(err.is_structural());
        assert_eq!(err.to_string(), "required Alias marker is missing on Setting::Pulse");
    }
}
