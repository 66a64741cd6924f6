//! Keyed set of conversion rules.

use super::kind::{NumericKind, ValueKind};
use super::rules::{
    BitPairRule, BitPairsRule, BoolRule, CharRule, ConversionRule, Delimiters, NumericArrayRule,
    NumericRule, PackedByteRule, StringArrayRule, StringRule,
};
use super::value::{FromValue, Value};
use crate::error::ConversionError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// At most one rule per [`ValueKind`]; registering again replaces the rule.
///
/// Cloning is cheap (rules are shared), which is how per-section overrides are
/// layered on top of a base registry.
#[derive(Clone, Default)]
pub struct TypeConverterRegistry {
    rules: HashMap<ValueKind, Arc<dyn ConversionRule>>,
}

impl TypeConverterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in kind with the default delimiters (`;` and `:`).
    pub fn with_defaults() -> Self {
        Self::with_delimiters(Delimiters::default())
    }

    pub fn with_delimiters(delimiters: Delimiters) -> Self {
        let mut registry = Self::new();
        registry.register(ValueKind::String, StringRule);
        registry.register(ValueKind::Char, CharRule);
        registry.register(ValueKind::Bool, BoolRule);
        for kind in NumericKind::ALL {
            registry.register(ValueKind::Numeric(kind), NumericRule(kind));
            registry.register(
                ValueKind::NumericArray(kind),
                NumericArrayRule { kind, delimiter: delimiters.array },
            );
        }
        registry.register(ValueKind::StringArray, StringArrayRule { delimiter: delimiters.array });
        registry.register(ValueKind::BitPair, BitPairRule { value_delimiter: delimiters.value });
        registry.register(
            ValueKind::BitPairs,
            BitPairsRule { pair_delimiter: delimiters.pair, value_delimiter: delimiters.value },
        );
        registry.register(
            ValueKind::PackedByte,
            PackedByteRule { pair_delimiter: delimiters.pair, value_delimiter: delimiters.value },
        );
        registry
    }

    /// Register `rule` for `kind`, returning the rule it replaced.
    pub fn register<R>(&mut self, kind: ValueKind, rule: R) -> Option<Arc<dyn ConversionRule>>
    where
        R: ConversionRule + 'static,
    {
        self.register_shared(kind, Arc::new(rule))
    }

    pub fn register_shared(
        &mut self,
        kind: ValueKind,
        rule: Arc<dyn ConversionRule>,
    ) -> Option<Arc<dyn ConversionRule>> {
        self.rules.insert(kind, rule)
    }

    pub fn contains(&self, kind: ValueKind) -> bool {
        self.rules.contains_key(&kind)
    }

    pub fn kinds(&self) -> Vec<ValueKind> {
        let mut kinds: Vec<_> = self.rules.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn convert(&self, raw: &str, kind: ValueKind) -> Result<Value, ConversionError> {
        let rule = self.rules.get(&kind).ok_or(ConversionError::Unsupported { kind })?;
        let value = rule.convert(raw)?;
        if value.kind() != kind {
            return Err(ConversionError::Mismatch { expected: kind, found: value.kind() });
        }
        Ok(value)
    }

    /// Convert straight into a Rust type using its [`FromValue::KIND`].
    pub fn convert_to<T: FromValue>(&self, raw: &str) -> Result<T, ConversionError> {
        T::from_value(self.convert(raw, T::KIND)?)
    }
}

impl fmt::Debug for TypeConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeConverterRegistry").field("kinds", &self.kinds()).finish()
    }
}
