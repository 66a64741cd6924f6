//! String to typed-value conversion
//!
//! Raw settings arrive as strings. Each [`ValueKind`] has at most one
//! [`ConversionRule`] in a [`TypeConverterRegistry`]; the built-in rules
//! implement the grammars in [`literal`].

pub mod kind;
pub mod literal;
pub mod registry;
pub mod rules;
pub mod value;

pub use kind::{NumericKind, UnknownKind, ValueKind};
pub use registry::TypeConverterRegistry;
pub use rules::{ConversionRule, Delimiters};
pub use value::{BitPair, Decimal, FromValue, Number, Value};
