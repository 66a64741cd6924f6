//! typed-settings: a metadata cache and typed-conversion engine
//!
//! Types declare per-member markers (such as an [`Alias`]) through explicit
//! registration tables. On top of that cache the crate maps table rows to
//! records and resolves raw string settings into typed values.
//!
//! ```
//! use std::sync::Arc;
//! use typed_settings::{AttributeCache, ConfigResolver, MemorySource};
//!
//! let source = MemorySource::new().with("pulse", "interval", "0x1E");
//! let resolver = ConfigResolver::new(source, Arc::new(AttributeCache::new()));
//!
//! assert_eq!(resolver.get::<u32>("pulse", "interval").into_parts(), (30, true));
//! assert_eq!(resolver.get::<u32>("pulse", "missing").into_parts(), (0, false));
//! ```

pub mod attrs;
pub mod config;
pub mod context;
pub mod convert;
pub mod error;
pub mod table;

pub use attrs::{Alias, AttributeCache, Described, Marker, MemberDescriptor};
pub use config::{
    load_source, ConfigResolver, ConfigSource, FileSource, Lookup, MemorySource, SettingKey,
    SqliteSource,
};
pub use context::SettingsContext;
pub use convert::{
    BitPair, ConversionRule, Decimal, Delimiters, FromValue, Number, NumericKind,
    TypeConverterRegistry, Value, ValueKind,
};
pub use error::{ConversionError, Error, ErrorCategory, Result, StructuralError};
pub use table::{Column, PropertyAlias, PropertyDef, Row, Table, Tabular, TabularMapper};
