//! Configuration resolution
//!
//! Raw settings come from a [`ConfigSource`] (memory, a TOML/YAML file, or a
//! SQLite table) and are converted on lookup by a [`ConfigResolver`].

pub mod key;
pub mod loader;
pub mod resolver;
pub mod source;
pub mod sqlite;

pub use key::SettingKey;
pub use loader::{load_source, FileSource};
pub use resolver::{ConfigResolver, Lookup};
pub use source::{ConfigSource, MemorySource, Section, DEFAULT_SECTION};
pub use sqlite::SqliteSource;
