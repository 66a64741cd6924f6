//! Config sources: flat string stores partitioned into named sections.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Section that receives top-level scalar settings.
pub const DEFAULT_SECTION: &str = "appSettings";

/// Property name -> raw string value.
pub type Section = HashMap<String, String>;

/// Where a [`ConfigResolver`](super::ConfigResolver) reads raw values from.
///
/// `Ok(None)` means the section does not exist; `Err` means the source itself
/// could not be read.
pub trait ConfigSource: Send + Sync {
    fn load_section(&self, name: &str) -> anyhow::Result<Option<Section>>;
}

impl<S: ConfigSource + ?Sized> ConfigSource for Arc<S> {
    fn load_section(&self, name: &str) -> anyhow::Result<Option<Section>> {
        (**self).load_section(name)
    }
}

impl<S: ConfigSource + ?Sized> ConfigSource for Box<S> {
    fn load_section(&self, name: &str) -> anyhow::Result<Option<Section>> {
        (**self).load_section(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySource {
    sections: BTreeMap<String, Section>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, section: &str, property: &str, value: impl Into<String>) -> Self {
        self.insert(section, property, value);
        self
    }

    pub fn insert(
        &mut self,
        section: &str,
        property: &str,
        value: impl Into<String>,
    ) -> Option<String> {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(property.to_string(), value.into())
    }

    pub fn section_mut(&mut self, section: &str) -> &mut Section {
        self.sections.entry(section.to_string()).or_default()
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.values().all(HashMap::is_empty)
    }
}

impl ConfigSource for MemorySource {
    fn load_section(&self, name: &str) -> anyhow::Result<Option<Section>> {
        Ok(self.sections.get(name).cloned())
    }
}
