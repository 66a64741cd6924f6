//! Section/property lookups converted into typed values.

use super::key::SettingKey;
use super::source::{ConfigSource, Section};
use crate::attrs::{Alias, AttributeCache};
use crate::convert::{ConversionRule, FromValue, TypeConverterRegistry, Value, ValueKind};
use crate::error::{Error, Result, StructuralError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Outcome of a soft lookup.
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    /// Why the value could not be produced. Never structural.
    Missing(Error),
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Missing(_) => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Lookup::Found(_) => None,
            Lookup::Missing(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<T> {
        match self {
            Lookup::Found(value) => Ok(value),
            Lookup::Missing(err) => Err(err),
        }
    }

    /// `(value, true)` when found, `(zero value, false)` otherwise.
    pub fn into_parts(self) -> (T, bool)
    where
        T: Default,
    {
        match self {
            Lookup::Found(value) => (value, true),
            Lookup::Missing(_) => (T::default(), false),
        }
    }
}

#[derive(Default)]
struct ResolverState {
    sections: HashMap<String, Arc<Section>>,
    overrides: HashMap<String, Arc<TypeConverterRegistry>>,
}

/// Resolves `(section, property)` pairs from a [`ConfigSource`].
///
/// Sections are loaded on first use and cached until [`reset`](Self::reset).
/// Two policies are offered: [`get`](Self::get) never fails and reports a
/// [`Lookup`]; [`require`](Self::require) propagates errors and escalates an
/// absent entry to [`StructuralError::MissingEntry`].
pub struct ConfigResolver {
    source: Box<dyn ConfigSource>,
    cache: Arc<AttributeCache>,
    registry: Arc<TypeConverterRegistry>,
    state: Mutex<ResolverState>,
}

impl ConfigResolver {
    pub fn new(source: impl ConfigSource + 'static, cache: Arc<AttributeCache>) -> Self {
        Self {
            source: Box::new(source),
            cache,
            registry: Arc::new(TypeConverterRegistry::with_defaults()),
            state: Mutex::new(ResolverState::default()),
        }
    }

    /// Replace the resolver-wide registry. Section overrides already set are kept.
    pub fn with_registry(mut self, registry: TypeConverterRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn registry(&self) -> &TypeConverterRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<AttributeCache> {
        &self.cache
    }

    pub fn get<T: FromValue>(&self, section: &str, property: &str) -> Lookup<T> {
        match self.resolve_typed(section, property) {
            Ok(value) => Lookup::Found(value),
            Err(err) => {
                debug!(section, property, error = %err, "setting not resolved");
                Lookup::Missing(err)
            }
        }
    }

    pub fn require<T: FromValue>(&self, section: &str, property: &str) -> Result<T> {
        self.resolve_typed(section, property).map_err(|err| escalate(err, section, property))
    }

    /// [`get`](Self::get) for a kind chosen at runtime.
    pub fn get_value(&self, section: &str, property: &str, kind: ValueKind) -> Lookup<Value> {
        match self.resolve(section, property, kind) {
            Ok(value) => Lookup::Found(value),
            Err(err) => {
                debug!(section, property, error = %err, "setting not resolved");
                Lookup::Missing(err)
            }
        }
    }

    pub fn require_value(&self, section: &str, property: &str, kind: ValueKind) -> Result<Value> {
        self.resolve(section, property, kind).map_err(|err| escalate(err, section, property))
    }

    /// The storage alias declared on `key`. A key without one is a structural defect.
    pub fn required_alias<K: SettingKey>(&self, key: K) -> Result<String> {
        self.cache.register::<K>();
        let alias = self.cache.require::<K, Alias>(key.member_name())?;
        Ok(alias.as_str().to_string())
    }

    /// Soft lookup of the property `key` is stored under. Only a missing
    /// alias fails.
    pub fn get_by_key<K: SettingKey, T: FromValue>(
        &self,
        section: &str,
        key: K,
    ) -> Result<Lookup<T>> {
        let alias = self.required_alias(key)?;
        Ok(self.get(section, &alias))
    }

    pub fn require_by_key<K: SettingKey, T: FromValue>(&self, section: &str, key: K) -> Result<T> {
        let alias = self.required_alias(key)?;
        self.require(section, &alias)
    }

    /// Use `rule` for `kind` within `section` only. Survives [`reset`](Self::reset).
    pub fn set_converter<R>(&self, section: &str, kind: ValueKind, rule: R)
    where
        R: ConversionRule + 'static,
    {
        let mut state = self.state.lock();
        let registry = state
            .overrides
            .entry(section.to_string())
            .or_insert_with(|| Arc::clone(&self.registry));
        Arc::make_mut(registry).register(kind, rule);
    }

    /// Drop every converter override of `section`.
    pub fn clear_converters(&self, section: &str) -> bool {
        self.state.lock().overrides.remove(section).is_some()
    }

    pub fn is_loaded(&self, section: &str) -> bool {
        self.state.lock().sections.contains_key(section)
    }

    /// Forget the cached contents of `section`; the next lookup reloads it.
    pub fn reset(&self, section: &str) -> bool {
        self.state.lock().sections.remove(section).is_some()
    }

    pub fn reset_all(&self) {
        self.state.lock().sections.clear();
    }

    fn resolve_typed<T: FromValue>(&self, section: &str, property: &str) -> Result<T> {
        let value = self.resolve(section, property, T::KIND)?;
        T::from_value(value).map_err(|source| Error::Conversion {
            context: context(section, property, T::KIND),
            source,
        })
    }

    fn resolve(&self, section: &str, property: &str, kind: ValueKind) -> Result<Value> {
        let invalid = |reason: &str| Error::Validation {
            context: context(section, property, kind),
            reason: reason.to_string(),
        };
        if section.trim().is_empty() {
            return Err(invalid("section name is empty"));
        }
        if property.trim().is_empty() {
            return Err(invalid("property name is empty"));
        }

        let (raw, registry) = {
            let mut state = self.state.lock();
            let entries = self.load_section(&mut state, section, property, kind)?;
            let raw = entries.get(property).cloned().ok_or_else(|| Error::NotFound {
                context: context(section, property, kind),
                reason: "property is not defined".to_string(),
            })?;
            let registry = state.overrides.get(section).unwrap_or(&self.registry).clone();
            (raw, registry)
        };

        registry.convert(&raw, kind).map_err(|source| Error::Conversion {
            context: context(section, property, kind),
            source,
        })
    }

    fn load_section(
        &self,
        state: &mut ResolverState,
        section: &str,
        property: &str,
        kind: ValueKind,
    ) -> Result<Arc<Section>> {
        if let Some(entries) = state.sections.get(section) {
            return Ok(Arc::clone(entries));
        }

        let loaded = self.source.load_section(section).map_err(|e| Error::Source {
            context: context(section, property, kind),
            reason: format!("{e:#}"),
        })?;

        match loaded {
            Some(entries) if !entries.is_empty() => {
                debug!(section, entries = entries.len(), "section loaded");
                let entries = Arc::new(entries);
                state.sections.insert(section.to_string(), Arc::clone(&entries));
                Ok(entries)
            }
            _ => Err(Error::NotFound {
                context: context(section, property, kind),
                reason: "section is missing or empty".to_string(),
            }),
        }
    }
}

fn context(section: &str, property: &str, kind: ValueKind) -> String {
    format!("resolve('{section}', '{property}') as {kind}")
}

/// Hard lookups turn absence into a structural failure; other errors pass through.
fn escalate(err: Error, section: &str, property: &str) -> Error {
    match err {
        Error::NotFound { reason, .. } => StructuralError::MissingEntry {
            section: section.to_string(),
            property: property.to_string(),
            reason,
        }
        .into(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemorySource;
    use crate::convert::rules::StringArrayRule;
    use crate::error::{ConversionError, ErrorCategory};
    use std::sync::atomic::{AtomicUsize, Ordering};

    crate::setting_keys! {
        enum Setting {
            Interval => "PULSE_INTERVAL",
            Recipients => "MAIL_TO",
            Unmapped,
        }
    }

    fn resolver() -> ConfigResolver {
        let source = MemorySource::new()
            .with("pulse", "PULSE_INTERVAL", "0x1E")
            .with("pulse", "enabled", "yes")
            .with("pulse", "flags", "0:true;7:true")
            .with("pulse", "broken", "maybe")
            .with("mail", "MAIL_TO", "a@x;b@x");
        ConfigResolver::new(source, Arc::new(AttributeCache::new()))
    }

    struct CountingSource {
        inner: MemorySource,
        loads: Arc<AtomicUsize>,
    }

    impl ConfigSource for CountingSource {
        fn load_section(&self, name: &str) -> anyhow::Result<Option<Section>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load_section(name)
        }
    }

    struct FailingSource;

    impl ConfigSource for FailingSource {
        fn load_section(&self, _name: &str) -> anyhow::Result<Option<Section>> {
            anyhow::bail!("database offline")
        }
    }

    #[test]
    fn get_converts_found_values() {
        let resolver = resolver();
        assert_eq!(resolver.get::<u32>("pulse", "PULSE_INTERVAL").found(), Some(30));
        assert_eq!(resolver.get::<bool>("pulse", "enabled").found(), Some(true));
        assert_eq!(resolver.get::<u8>("pulse", "flags").found(), Some(0x81));
    }

    #[test]
    fn soft_miss_yields_zero_and_false() {
        let resolver = resolver();
        assert_eq!(resolver.get::<i32>("pulse", "missing").into_parts(), (0, false));
        assert_eq!(resolver.get::<String>("nowhere", "x").into_parts(), (String::new(), false));
        assert_eq!(resolver.get::<bool>("pulse", "broken").into_parts(), (false, false));
    }

    #[test]
    fn validation_runs_in_order() {
        let resolver = resolver();
        let err = resolver.require::<i32>(" ", "").unwrap_err();
        assert_eq!(err.to_string(), "resolve(' ', '') as i32 -> section name is empty");
        let err = resolver.require::<i32>("pulse", "").unwrap_err();
        assert_eq!(err.to_string(), "resolve('pulse', '') as i32 -> property name is empty");
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn require_escalates_absence_to_structural() {
        let resolver = resolver();
        let err = resolver.require::<i32>("pulse", "missing").unwrap_err();
        assert!(err.is_structural());
        assert_eq!(
            err.to_string(),
            "required entry 'missing' in section 'pulse' is missing: property is not defined"
        );
        let err = resolver.require::<i32>("nowhere", "x").unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::MissingEntry { ref section, .. })
                if section == "nowhere"
        ));
    }

    #[test]
    fn require_propagates_conversion_errors_unchanged() {
        let resolver = resolver();
        let err = resolver.require::<bool>("pulse", "broken").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Conversion);
        assert!(err.to_string().starts_with("resolve('pulse', 'broken') as bool -> "));
        let err = resolver.require::<i16>("pulse", "enabled").unwrap_err();
        assert!(matches!(
            err,
            Error::Conversion { source: ConversionError::InvalidLiteral { .. }, .. }
        ));
    }

    #[test]
    fn section_loads_once_until_reset() {
        let loads = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            inner: MemorySource::new().with("pulse", "a", "1").with("pulse", "b", "2"),
            loads: Arc::clone(&loads),
        };
        let resolver = ConfigResolver::new(source, Arc::new(AttributeCache::new()));
        assert!(!resolver.is_loaded("pulse"));
        resolver.get::<i32>("pulse", "a");
        resolver.get::<i32>("pulse", "b");
        assert!(resolver.is_loaded("pulse"));
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        assert!(resolver.reset("pulse"));
        assert!(!resolver.is_loaded("pulse"));
        resolver.get::<i32>("pulse", "a");
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_sections_are_not_cached() {
        let loads = Arc::new(AtomicUsize::new(0));
        let source = CountingSource { inner: MemorySource::new(), loads: Arc::clone(&loads) };
        let resolver = ConfigResolver::new(source, Arc::new(AttributeCache::new()));
        resolver.get::<i32>("pulse", "a");
        resolver.get::<i32>("pulse", "a");
        assert!(!resolver.is_loaded("pulse"));
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_lookups_load_a_section_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            inner: MemorySource::new().with("pulse", "a", "7"),
            loads: Arc::clone(&loads),
        };
        let resolver = Arc::new(ConfigResolver::new(source, Arc::new(AttributeCache::new())));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                std::thread::spawn(move || resolver.require::<i64>("pulse", "a").expect("value"))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().expect("thread"), 7);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn source_failures_are_reported() {
        let resolver = ConfigResolver::new(FailingSource, Arc::new(AttributeCache::new()));
        let err = resolver.require::<i32>("pulse", "a").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Source);
        assert_eq!(err.to_string(), "resolve('pulse', 'a') as i32 -> database offline");
    }

    #[test]
    fn section_overrides_survive_reload() {
        let resolver = resolver();
        resolver.set_converter("mail", ValueKind::StringArray, StringArrayRule { delimiter: ',' });
        assert_eq!(
            resolver.require::<Vec<String>>("mail", "MAIL_TO").expect("list"),
            vec!["a@x;b@x".to_string()]
        );
        resolver.reset_all();
        assert_eq!(
            resolver.require::<Vec<String>>("mail", "MAIL_TO").expect("list"),
            vec!["a@x;b@x".to_string()]
        );
        // Clearing restores the resolver-wide rules.
        assert!(resolver.clear_converters("mail"));
        assert_eq!(
            resolver.require::<Vec<String>>("mail", "MAIL_TO").expect("list"),
            vec!["a@x".to_string(), "b@x".to_string()]
        );
    }

    #[test]
    fn setting_keys_resolve_through_aliases() {
        let resolver = resolver();
        assert_eq!(resolver.required_alias(Setting::Interval).expect("alias"), "PULSE_INTERVAL");
        let interval = resolver.require_by_key::<_, u16>("pulse", Setting::Interval);
        assert_eq!(interval.expect("value"), 30);
        let recipients: Lookup<Vec<String>> =
            resolver.get_by_key("mail", Setting::Recipients).expect("alias");
        assert_eq!(recipients.found().map(|r| r.len()), Some(2));
        let mismatched = resolver.get_by_key::<_, i32>("pulse", Setting::Recipients);
        assert!(!mismatched.expect("alias").is_found());
    }

    #[test]
    fn missing_alias_is_always_fatal() {
        let resolver = resolver();
        let err = resolver.required_alias(Setting::Unmapped).unwrap_err();
        assert!(err.is_structural());
        assert_eq!(err.to_string(), "required Alias marker is missing on Setting::Unmapped");
        assert!(resolver.get_by_key::<_, i32>("pulse", Setting::Unmapped).is_err());
    }
}
