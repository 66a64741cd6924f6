//! One context object per process, passed to every consumer.

use crate::attrs::AttributeCache;
use crate::config::{ConfigResolver, ConfigSource};
use crate::convert::TypeConverterRegistry;
use crate::table::TabularMapper;
use std::sync::Arc;

/// Owns the shared [`AttributeCache`] and the components built on it.
pub struct SettingsContext {
    cache: Arc<AttributeCache>,
    mapper: TabularMapper,
    resolver: ConfigResolver,
}

impl SettingsContext {
    pub fn new(source: impl ConfigSource + 'static) -> Self {
        Self::with_registry(source, TypeConverterRegistry::with_defaults())
    }

    pub fn with_registry(
        source: impl ConfigSource + 'static,
        registry: TypeConverterRegistry,
    ) -> Self {
        let cache = Arc::new(AttributeCache::new());
        Self {
            mapper: TabularMapper::new(Arc::clone(&cache)),
            resolver: ConfigResolver::new(source, Arc::clone(&cache)).with_registry(registry),
            cache,
        }
    }

    pub fn cache(&self) -> &AttributeCache {
        &self.cache
    }

    pub fn mapper(&self) -> &TabularMapper {
        &self.mapper
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Drop every cached type, shape and section. Converter overrides stay.
    pub fn clear(&self) {
        self.mapper.clear_all();
        self.cache.clear_all();
        self.resolver.reset_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemorySource;

    crate::setting_keys! {
        enum Key {
            Port => "PORT",
        }
    }

    #[test]
    fn components_share_one_cache() {
        let ctx = SettingsContext::new(MemorySource::new().with("db", "PORT", "5432"));
        assert_eq!(ctx.resolver().require_by_key::<_, u16>("db", Key::Port).expect("port"), 5432);
        assert!(ctx.cache().is_registered::<Key>());
        assert!(Arc::ptr_eq(ctx.mapper().cache(), ctx.resolver().cache()));

        ctx.clear();
        assert!(!ctx.cache().is_registered::<Key>());
        assert!(!ctx.resolver().is_loaded("db"));
    }
}
