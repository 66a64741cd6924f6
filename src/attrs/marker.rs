//! Markers and the explicit registration tables that declare them.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Metadata attached to a member of a type, e.g. an [`Alias`].
///
/// Any `'static` value can be a marker; markers are looked up by their Rust
/// type, so each marker type acts as its own "kind".
pub trait Marker: Any + Send + Sync + fmt::Debug {}

/// The external name a member is known by to config or tabular sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Alias(pub String);

impl Alias {
    pub fn new(alias: impl Into<String>) -> Self {
        Self(alias.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Marker for Alias {}

/// A marker instance with its kind erased.
#[derive(Clone)]
pub struct MarkerInstance {
    pub(crate) kind: TypeId,
    pub(crate) kind_name: &'static str,
    pub(crate) value: Arc<dyn Any + Send + Sync>,
}

impl MarkerInstance {
    pub fn new<M: Marker>(marker: M) -> Self {
        Self {
            kind: TypeId::of::<M>(),
            kind_name: short_type_name::<M>(),
            value: Arc::new(marker),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind_name
    }
}

impl fmt::Debug for MarkerInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MarkerInstance").field(&self.kind_name).finish()
    }
}

/// One member of a type and the markers it declares, in declaration order.
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    name: String,
    markers: Vec<MarkerInstance>,
}

impl MemberDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), markers: Vec::new() }
    }

    /// Declare `marker` on this member.
    pub fn with<M: Marker>(mut self, marker: M) -> Self {
        self.markers.push(MarkerInstance::new(marker));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn markers(&self) -> &[MarkerInstance] {
        &self.markers
    }
}

/// A type's registration table: the stand-in for runtime reflection.
pub trait Described: 'static {
    fn members() -> Vec<MemberDescriptor>;
}

/// `crate::module::Type` -> `Type`, keeping generic arguments intact.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Unit;

    impl Marker for Unit {}

    #[test]
    fn descriptor_keeps_declaration_order() {
        let member = MemberDescriptor::new("weight").with(Alias::new("WEIGHT_KG")).with(Unit);
        let kinds: Vec<_> = member.markers().iter().map(MarkerInstance::kind_name).collect();
        assert_eq!(kinds, vec!["Alias", "Unit"]);
    }

    #[test]
    fn short_names_strip_module_paths() {
        assert_eq!(short_type_name::<Alias>(), "Alias");
        assert!(short_type_name::<Vec<String>>().starts_with("Vec<"));
    }
}
