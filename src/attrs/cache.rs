//! Per-type registry of member markers, built once and read many times.

use super::marker::{short_type_name, Described, Marker, MemberDescriptor};
use crate::error::StructuralError;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

type MarkerMap = HashMap<TypeId, (&'static str, Arc<dyn Any + Send + Sync>)>;

struct TypeEntry {
    type_name: &'static str,
    members: HashMap<String, MarkerMap>,
}

/// Member name -> marker kind names, as stored for one type.
pub type CacheSnapshot = BTreeMap<String, Vec<&'static str>>;

/// Thread-safe cache of the markers each registered type declares.
///
/// Lookups never fail: an unregistered type, an unknown member and a missing
/// marker all resolve to `None`. Callers decide whether absence is fatal, or
/// use [`AttributeCache::require`].
#[derive(Default)]
pub struct AttributeCache {
    entries: Mutex<HashMap<TypeId, TypeEntry>>,
}

impl AttributeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` from its [`Described`] table. Returns `false` when `T` was
    /// already registered, in which case nothing changes.
    pub fn register<T: Described>(&self) -> bool {
        let mut entries = self.entries.lock();
        if entries.contains_key(&TypeId::of::<T>()) {
            return false;
        }
        let entry = build_entry(short_type_name::<T>(), T::members());
        insert_entry(&mut entries, TypeId::of::<T>(), entry)
    }

    /// Register a descriptor table built at runtime under `type_id`.
    pub fn register_descriptors(
        &self,
        type_id: TypeId,
        type_name: &'static str,
        members: Vec<MemberDescriptor>,
    ) -> bool {
        let mut entries = self.entries.lock();
        if entries.contains_key(&type_id) {
            return false;
        }
        insert_entry(&mut entries, type_id, build_entry(type_name, members))
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.entries.lock().contains_key(&TypeId::of::<T>())
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// The `M` marker declared on `member` of `T`, if any.
    pub fn resolve<T: 'static, M: Marker>(&self, member: &str) -> Option<Arc<M>> {
        let entries = self.entries.lock();
        let markers = entries.get(&TypeId::of::<T>())?.members.get(member)?;
        let (_, value) = markers.get(&TypeId::of::<M>())?;
        Arc::clone(value).downcast::<M>().ok()
    }

    /// Like [`resolve`](Self::resolve), but a missing marker is a structural defect.
    pub fn require<T: 'static, M: Marker>(&self, member: &str) -> Result<Arc<M>, StructuralError> {
        self.resolve::<T, M>(member).ok_or_else(|| StructuralError::MissingMarker {
            owner: short_type_name::<T>(),
            member: member.to_string(),
            marker: short_type_name::<M>(),
        })
    }

    /// Member names of `T` that declare at least one marker, with the marker
    /// kinds they declare. `None` when `T` is not registered.
    pub fn snapshot<T: 'static>(&self) -> Option<CacheSnapshot> {
        let entries = self.entries.lock();
        let entry = entries.get(&TypeId::of::<T>())?;
        Some(
            entry
                .members
                .iter()
                .map(|(name, markers)| {
                    let mut kinds: Vec<_> = markers.values().map(|(kind, _)| *kind).collect();
                    kinds.sort_unstable();
                    (name.clone(), kinds)
                })
                .collect(),
        )
    }

    /// Drop everything cached for `T`. Returns whether `T` was registered.
    pub fn clear<T: 'static>(&self) -> bool {
        let removed = self.entries.lock().remove(&TypeId::of::<T>());
        if let Some(entry) = &removed {
            debug!(type_name = entry.type_name, "attribute cache entry cleared");
        }
        removed.is_some()
    }

    pub fn clear_all(&self) {
        self.entries.lock().clear();
    }
}

fn build_entry(type_name: &'static str, members: Vec<MemberDescriptor>) -> TypeEntry {
    let mut map = HashMap::new();
    for member in members {
        if member.markers().is_empty() {
            continue;
        }
        let markers: &mut MarkerMap = map.entry(member.name().to_string()).or_default();
        for marker in member.markers() {
            // First declaration of a kind wins.
            markers
                .entry(marker.kind)
                .or_insert_with(|| (marker.kind_name, Arc::clone(&marker.value)));
        }
    }
    TypeEntry { type_name, members: map }
}

fn insert_entry(
    entries: &mut HashMap<TypeId, TypeEntry>,
    type_id: TypeId,
    entry: TypeEntry,
) -> bool {
    debug!(type_name = entry.type_name, members = entry.members.len(), "type registered");
    entries.insert(type_id, entry);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::marker::Alias;

    #[derive(Debug)]
    struct Unit(&'static str);

    impl Marker for Unit {}

    struct Material;

    impl Described for Material {
        fn members() -> Vec<MemberDescriptor> {
            vec![
                MemberDescriptor::new("number").with(Alias::new("MATNR")),
                MemberDescriptor::new("weight")
                    .with(Unit("kg"))
                    .with(Alias::new("WEIGHT"))
                    .with(Alias::new("IGNORED")),
                MemberDescriptor::new("plain"),
            ]
        }
    }

    struct Unregistered;

    #[test]
    fn register_is_idempotent() {
        let cache = AttributeCache::new();
        assert!(cache.register::<Material>());
        let first = cache.snapshot::<Material>();
        assert!(!cache.register::<Material>());
        assert_eq!(cache.snapshot::<Material>(), first);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn resolve_finds_declared_markers() {
        let cache = AttributeCache::new();
        cache.register::<Material>();
        let alias = cache.resolve::<Material, Alias>("number");
        assert_eq!(alias.as_deref(), Some(&Alias::new("MATNR")));
        assert_eq!(cache.resolve::<Material, Unit>("weight").map(|unit| unit.0), Some("kg"));
    }

    #[test]
    fn first_marker_of_a_kind_wins() {
        let cache = AttributeCache::new();
        cache.register::<Material>();
        let alias = cache.resolve::<Material, Alias>("weight");
        assert_eq!(alias.as_deref(), Some(&Alias::new("WEIGHT")));
    }

    #[test]
    fn absence_is_not_an_error() {
        let cache = AttributeCache::new();
        cache.register::<Material>();
        assert!(cache.resolve::<Material, Unit>("number").is_none());
        assert!(cache.resolve::<Material, Alias>("missing").is_none());
        assert!(cache.resolve::<Unregistered, Alias>("number").is_none());
        // Members without markers are not stored at all.
        assert!(!cache.snapshot::<Material>().expect("registered").contains_key("plain"));
    }

    #[test]
    fn require_reports_structural_error() {
        let cache = AttributeCache::new();
        cache.register::<Material>();
        let err = cache.require::<Material, Unit>("number").unwrap_err();
        assert_eq!(
            err,
            StructuralError::MissingMarker {
                owner: "Material",
                member: "number".into(),
                marker: "Unit"
            }
        );
    }

    #[test]
    fn clear_forgets_the_type() {
        let cache = AttributeCache::new();
        cache.register::<Material>();
        assert!(cache.clear::<Material>());
        assert!(!cache.clear::<Material>());
        assert!(cache.resolve::<Material, Alias>("number").is_none());
        assert!(cache.register::<Material>());
    }

    #[test]
    fn runtime_descriptor_tables() {
        let cache = AttributeCache::new();
        let members = vec![MemberDescriptor::new("id").with(Alias::new("ID"))];
        assert!(cache.register_descriptors(TypeId::of::<Unregistered>(), "Unregistered", members));
        assert_eq!(cache.resolve::<Unregistered, Alias>("id").as_deref(), Some(&Alias::new("ID")));
        cache.clear_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_registration_converges() {
        let cache = Arc::new(AttributeCache::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.register::<Material>())
            })
            .collect();
        let registered =
            handles.into_iter().map(|h| h.join().expect("thread")).filter(|r| *r).count();
        assert_eq!(registered, 1);
        assert_eq!(cache.len(), 1);
    }
}
