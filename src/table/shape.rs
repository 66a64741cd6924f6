//! Typed property accessors and the per-type column shape built from them.

use crate::attrs::{Alias, AttributeCache, Described};
use crate::convert::{FromValue, Value, ValueKind};
use crate::error::ConversionError;
use serde::Serialize;
use std::fmt;

type Getter<T> = Box<dyn Fn(&T) -> Option<Value> + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<(), ConversionError> + Send + Sync>;

/// A readable and writable property of `T`.
pub struct PropertyDef<T> {
    name: &'static str,
    kind: ValueKind,
    get: Getter<T>,
    set: Setter<T>,
}

impl<T: 'static> PropertyDef<T> {
    /// A plain field, always present.
    pub fn field<V>(name: &'static str, get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) -> Self
    where
        V: FromValue + Clone + Into<Value> + 'static,
    {
        Self {
            name,
            kind: V::KIND,
            get: Box::new(move |obj| Some(get(obj).clone().into())),
            set: Box::new(move |obj, value| {
                *get_mut(obj) = V::from_value(value)?;
                Ok(())
            }),
        }
    }

    /// An `Option` field; `None` maps to a null cell.
    pub fn optional<V>(
        name: &'static str,
        get: fn(&T) -> &Option<V>,
        get_mut: fn(&mut T) -> &mut Option<V>,
    ) -> Self
    where
        V: FromValue + Clone + Into<Value> + 'static,
    {
        Self {
            name,
            kind: V::KIND,
            get: Box::new(move |obj| get(obj).clone().map(Into::into)),
            set: Box::new(move |obj, value| {
                *get_mut(obj) = Some(V::from_value(value)?);
                Ok(())
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub(crate) fn read(&self, obj: &T) -> Option<Value> {
        (self.get)(obj)
    }

    pub(crate) fn write(&self, obj: &mut T, value: Value) -> Result<(), ConversionError> {
        (self.set)(obj, value)
    }
}

impl<T> fmt::Debug for PropertyDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDef").field("name", &self.name).field("kind", &self.kind).finish()
    }
}

/// A record type that can be mapped to and from table rows.
///
/// Column aliases come from [`Alias`] markers in the type's [`Described`]
/// table; properties without one use their own name.
pub trait Tabular: Described + Default + 'static {
    fn properties() -> Vec<PropertyDef<Self>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyAlias {
    pub property: String,
    pub alias: String,
    pub kind: ValueKind,
}

/// Properties of `T` ordered by alias.
pub(crate) struct Shape<T> {
    pub(crate) type_name: &'static str,
    pub(crate) entries: Vec<(PropertyAlias, PropertyDef<T>)>,
}

impl<T: Tabular> Shape<T> {
    pub(crate) fn build(cache: &AttributeCache) -> Self {
        cache.register::<T>();
        let mut entries: Vec<_> = T::properties()
            .into_iter()
            .map(|def| {
                let alias = cache
                    .resolve::<T, Alias>(def.name())
                    .map(|alias| alias.as_str().to_string())
                    .unwrap_or_else(|| def.name().to_string());
                let meta =
                    PropertyAlias { property: def.name().to_string(), alias, kind: def.kind() };
                (meta, def)
            })
            .collect();
        entries.sort_by(|a, b| a.0.alias.cmp(&b.0.alias));
        Self { type_name: crate::attrs::marker::short_type_name::<T>(), entries }
    }

    pub(crate) fn aliases(&self) -> Vec<PropertyAlias> {
        self.entries.iter().map(|(meta, _)| meta.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::MemberDescriptor;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Lot {
        id: String,
        qty: i32,
        note: Option<String>,
    }

    impl Described for Lot {
        fn members() -> Vec<MemberDescriptor> {
            vec![MemberDescriptor::new("id").with(Alias::new("LOT_ID"))]
        }
    }

    impl Tabular for Lot {
        fn properties() -> Vec<PropertyDef<Self>> {
            vec![
                PropertyDef::field("id", |l: &Lot| &l.id, |l: &mut Lot| &mut l.id),
                PropertyDef::field("qty", |l: &Lot| &l.qty, |l: &mut Lot| &mut l.qty),
                PropertyDef::optional("note", |l: &Lot| &l.note, |l: &mut Lot| &mut l.note),
            ]
        }
    }

    #[test]
    fn shape_is_sorted_by_alias() {
        let shape = Shape::<Lot>::build(&AttributeCache::new());
        let aliases: Vec<_> = shape.aliases().into_iter().map(|a| a.alias).collect();
        assert_eq!(aliases, vec!["LOT_ID", "note", "qty"]);
        assert_eq!(shape.type_name, "Lot");
    }

    #[test]
    fn accessors_read_and_write() {
        let props = Lot::properties();
        let mut lot = Lot::default();
        props[1].write(&mut lot, Value::from(5i16)).expect("widen");
        assert_eq!(lot.qty, 5);
        assert_eq!(props[2].read(&lot), None);
        props[2].write(&mut lot, Value::from("x")).expect("note");
        assert_eq!(props[2].read(&lot), Some(Value::from("x")));
        assert!(props[0].write(&mut lot, Value::from(1i32)).is_err());
    }
}
