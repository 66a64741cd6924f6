//! Rows to typed records and back.

use super::data::{Row, Table};
use super::shape::{PropertyAlias, Shape, Tabular};
use crate::attrs::AttributeCache;
use crate::convert::Value;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Maps [`Table`] rows to [`Tabular`] records and records back to rows.
///
/// Shapes are built once per type and shared; the lock is only held while a
/// shape is looked up or built, never while rows are converted.
pub struct TabularMapper {
    cache: Arc<AttributeCache>,
    shapes: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl Default for TabularMapper {
    fn default() -> Self {
        Self::new(Arc::new(AttributeCache::new()))
    }
}

impl TabularMapper {
    pub fn new(cache: Arc<AttributeCache>) -> Self {
        Self { cache, shapes: Mutex::new(HashMap::new()) }
    }

    pub fn cache(&self) -> &Arc<AttributeCache> {
        &self.cache
    }

    /// Build and cache the column shape of `T`. Returns `false` if it already existed.
    pub fn register_shape<T: Tabular>(&self) -> bool {
        let mut shapes = self.shapes.lock();
        if shapes.contains_key(&TypeId::of::<T>()) {
            return false;
        }
        let shape = Shape::<T>::build(&self.cache);
        debug!(type_name = shape.type_name, columns = shape.entries.len(), "shape registered");
        shapes.insert(TypeId::of::<T>(), Arc::new(shape));
        true
    }

    pub fn aliases<T: Tabular>(&self) -> Vec<PropertyAlias> {
        self.shape::<T>().aliases()
    }

    /// Every row of `table` as a `T`. See [`to_objects_where`](Self::to_objects_where).
    pub fn to_objects<'a, T: Tabular>(
        &self,
        table: &'a Table,
    ) -> impl Iterator<Item = Result<T>> + 'a {
        self.to_objects_where(table, |_| true)
    }

    /// Rows of `table` accepted by `predicate`, each as a fresh `T`.
    ///
    /// Null cells and columns the table lacks leave the property at its
    /// default. The iterator is lazy; call again to start over.
    pub fn to_objects_where<'a, T, P>(
        &self,
        table: &'a Table,
        mut predicate: P,
    ) -> impl Iterator<Item = Result<T>> + 'a
    where
        T: Tabular,
        P: FnMut(&Row) -> bool + 'a,
    {
        let shape = self.shape::<T>();
        let bindings: Vec<Option<usize>> =
            shape.entries.iter().map(|(meta, _)| table.column_index(&meta.alias)).collect();

        table
            .rows()
            .iter()
            .filter(move |row| predicate(row))
            .map(move |row| read_row(&shape, &bindings, row))
    }

    /// A fresh table named `name` whose columns are `T`'s aliases in shape order.
    pub fn to_table<'a, T: Tabular>(
        &self,
        objects: impl IntoIterator<Item = &'a T>,
        name: &str,
    ) -> Table {
        let shape = self.shape::<T>();
        let mut table = Table::new(name);
        for (meta, _) in &shape.entries {
            table.add_column(meta.alias.clone(), meta.kind);
        }
        for obj in objects {
            table.push_row_unchecked(shape.entries.iter().map(|(_, def)| def.read(obj)).collect());
        }
        table
    }

    /// Append `objects` to an existing table, following its column order.
    ///
    /// A column is filled from the property whose alias and kind both match
    /// it. Columns without such a property receive their kind's zero value.
    /// Returns the number of rows appended.
    pub fn fill_table<'a, T: Tabular>(
        &self,
        objects: impl IntoIterator<Item = &'a T>,
        table: &mut Table,
    ) -> usize {
        let shape = self.shape::<T>();
        let sources: Vec<Option<usize>> = table
            .columns()
            .iter()
            .map(|column| {
                let found = shape
                    .entries
                    .iter()
                    .position(|(meta, _)| meta.alias == column.name && meta.kind == column.kind);
                if found.is_none() {
                    warn!(
                        table = table.name(),
                        column = %column.name,
                        kind = %column.kind,
                        type_name = shape.type_name,
                        "no matching property; writing zero values"
                    );
                }
                found
            })
            .collect();

        let mut appended = 0;
        for obj in objects {
            let row: Row = table
                .columns()
                .iter()
                .zip(&sources)
                .map(|(column, source)| match source {
                    Some(idx) => shape.entries[*idx].1.read(obj),
                    None => Some(Value::zero(column.kind)),
                })
                .collect();
            table.push_row_unchecked(row);
            appended += 1;
        }
        appended
    }

    pub fn clear<T: 'static>(&self) -> bool {
        self.shapes.lock().remove(&TypeId::of::<T>()).is_some()
    }

    pub fn clear_all(&self) {
        self.shapes.lock().clear();
    }

    fn shape<T: Tabular>(&self) -> Arc<Shape<T>> {
        let mut shapes = self.shapes.lock();
        if let Some(existing) = shapes.get(&TypeId::of::<T>()) {
            if let Ok(shape) = Arc::clone(existing).downcast::<Shape<T>>() {
                return shape;
            }
        }
        let shape = Arc::new(Shape::<T>::build(&self.cache));
        debug!(type_name = shape.type_name, columns = shape.entries.len(), "shape registered");
        shapes.insert(TypeId::of::<T>(), shape.clone());
        shape
    }
}

fn read_row<T: Tabular>(shape: &Shape<T>, bindings: &[Option<usize>], row: &Row) -> Result<T> {
    let mut obj = T::default();
    for ((meta, def), binding) in shape.entries.iter().zip(bindings) {
        let Some(Some(value)) = binding.and_then(|idx| row.get(idx)) else {
            continue;
        };
        def.write(&mut obj, value.clone()).map_err(|source| Error::Conversion {
            context: format!("{}.{} <- column '{}'", shape.type_name, meta.property, meta.alias),
            source,
        })?;
    }
    Ok(obj)
}
