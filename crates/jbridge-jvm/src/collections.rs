//! Collection Methods
//!
//! The `Iterable`, `Collection`, `List`, `Set`, `Map` and `Iterator`
//! methods the bridge calls. Each method checks the receiver's class first,
//! so calling `get(int)` on a set fails the way it would in Java rather than
//! silently indexing the backing vector.
//!
//! Iterators walk a snapshot taken when they were created. Map key sets are
//! live views: removing a key through the view removes the entry.

use std::path::Component;

use crate::class::{builtin, names};
use crate::error::{JvmError, JvmResult};
use crate::object::{JObject, ObjectData};

impl JObject {
    fn require(&self, interface: &str, operation: &str) -> JvmResult<()> {
        if self.is_null() {
            return Err(JvmError::null_pointer(operation));
        }
        if self.is_instance_of(interface) {
            Ok(())
        } else {
            Err(self.unsupported(operation))
        }
    }

    /// `ArrayList::new()`
    pub fn array_list() -> Self {
        Self::from_parts(builtin(names::ARRAY_LIST), ObjectData::Elements(Vec::new()))
    }

    /// `LinkedHashSet::new()`
    pub fn linked_hash_set() -> Self {
        Self::from_parts(builtin(names::LINKED_HASH_SET), ObjectData::Elements(Vec::new()))
    }

    /// `LinkedHashMap::new()`
    pub fn linked_hash_map() -> Self {
        Self::from_parts(builtin(names::LINKED_HASH_MAP), ObjectData::Entries(Vec::new()))
    }

    /// `ArrayDeque::new()`
    pub fn array_deque() -> Self {
        Self::from_parts(builtin(names::ARRAY_DEQUE), ObjectData::Elements(Vec::new()))
    }

    /// Current elements of an element-holding collection or key view
    pub(crate) fn elements_snapshot(&self) -> JvmResult<Vec<JObject>> {
        let data = self.data("iterator")?;
        match &*data {
            ObjectData::Elements(items) => Ok(items.clone()),
            ObjectData::KeyView(map) => {
                Ok(map.entries_snapshot()?.into_iter().map(|(k, _)| k).collect())
            }
            _ => Err(self.unsupported("iterator")),
        }
    }

    /// Current entries of a map
    pub(crate) fn entries_snapshot(&self) -> JvmResult<Vec<(JObject, JObject)>> {
        match &*self.data("entrySet")? {
            ObjectData::Entries(entries) => Ok(entries.clone()),
            _ => Err(self.unsupported("entrySet")),
        }
    }

    // ========================================================================
    // Iterable / Iterator
    // ========================================================================

    /// `Iterable.iterator()`
    pub fn iterator(&self) -> JvmResult<JObject> {
        self.require(names::ITERABLE, "iterator")?;
        let components: Option<Vec<JObject>> = match &*self.data("iterator")? {
            ObjectData::Path(path) => Some(
                path.components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(JObject::path(part)),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        };
        let items = match components {
            Some(items) => items,
            None => self.elements_snapshot()?,
        };
        Ok(Self::from_parts(
            builtin(names::ITERATOR_IMPL),
            ObjectData::Cursor { items, position: 0 },
        ))
    }

    /// `Iterator.hasNext()`
    pub fn has_next(&self) -> JvmResult<bool> {
        match &*self.data("hasNext")? {
            ObjectData::Cursor { items, position } => Ok(*position < items.len()),
            _ => Err(self.unsupported("hasNext")),
        }
    }

    /// `Iterator.next()`
    pub fn next_element(&self) -> JvmResult<JObject> {
        match &mut *self.data_mut("next")? {
            ObjectData::Cursor { items, position } => {
                let item = items.get(*position).cloned().ok_or(JvmError::NoSuchElement)?;
                *position += 1;
                Ok(item)
            }
            _ => Err(self.unsupported("next")),
        }
    }

    // ========================================================================
    // Collection
    // ========================================================================

    /// `Collection.size()` or `Map.size()`
    pub fn size(&self) -> JvmResult<usize> {
        if self.is_instance_of(names::MAP) {
            return Ok(self.entries_snapshot()?.len());
        }
        self.require(names::COLLECTION, "size")?;
        if let ObjectData::Elements(items) = &*self.data("size")? {
            return Ok(items.len());
        }
        Ok(self.elements_snapshot()?.len())
    }

    /// `Collection.contains(Object)`
    pub fn contains(&self, value: &JObject) -> JvmResult<bool> {
        self.require(names::COLLECTION, "contains")?;
        if let ObjectData::KeyView(map) = &*self.data("contains")? {
            return map.contains_key(value);
        }
        Ok(self.elements_snapshot()?.iter().any(|e| e.java_equals(value)))
    }

    /// `Collection.add(Object)`.
    ///
    /// Sets refuse duplicates and report `false`.
    pub fn add(&self, value: JObject) -> JvmResult<bool> {
        self.require(names::COLLECTION, "add")?;
        if self.is_instance_of(names::SET) && self.contains(&value)? {
            return Ok(false);
        }
        match &mut *self.data_mut("add")? {
            ObjectData::Elements(items) => {
                items.push(value);
                Ok(true)
            }
            _ => Err(self.unsupported("add")),
        }
    }

    /// `Collection.remove(Object)`: removes the first equal element
    pub fn remove(&self, value: &JObject) -> JvmResult<bool> {
        self.require(names::COLLECTION, "remove")?;
        if let ObjectData::KeyView(map) = &*self.data("remove")? {
            let present = map.contains_key(value)?;
            map.map_remove(value)?;
            return Ok(present);
        }
        let position = self.elements_snapshot()?.iter().position(|e| e.java_equals(value));
        let Some(position) = position else {
            return Ok(false);
        };
        match &mut *self.data_mut("remove")? {
            ObjectData::Elements(items) => {
                items.remove(position);
                Ok(true)
            }
            _ => Err(self.unsupported("remove")),
        }
    }

    /// `Collection.clear()` or `Map.clear()`
    pub fn clear(&self) -> JvmResult<()> {
        match &mut *self.data_mut("clear")? {
            ObjectData::Elements(items) if self.is_instance_of(names::COLLECTION) => {
                items.clear();
                Ok(())
            }
            ObjectData::Entries(entries) => {
                entries.clear();
                Ok(())
            }
            _ => Err(self.unsupported("clear")),
        }
    }

    // ========================================================================
    // List
    // ========================================================================

    /// `List.get(int)`
    pub fn get(&self, index: usize) -> JvmResult<JObject> {
        self.require(names::LIST, "get")?;
        match &*self.data("get")? {
            ObjectData::Elements(items) => items
                .get(index)
                .cloned()
                .ok_or_else(|| JvmError::index_out_of_bounds(index, items.len())),
            _ => Err(self.unsupported("get")),
        }
    }

    /// `List.set(int, Object)`: returns the previous element
    pub fn set(&self, index: usize, value: JObject) -> JvmResult<JObject> {
        self.require(names::LIST, "set")?;
        match &mut *self.data_mut("set")? {
            ObjectData::Elements(items) => {
                let len = items.len();
                let slot = items
                    .get_mut(index)
                    .ok_or_else(|| JvmError::index_out_of_bounds(index, len))?;
                Ok(std::mem::replace(slot, value))
            }
            _ => Err(self.unsupported("set")),
        }
    }

    /// `List.remove(int)`: returns the removed element
    pub fn remove_at(&self, index: usize) -> JvmResult<JObject> {
        self.require(names::LIST, "remove")?;
        match &mut *self.data_mut("remove")? {
            ObjectData::Elements(items) if index < items.len() => Ok(items.remove(index)),
            ObjectData::Elements(items) => Err(JvmError::index_out_of_bounds(index, items.len())),
            _ => Err(self.unsupported("remove")),
        }
    }

    // ========================================================================
    // Map
    // ========================================================================

    fn entry_position(&self, key: &JObject) -> JvmResult<Option<usize>> {
        Ok(self
            .entries_snapshot()?
            .iter()
            .position(|(k, _)| k.java_equals(key)))
    }

    /// `Map.get(Object)`: null when absent
    pub fn map_get(&self, key: &JObject) -> JvmResult<JObject> {
        self.require(names::MAP, "get")?;
        let entries = self.entries_snapshot()?;
        Ok(entries
            .into_iter()
            .find(|(k, _)| k.java_equals(key))
            .map(|(_, v)| v)
            .unwrap_or_default())
    }

    /// `Map.put(Object, Object)`: returns the previous value or null
    pub fn put(&self, key: JObject, value: JObject) -> JvmResult<JObject> {
        self.require(names::MAP, "put")?;
        let position = self.entry_position(&key)?;
        match &mut *self.data_mut("put")? {
            ObjectData::Entries(entries) => match position {
                Some(i) => Ok(std::mem::replace(&mut entries[i].1, value)),
                None => {
                    entries.push((key, value));
                    Ok(JObject::null())
                }
            },
            _ => Err(self.unsupported("put")),
        }
    }

    /// `Map.remove(Object)`: returns the removed value or null
    pub fn map_remove(&self, key: &JObject) -> JvmResult<JObject> {
        self.require(names::MAP, "remove")?;
        let Some(position) = self.entry_position(key)? else {
            return Ok(JObject::null());
        };
        match &mut *self.data_mut("remove")? {
            ObjectData::Entries(entries) => Ok(entries.remove(position).1),
            _ => Err(self.unsupported("remove")),
        }
    }

    /// `Map.containsKey(Object)`
    pub fn contains_key(&self, key: &JObject) -> JvmResult<bool> {
        self.require(names::MAP, "containsKey")?;
        Ok(self.entry_position(key)?.is_some())
    }

    /// `Map.keySet()`: a live view over the map's keys
    pub fn key_set(&self) -> JvmResult<JObject> {
        self.require(names::MAP, "keySet")?;
        Ok(Self::from_parts(
            builtin(names::KEY_SET_VIEW),
            ObjectData::KeyView(self.clone()),
        ))
    }
}
