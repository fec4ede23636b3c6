//! Collection Façades
//!
//! Host-side views over managed collections. A façade holds one managed
//! reference and nothing else: every operation is forwarded to the managed
//! object, with arguments passed through `to_managed` and results through
//! `to_host`. Writes through a façade are visible to every other holder of
//! the managed object, and vice versa.
//!
//! ## Façades
//!
//! | Façade           | Wraps                 | Surface                              |
//! |------------------|-----------------------|--------------------------------------|
//! | `JavaIterable`   | `java.lang.Iterable`  | iteration                            |
//! | `JavaCollection` | `java.util.Collection`| + length, containment, equality      |
//! | `JavaList`       | `java.util.List`      | + indexed get/set/delete             |
//! | `JavaSet`        | `java.util.Set`       | + add/discard                        |
//! | `JavaMap`        | `java.util.Map`       | keyed get/set/delete, keys, items    |
//! | `JavaIterator`   | `java.util.Iterator`  | single-pass `next`                   |
//!
//! Element reads are gentle: an element with no host equivalent comes back
//! as the managed object itself instead of failing the read.
//!
//! Equality never fails. Comparing against something without a length, or
//! whose elements cannot be compared, is simply unequal.

use std::fmt;

use jbridge_jvm::JObject;

use crate::error::{BridgeError, BridgeResult};
use crate::hints::Hints;
use crate::host::value::HostValue;
use crate::registry::{to_host, to_managed};

fn require(jobj: &JObject, interface: &str) -> BridgeResult<()> {
    if jobj.is_instance_of(interface) {
        Ok(())
    } else {
        Err(BridgeError::type_mismatch(
            format!("a {}", interface),
            jobj.class_name(),
        ))
    }
}

fn managed(value: &HostValue) -> BridgeResult<JObject> {
    to_managed(value, &Hints::new())
}

fn host(obj: JObject, gentle: bool) -> BridgeResult<HostValue> {
    to_host(&HostValue::from(obj), gentle)
}

/// Gently converted elements of a managed `Iterable`
fn elements(jobj: &JObject) -> BridgeResult<Vec<HostValue>> {
    JavaIterator::new(jobj.iterator()?)?.collect()
}

/// `[a, b]` / `{a, b}` rendering of an iterable, or its `toString` when
/// iteration fails
fn fmt_elements(
    f: &mut fmt::Formatter<'_>,
    jobj: &JObject,
    open: &str,
    close: &str,
) -> fmt::Result {
    let Ok(items) = elements(jobj) else {
        return f.write_str(&jobj.to_java_string());
    };
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str(close)
}

macro_rules! facade {
    ($(#[$meta:meta])* $name:ident, $interface:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            jobj: JObject,
        }

        impl $name {
            #[doc = concat!("View a managed object; fails unless it implements `", $interface, "`")]
            pub fn new(jobj: JObject) -> BridgeResult<Self> {
                require(&jobj, $interface)?;
                Ok(Self { jobj })
            }

            /// The wrapped managed object
            pub fn jobj(&self) -> &JObject {
                &self.jobj
            }
        }
    };
}

// ============================================================================
// JavaIterable
// ============================================================================

facade!(
    /// Iteration-only view of a `java.lang.Iterable`.
    JavaIterable,
    "java.lang.Iterable"
);

impl JavaIterable {
    /// A fresh iterator over the elements
    pub fn iter(&self) -> BridgeResult<JavaIterator> {
        JavaIterator::new(self.jobj.iterator()?)
    }

    /// Elements, gently converted
    pub fn to_vec(&self) -> BridgeResult<Vec<HostValue>> {
        elements(&self.jobj)
    }
}

impl fmt::Display for JavaIterable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_elements(f, &self.jobj, "[", "]")
    }
}

// ============================================================================
// JavaCollection
// ============================================================================

facade!(
    /// Sized, iterable view of a `java.util.Collection`.
    JavaCollection,
    "java.util.Collection"
);

impl JavaCollection {
    /// `len(collection)`
    pub fn len(&self) -> BridgeResult<usize> {
        Ok(self.jobj.size()?)
    }

    /// Check if empty
    pub fn is_empty(&self) -> BridgeResult<bool> {
        Ok(self.len()? == 0)
    }

    /// `item in collection`, by the managed `contains`
    pub fn contains(&self, item: &HostValue) -> BridgeResult<bool> {
        Ok(self.jobj.contains(&managed(item)?)?)
    }

    /// A fresh iterator over the elements
    pub fn iter(&self) -> BridgeResult<JavaIterator> {
        JavaIterator::new(self.jobj.iterator()?)
    }

    /// Elements, gently converted
    pub fn to_vec(&self) -> BridgeResult<Vec<HostValue>> {
        elements(&self.jobj)
    }

    /// Same length and pairwise equal elements, in iteration order
    pub fn equals(&self, other: &HostValue) -> bool {
        sequence_equals(&self.jobj, other).unwrap_or(false)
    }
}

fn sequence_equals(jobj: &JObject, other: &HostValue) -> BridgeResult<bool> {
    if jobj.size()? != other.len()? {
        return Ok(false);
    }
    let mine = elements(jobj)?;
    let theirs = other.iter_values()?;
    Ok(mine.iter().zip(&theirs).all(|(a, b)| a == b))
}

impl fmt::Display for JavaCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_elements(f, &self.jobj, "[", "]")
    }
}

// ============================================================================
// JavaList
// ============================================================================

facade!(
    /// Mutable sequence view of a `java.util.List`.
    JavaList,
    "java.util.List"
);

impl JavaList {
    /// `len(list)`
    pub fn len(&self) -> BridgeResult<usize> {
        Ok(self.jobj.size()?)
    }

    /// Check if empty
    pub fn is_empty(&self) -> BridgeResult<bool> {
        Ok(self.len()? == 0)
    }

    /// `list[index]`
    pub fn get(&self, index: usize) -> BridgeResult<HostValue> {
        host(self.jobj.get(index)?, true)
    }

    /// `list[index] = value`; returns the element that was replaced
    pub fn set(&self, index: usize, value: &HostValue) -> BridgeResult<HostValue> {
        host(self.jobj.set(index, managed(value)?)?, true)
    }

    /// `del list[index]`; returns the removed element
    pub fn delete(&self, index: usize) -> BridgeResult<HostValue> {
        host(self.jobj.remove_at(index)?, true)
    }

    /// Overwrites the element at `index`; the length does not change.
    ///
    /// This is `set` under another name, not a positional insert. Use
    /// [`JavaList::push`] to grow the list.
    pub fn insert(&self, index: usize, value: &HostValue) -> BridgeResult<HostValue> {
        self.set(index, value)
    }

    /// Append to the end
    pub fn push(&self, value: &HostValue) -> BridgeResult<()> {
        self.jobj.add(managed(value)?)?;
        Ok(())
    }

    /// Remove the first element equal to `value`; returns whether one was found
    pub fn remove(&self, value: &HostValue) -> BridgeResult<bool> {
        Ok(self.jobj.remove(&managed(value)?)?)
    }

    /// `value in list`
    pub fn contains(&self, value: &HostValue) -> BridgeResult<bool> {
        Ok(self.jobj.contains(&managed(value)?)?)
    }

    /// A fresh iterator over the elements
    pub fn iter(&self) -> BridgeResult<JavaIterator> {
        JavaIterator::new(self.jobj.iterator()?)
    }

    /// Elements, gently converted
    pub fn to_vec(&self) -> BridgeResult<Vec<HostValue>> {
        elements(&self.jobj)
    }

    /// Same length and pairwise equal elements
    pub fn equals(&self, other: &HostValue) -> bool {
        sequence_equals(&self.jobj, other).unwrap_or(false)
    }
}

impl fmt::Display for JavaList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_elements(f, &self.jobj, "[", "]")
    }
}

// ============================================================================
// JavaSet
// ============================================================================

facade!(
    /// Mutable set view of a `java.util.Set`.
    JavaSet,
    "java.util.Set"
);

impl JavaSet {
    /// `len(set)`
    pub fn len(&self) -> BridgeResult<usize> {
        Ok(self.jobj.size()?)
    }

    /// Check if empty
    pub fn is_empty(&self) -> BridgeResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Add an element; false if it was already present
    pub fn add(&self, item: &HostValue) -> BridgeResult<bool> {
        Ok(self.jobj.add(managed(item)?)?)
    }

    /// Remove an element; false if it was absent
    pub fn discard(&self, item: &HostValue) -> BridgeResult<bool> {
        Ok(self.jobj.remove(&managed(item)?)?)
    }

    /// `item in set`
    pub fn contains(&self, item: &HostValue) -> BridgeResult<bool> {
        Ok(self.jobj.contains(&managed(item)?)?)
    }

    /// A fresh iterator over the elements
    pub fn iter(&self) -> BridgeResult<JavaIterator> {
        JavaIterator::new(self.jobj.iterator()?)
    }

    /// Elements, gently converted
    pub fn to_vec(&self) -> BridgeResult<Vec<HostValue>> {
        elements(&self.jobj)
    }

    /// Same size and every element of this set is in `other`
    pub fn equals(&self, other: &HostValue) -> bool {
        self.membership_equals(other).unwrap_or(false)
    }

    fn membership_equals(&self, other: &HostValue) -> BridgeResult<bool> {
        if self.len()? != other.len()? {
            return Ok(false);
        }
        for item in self.to_vec()? {
            if !other.contains(&item)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl fmt::Display for JavaSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_elements(f, &self.jobj, "{", "}")
    }
}

// ============================================================================
// JavaMap
// ============================================================================

facade!(
    /// Mutable mapping view of a `java.util.Map`.
    JavaMap,
    "java.util.Map"
);

impl JavaMap {
    /// `len(map)`
    pub fn len(&self) -> BridgeResult<usize> {
        Ok(self.jobj.size()?)
    }

    /// Check if empty
    pub fn is_empty(&self) -> BridgeResult<bool> {
        Ok(self.len()? == 0)
    }

    /// `map[key]`; an absent key reads as `None`, as `Map.get` does
    pub fn get(&self, key: &HostValue) -> BridgeResult<HostValue> {
        host(self.jobj.map_get(&managed(key)?)?, true)
    }

    /// `map[key] = value`; returns the previous value
    pub fn set(&self, key: &HostValue, value: &HostValue) -> BridgeResult<HostValue> {
        host(self.jobj.put(managed(key)?, managed(value)?)?, true)
    }

    /// `del map[key]`; returns the removed value
    pub fn delete(&self, key: &HostValue) -> BridgeResult<HostValue> {
        host(self.jobj.map_remove(&managed(key)?)?, true)
    }

    /// `key in map`
    pub fn contains_key(&self, key: &HostValue) -> BridgeResult<bool> {
        Ok(self.jobj.contains_key(&managed(key)?)?)
    }

    /// Live view of the keys
    pub fn keys(&self) -> BridgeResult<JavaSet> {
        JavaSet::new(self.jobj.key_set()?)
    }

    /// Values, in key order
    pub fn values(&self) -> BridgeResult<Vec<HostValue>> {
        Ok(self.items()?.into_iter().map(|(_, v)| v).collect())
    }

    /// Key/value pairs, in key order
    pub fn items(&self) -> BridgeResult<Vec<(HostValue, HostValue)>> {
        self.keys()?
            .to_vec()?
            .into_iter()
            .map(|k| -> BridgeResult<(HostValue, HostValue)> {
                let v = self.get(&k)?;
                Ok((k, v))
            })
            .collect()
    }

    /// Same size, and every key maps to an equal value in `other`
    pub fn equals(&self, other: &HostValue) -> bool {
        self.entries_equal(other).unwrap_or(false)
    }

    fn entries_equal(&self, other: &HostValue) -> BridgeResult<bool> {
        if self.len()? != other.len()? {
            return Ok(false);
        }
        for (k, v) in self.items()? {
            match other.mapping_get(&k)? {
                Some(theirs) if theirs == v => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }
}

impl fmt::Display for JavaMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(items) = self.items() else {
            return f.write_str(&self.jobj.to_java_string());
        };
        write!(f, "{{")?;
        for (i, (k, v)) in items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}

// ============================================================================
// JavaIterator
// ============================================================================

facade!(
    /// Single-pass view of a `java.util.Iterator`.
    ///
    /// Clones share the managed cursor, so advancing one advances all.
    JavaIterator,
    "java.util.Iterator"
);

impl JavaIterator {
    /// The next element, gently converted; `Ok(None)` once spent
    pub fn next_value(&self) -> BridgeResult<Option<HostValue>> {
        if !self.jobj.has_next()? {
            return Ok(None);
        }
        host(self.jobj.next_element()?, true).map(Some)
    }
}

impl Iterator for JavaIterator {
    type Item = BridgeResult<HostValue>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_value().transpose()
    }
}

impl fmt::Display for JavaIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.jobj.to_java_string())
    }
}
