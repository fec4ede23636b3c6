//! Host Value Representation
//!
//! [`HostValue`] models every value of the dynamically typed host side of
//! the bridge, including managed objects that crossed over unconverted and
//! the façades that view managed collections.
//!
//! ## Type Hierarchy
//!
//! - `HostValue`: enum covering all host values
//! - `HostList` / `HostDict` / `HostSet`: shared, mutable containers
//! - `HostObject`: opaque object known only by its type name
//! - `DataFrame` / `NdArray`: see the [`frame`](super::frame) and
//!   [`ndarray`](super::ndarray) modules
//!
//! ## Equality
//!
//! `==` follows host rules rather than Rust structural equality: numbers
//! compare across `bool`/`int`/`float`, NaN is unequal to itself, façades
//! compare against native containers, and comparing never fails.

use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use jbridge_jvm::JObject;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive, Zero};
use smol_str::SmolStr;

use crate::adapters::{JavaCollection, JavaIterable, JavaIterator, JavaList, JavaMap, JavaSet};
use crate::error::{BridgeError, BridgeResult};
use crate::host::frame::DataFrame;
use crate::host::ndarray::NdArray;

// ============================================================================
// HostValue
// ============================================================================

/// Any host value.
#[derive(Debug, Clone, Default)]
pub enum HostValue {
    /// `None`
    #[default]
    None,

    /// `bool`
    Bool(bool),

    /// `int` (arbitrary precision)
    Int(BigInt),

    /// `float` (IEEE 754 double)
    Float(f64),

    /// `str`
    Str(SmolStr),

    /// `pathlib.Path`
    Path(PathBuf),

    /// `list`
    List(HostList),

    /// `tuple` (immutable)
    Tuple(Vec<HostValue>),

    /// `dict`
    Dict(HostDict),

    /// `set`
    Set(HostSet),

    /// Dataframe
    Frame(DataFrame),

    /// Fixed-width numeric n-d array
    Array(NdArray),

    /// Opaque host object
    Object(HostObject),

    /// Managed object that was not converted
    Java(JObject),

    /// List-like view of a `java.util.List`
    JavaList(JavaList),

    /// Dict-like view of a `java.util.Map`
    JavaMap(JavaMap),

    /// Set-like view of a `java.util.Set`
    JavaSet(JavaSet),

    /// Sized, iterable view of a `java.util.Collection`
    JavaCollection(JavaCollection),

    /// Iterable view of a `java.lang.Iterable`
    JavaIterable(JavaIterable),

    /// Single-pass view of a `java.util.Iterator`
    JavaIterator(JavaIterator),
}

impl HostValue {
    /// A new list holding `items`
    pub fn list(items: Vec<HostValue>) -> Self {
        HostValue::List(HostList::from_vec(items))
    }

    /// A new dict holding `entries`; later duplicate keys win
    pub fn dict(entries: impl IntoIterator<Item = (HostValue, HostValue)>) -> Self {
        HostValue::Dict(entries.into_iter().collect())
    }

    /// A new set holding `items`; duplicates are dropped
    pub fn set(items: impl IntoIterator<Item = HostValue>) -> Self {
        HostValue::Set(items.into_iter().collect())
    }

    /// A string
    pub fn str(value: impl Into<SmolStr>) -> Self {
        HostValue::Str(value.into())
    }

    /// An integer
    pub fn int(value: impl Into<BigInt>) -> Self {
        HostValue::Int(value.into())
    }

    /// A path
    pub fn path(value: impl AsRef<Path>) -> Self {
        HostValue::Path(value.as_ref().to_path_buf())
    }

    /// Host type name, as shown in conversion errors.
    ///
    /// Managed objects report their class name.
    pub fn type_name(&self) -> String {
        match self {
            HostValue::None => "NoneType".to_string(),
            HostValue::Bool(_) => "bool".to_string(),
            HostValue::Int(_) => "int".to_string(),
            HostValue::Float(_) => "float".to_string(),
            HostValue::Str(_) => "str".to_string(),
            HostValue::Path(_) => "pathlib.Path".to_string(),
            HostValue::List(_) => "list".to_string(),
            HostValue::Tuple(_) => "tuple".to_string(),
            HostValue::Dict(_) => "dict".to_string(),
            HostValue::Set(_) => "set".to_string(),
            HostValue::Frame(_) => "DataFrame".to_string(),
            HostValue::Array(_) => "ndarray".to_string(),
            HostValue::Object(obj) => obj.type_name().to_string(),
            HostValue::Java(obj) => obj.class_name(),
            HostValue::JavaList(_) => "JavaList".to_string(),
            HostValue::JavaMap(_) => "JavaMap".to_string(),
            HostValue::JavaSet(_) => "JavaSet".to_string(),
            HostValue::JavaCollection(_) => "JavaCollection".to_string(),
            HostValue::JavaIterable(_) => "JavaIterable".to_string(),
            HostValue::JavaIterator(_) => "JavaIterator".to_string(),
        }
    }

    /// Check if this value is None
    pub fn is_none(&self) -> bool {
        matches!(self, HostValue::None)
    }

    /// `bool`, `int` or `float`
    pub fn is_number(&self) -> bool {
        matches!(self, HostValue::Bool(_) | HostValue::Int(_) | HostValue::Float(_))
    }

    /// The managed object behind this value, for managed objects and façades
    pub fn as_managed(&self) -> Option<&JObject> {
        match self {
            HostValue::Java(obj) => Some(obj),
            HostValue::JavaList(v) => Some(v.jobj()),
            HostValue::JavaMap(v) => Some(v.jobj()),
            HostValue::JavaSet(v) => Some(v.jobj()),
            HostValue::JavaCollection(v) => Some(v.jobj()),
            HostValue::JavaIterable(v) => Some(v.jobj()),
            HostValue::JavaIterator(v) => Some(v.jobj()),
            _ => None,
        }
    }

    /// Whether this value belongs to the managed runtime
    pub fn is_managed(&self) -> bool {
        self.as_managed().is_some()
    }

    /// Integer value; `bool` counts as an integer, as on the host
    pub fn as_integer(&self) -> Option<BigInt> {
        match self {
            HostValue::Bool(b) => Some(BigInt::from(u8::from(*b))),
            HostValue::Int(n) => Some(n.clone()),
            _ => None,
        }
    }

    /// Try to extract as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to extract as f64 (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            HostValue::Float(f) => Some(*f),
            HostValue::Int(n) => n.to_f64(),
            HostValue::Bool(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }

    /// Try to extract as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to extract as list
    pub fn as_list(&self) -> Option<&HostList> {
        match self {
            HostValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// Try to extract as dict
    pub fn as_dict(&self) -> Option<&HostDict> {
        match self {
            HostValue::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Key/value container
    pub fn is_mapping(&self) -> bool {
        matches!(self, HostValue::Dict(_) | HostValue::JavaMap(_))
    }

    /// Unordered, duplicate-free container
    pub fn is_set_like(&self) -> bool {
        matches!(self, HostValue::Set(_) | HostValue::JavaSet(_))
    }

    /// Anything `for` can walk over
    pub fn is_iterable(&self) -> bool {
        !matches!(
            self,
            HostValue::None
                | HostValue::Bool(_)
                | HostValue::Int(_)
                | HostValue::Float(_)
                | HostValue::Path(_)
                | HostValue::Object(_)
                | HostValue::Java(_)
        )
    }

    /// Host truthiness
    pub fn is_truthy(&self) -> bool {
        match self {
            HostValue::None => false,
            HostValue::Bool(b) => *b,
            HostValue::Int(n) => !n.is_zero(),
            HostValue::Float(f) => *f != 0.0,
            HostValue::Str(s) => !s.is_empty(),
            HostValue::Tuple(items) => !items.is_empty(),
            HostValue::JavaIterable(_) | HostValue::JavaIterator(_) => true,
            HostValue::Path(_) | HostValue::Object(_) => true,
            HostValue::Java(obj) => !obj.is_null(),
            other => other.len().map_or(true, |n| n > 0),
        }
    }

    /// `len(value)`
    pub fn len(&self) -> BridgeResult<usize> {
        match self {
            HostValue::Str(s) => Ok(s.chars().count()),
            HostValue::List(list) => Ok(list.len()),
            HostValue::Tuple(items) => Ok(items.len()),
            HostValue::Dict(dict) => Ok(dict.len()),
            HostValue::Set(set) => Ok(set.len()),
            HostValue::Frame(frame) => Ok(frame.row_count()),
            HostValue::Array(array) => array
                .shape()
                .first()
                .copied()
                .ok_or_else(|| BridgeError::type_mismatch("sized", "0-d ndarray")),
            HostValue::JavaList(v) => v.len(),
            HostValue::JavaMap(v) => v.len(),
            HostValue::JavaSet(v) => v.len(),
            HostValue::JavaCollection(v) => v.len(),
            other => Err(BridgeError::type_mismatch("sized", other.type_name())),
        }
    }

    /// The values `for` would produce.
    ///
    /// Mappings yield their keys; a `JavaIterator` is drained.
    pub fn iter_values(&self) -> BridgeResult<Vec<HostValue>> {
        match self {
            HostValue::Str(s) => Ok(s
                .chars()
                .map(|c| HostValue::Str(c.to_string().into()))
                .collect()),
            HostValue::List(list) => Ok(list.to_vec()),
            HostValue::Tuple(items) => Ok(items.clone()),
            HostValue::Dict(dict) => Ok(dict.keys()),
            HostValue::Set(set) => Ok(set.to_vec()),
            HostValue::Frame(frame) => Ok(frame
                .columns()
                .into_iter()
                .map(|name| HostValue::Str(name.into()))
                .collect()),
            HostValue::Array(array) => array.outer_items(),
            HostValue::JavaList(v) => v.to_vec(),
            HostValue::JavaMap(v) => v.keys()?.to_vec(),
            HostValue::JavaSet(v) => v.to_vec(),
            HostValue::JavaCollection(v) => v.to_vec(),
            HostValue::JavaIterable(v) => v.to_vec(),
            HostValue::JavaIterator(v) => v.clone().collect(),
            other => Err(BridgeError::type_mismatch("iterable", other.type_name())),
        }
    }

    /// `item in value`
    pub fn contains(&self, item: &HostValue) -> BridgeResult<bool> {
        match self {
            HostValue::Str(s) => match item {
                HostValue::Str(needle) => Ok(s.contains(needle.as_str())),
                other => Err(BridgeError::type_mismatch("str", other.type_name())),
            },
            HostValue::List(list) => Ok(list.contains(item)),
            HostValue::Tuple(items) => Ok(items.iter().any(|v| v == item)),
            HostValue::Dict(dict) => Ok(dict.contains_key(item)),
            HostValue::Set(set) => Ok(set.contains(item)),
            HostValue::JavaList(v) => v.contains(item),
            HostValue::JavaMap(v) => v.contains_key(item),
            HostValue::JavaSet(v) => v.contains(item),
            HostValue::JavaCollection(v) => v.contains(item),
            other => Ok(other.iter_values()?.iter().any(|v| v == item)),
        }
    }

    /// `value[key]` for mappings; `Ok(None)` when the key is absent
    pub fn mapping_get(&self, key: &HostValue) -> BridgeResult<Option<HostValue>> {
        match self {
            HostValue::Dict(dict) => Ok(dict.get(key)),
            HostValue::JavaMap(map) => {
                if map.contains_key(key)? {
                    map.get(key).map(Some)
                } else {
                    Ok(None)
                }
            }
            other => Err(BridgeError::type_mismatch("mapping", other.type_name())),
        }
    }

    /// Key/value pairs of a mapping
    pub fn items(&self) -> BridgeResult<Vec<(HostValue, HostValue)>> {
        match self {
            HostValue::Dict(dict) => Ok(dict.items()),
            HostValue::JavaMap(map) => map.items(),
            other => Err(BridgeError::type_mismatch("mapping", other.type_name())),
        }
    }
}

fn numbers_equal(a: &HostValue, b: &HostValue) -> bool {
    match (a, b) {
        (HostValue::Float(x), HostValue::Float(y)) => x == y,
        (HostValue::Float(f), other) | (other, HostValue::Float(f)) => {
            match (other.as_integer(), BigInt::from_f64(*f)) {
                (Some(i), Some(g)) => f.fract() == 0.0 && i == g,
                _ => false,
            }
        }
        _ => a.as_integer() == b.as_integer(),
    }
}

impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        use HostValue as V;
        match (self, other) {
            (V::None, V::None) => true,
            (a, b) if a.is_number() && b.is_number() => numbers_equal(a, b),
            (V::Str(a), V::Str(b)) => a == b,
            (V::Path(a), V::Path(b)) => a == b,
            (V::List(a), V::List(b)) => a.ptr_eq(b) || a.to_vec() == b.to_vec(),
            (V::Tuple(a), V::Tuple(b)) => a == b,
            (V::Dict(a), V::Dict(b)) => a.ptr_eq(b) || a.equals(b),
            (V::Set(a), V::Set(b)) => a.ptr_eq(b) || a.equals(b),
            (V::Frame(a), V::Frame(b)) => a == b,
            (V::Array(a), V::Array(b)) => a == b,
            (V::Object(a), V::Object(b)) => a == b,
            (V::Java(a), V::Java(b)) => a.java_equals(b),
            (V::JavaList(a), b) | (b, V::JavaList(a)) => a.equals(b),
            (V::JavaMap(a), b) | (b, V::JavaMap(a)) => a.equals(b),
            (V::JavaSet(a), b) | (b, V::JavaSet(a)) => a.equals(b),
            (V::JavaCollection(a), b) | (b, V::JavaCollection(a)) => a.equals(b),
            (V::JavaIterable(a), V::JavaIterable(b)) => a.jobj().same_object(b.jobj()),
            (V::JavaIterator(a), V::JavaIterator(b)) => a.jobj().same_object(b.jobj()),
            _ => false,
        }
    }
}

// ============================================================================
// Display (host repr)
// ============================================================================

/// Render a float the way the host's `repr` does.
pub fn float_repr(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let abs = v.abs();
    if abs == 0.0 || (1e-4..1e16).contains(&abs) {
        return format!("{:?}", v);
    }
    let scientific = format!("{:e}", v);
    match scientific.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => scientific,
    }
}

/// Render a string the way the host's `repr` does
pub fn str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = &'a HostValue>,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::None => write!(f, "None"),
            HostValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            HostValue::Int(n) => write!(f, "{}", n),
            HostValue::Float(v) => f.write_str(&float_repr(*v)),
            HostValue::Str(s) => f.write_str(&str_repr(s)),
            HostValue::Path(p) => {
                let kind = if cfg!(windows) { "WindowsPath" } else { "PosixPath" };
                write!(f, "{}({})", kind, str_repr(&p.to_string_lossy()))
            }
            HostValue::List(list) => write!(f, "{}", list),
            HostValue::Tuple(items) => {
                write!(f, "(")?;
                write_joined(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            HostValue::Dict(dict) => write!(f, "{}", dict),
            HostValue::Set(set) => write!(f, "{}", set),
            HostValue::Frame(frame) => write!(f, "{}", frame),
            HostValue::Array(array) => write!(f, "{}", array),
            HostValue::Object(obj) => write!(f, "{}", obj),
            HostValue::Java(obj) => f.write_str(&obj.to_java_string()),
            HostValue::JavaList(v) => write!(f, "{}", v),
            HostValue::JavaMap(v) => write!(f, "{}", v),
            HostValue::JavaSet(v) => write!(f, "{}", v),
            HostValue::JavaCollection(v) => write!(f, "{}", v),
            HostValue::JavaIterable(v) => write!(f, "{}", v),
            HostValue::JavaIterator(v) => write!(f, "{}", v),
        }
    }
}

// ============================================================================
// From impls
// ============================================================================

impl From<JObject> for HostValue {
    /// The managed `null` becomes `None`
    fn from(obj: JObject) -> Self {
        if obj.is_null() {
            HostValue::None
        } else {
            HostValue::Java(obj)
        }
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<i64> for HostValue {
    fn from(n: i64) -> Self {
        HostValue::Int(BigInt::from(n))
    }
}

impl From<i32> for HostValue {
    fn from(n: i32) -> Self {
        HostValue::Int(BigInt::from(n))
    }
}

impl From<BigInt> for HostValue {
    fn from(n: BigInt) -> Self {
        HostValue::Int(n)
    }
}

impl From<f64> for HostValue {
    fn from(v: f64) -> Self {
        HostValue::Float(v)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::Str(s.into())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::Str(s.into())
    }
}

impl From<PathBuf> for HostValue {
    fn from(p: PathBuf) -> Self {
        HostValue::Path(p)
    }
}

impl From<Vec<HostValue>> for HostValue {
    fn from(items: Vec<HostValue>) -> Self {
        HostValue::list(items)
    }
}

// ============================================================================
// HostObject
// ============================================================================

/// Opaque host object, known only by its type name and identity.
#[derive(Debug, Clone)]
pub struct HostObject {
    id: u64,
    type_name: SmolStr,
}

impl HostObject {
    /// Create an object of the given (qualified) type name
    pub fn new(type_name: impl Into<SmolStr>) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            type_name: type_name.into(),
        }
    }

    /// Type name of this object
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Identity of this object
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl PartialEq for HostObject {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} object at {:#x}>", self.type_name, self.id)
    }
}

// ============================================================================
// HostList
// ============================================================================

/// Host `list`: a shared, mutable, ordered sequence.
#[derive(Debug, Clone, Default)]
pub struct HostList {
    items: Rc<RefCell<Vec<HostValue>>>,
}

impl HostList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list from a vector
    pub fn from_vec(items: Vec<HostValue>) -> Self {
        Self {
            items: Rc::new(RefCell::new(items)),
        }
    }

    /// Get the length
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Get an item by index
    pub fn get(&self, index: usize) -> Option<HostValue> {
        self.items.borrow().get(index).cloned()
    }

    /// Replace an item
    pub fn set(&self, index: usize, value: HostValue) -> BridgeResult<()> {
        let mut items = self.items.borrow_mut();
        let len = items.len();
        let slot = items.get_mut(index).ok_or_else(|| {
            BridgeError::custom(format!("list index {} out of range for length {}", index, len))
        })?;
        *slot = value;
        Ok(())
    }

    /// Append an item
    pub fn append(&self, value: HostValue) {
        self.items.borrow_mut().push(value);
    }

    /// Insert at a position (clamped to the end)
    pub fn insert(&self, index: usize, value: HostValue) {
        let mut items = self.items.borrow_mut();
        let index = index.min(items.len());
        items.insert(index, value);
    }

    /// Remove and return the last item
    pub fn pop(&self) -> Option<HostValue> {
        self.items.borrow_mut().pop()
    }

    /// Membership by host equality
    pub fn contains(&self, value: &HostValue) -> bool {
        self.items.borrow().iter().any(|v| v == value)
    }

    /// Copy out the items
    pub fn to_vec(&self) -> Vec<HostValue> {
        self.items.borrow().clone()
    }

    /// Same underlying list
    pub fn ptr_eq(&self, other: &HostList) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }
}

impl fmt::Display for HostList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        write_joined(f, self.items.borrow().iter())?;
        write!(f, "]")
    }
}

impl FromIterator<HostValue> for HostList {
    fn from_iter<I: IntoIterator<Item = HostValue>>(iter: I) -> Self {
        HostList::from_vec(iter.into_iter().collect())
    }
}

// ============================================================================
// HostDict
// ============================================================================

/// Host `dict`: shared, insertion-ordered, keyed by host equality.
#[derive(Debug, Clone, Default)]
pub struct HostDict {
    entries: Rc<RefCell<Vec<(HostValue, HostValue)>>>,
}

impl HostDict {
    /// Create an empty dict
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Look up a key
    pub fn get(&self, key: &HostValue) -> Option<HostValue> {
        self.entries
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Insert or replace; an existing key keeps its position
    pub fn set(&self, key: HostValue, value: HostValue) {
        let mut entries = self.entries.borrow_mut();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => entries.push((key, value)),
        }
    }

    /// Remove a key, returning its value
    pub fn remove(&self, key: &HostValue) -> Option<HostValue> {
        let mut entries = self.entries.borrow_mut();
        let index = entries.iter().position(|(k, _)| k == key)?;
        Some(entries.remove(index).1)
    }

    /// Check whether a key is present
    pub fn contains_key(&self, key: &HostValue) -> bool {
        self.entries.borrow().iter().any(|(k, _)| k == key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> Vec<HostValue> {
        self.entries.borrow().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Values in insertion order
    pub fn values(&self) -> Vec<HostValue> {
        self.entries.borrow().iter().map(|(_, v)| v.clone()).collect()
    }

    /// Entries in insertion order
    pub fn items(&self) -> Vec<(HostValue, HostValue)> {
        self.entries.borrow().clone()
    }

    /// Same underlying dict
    pub fn ptr_eq(&self, other: &HostDict) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }

    fn equals(&self, other: &HostDict) -> bool {
        self.len() == other.len()
            && self
                .items()
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |w| *v == w))
    }
}

impl fmt::Display for HostDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.entries.borrow().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(HostValue, HostValue)> for HostDict {
    fn from_iter<I: IntoIterator<Item = (HostValue, HostValue)>>(iter: I) -> Self {
        let dict = HostDict::new();
        for (k, v) in iter {
            dict.set(k, v);
        }
        dict
    }
}

// ============================================================================
// HostSet
// ============================================================================

/// Host `set`: shared, duplicate-free by host equality.
///
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct HostSet {
    items: Rc<RefCell<Vec<HostValue>>>,
}

impl HostSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of elements
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Add an element; returns false if it was already present
    pub fn add(&self, value: HostValue) -> bool {
        if self.contains(&value) {
            return false;
        }
        self.items.borrow_mut().push(value);
        true
    }

    /// Remove an element; returns whether it was present
    pub fn discard(&self, value: &HostValue) -> bool {
        let mut items = self.items.borrow_mut();
        match items.iter().position(|v| v == value) {
            Some(index) => {
                items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Membership by host equality
    pub fn contains(&self, value: &HostValue) -> bool {
        self.items.borrow().iter().any(|v| v == value)
    }

    /// Copy out the elements
    pub fn to_vec(&self) -> Vec<HostValue> {
        self.items.borrow().clone()
    }

    /// Same underlying set
    pub fn ptr_eq(&self, other: &HostSet) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }

    fn equals(&self, other: &HostSet) -> bool {
        self.len() == other.len() && self.to_vec().iter().all(|v| other.contains(v))
    }
}

impl fmt::Display for HostSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.items.borrow();
        if items.is_empty() {
            return write!(f, "set()");
        }
        write!(f, "{{")?;
        write_joined(f, items.iter())?;
        write!(f, "}}")
    }
}

impl FromIterator<HostValue> for HostSet {
    fn from_iter<I: IntoIterator<Item = HostValue>>(iter: I) -> Self {
        let set = HostSet::new();
        for item in iter {
            set.add(item);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numeric_equality_crosses_types() {
        assert_eq!(HostValue::from(1), HostValue::Float(1.0));
        assert_eq!(HostValue::Bool(true), HostValue::from(1));
        assert_eq!(HostValue::Bool(false), HostValue::Float(0.0));
        assert_ne!(HostValue::from(1), HostValue::Float(1.5));
        assert_ne!(HostValue::Float(f64::NAN), HostValue::Float(f64::NAN));
        assert_ne!(HostValue::from(1), HostValue::str("1"));
    }

    #[test]
    fn test_container_equality() {
        let a = HostValue::list(vec![1.into(), "x".into()]);
        let b = HostValue::list(vec![1.into(), "x".into()]);
        assert_eq!(a, b);
        assert_ne!(a, HostValue::Tuple(vec![1.into(), "x".into()]));

        let s1 = HostValue::set(vec![1.into(), 2.into()]);
        let s2 = HostValue::set(vec![2.into(), 1.into()]);
        assert_eq!(s1, s2);

        let d1 = HostValue::dict(vec![("a".into(), 1.into()), ("b".into(), 2.into())]);
        let d2 = HostValue::dict(vec![("b".into(), 2.into()), ("a".into(), 1.into())]);
        assert_eq!(d1, d2);
    }

    #[test]
    fn test_repr() {
        assert_eq!(HostValue::None.to_string(), "None");
        assert_eq!(HostValue::Bool(true).to_string(), "True");
        assert_eq!(HostValue::Float(1.0).to_string(), "1.0");
        assert_eq!(HostValue::Float(1e16).to_string(), "1e+16");
        assert_eq!(HostValue::Float(1.5e-5).to_string(), "1.5e-05");
        assert_eq!(HostValue::Float(f64::NEG_INFINITY).to_string(), "-inf");
        assert_eq!(HostValue::str("it's").to_string(), "\"it's\"");
        assert_eq!(HostValue::Tuple(vec![1.into()]).to_string(), "(1,)");
        assert_eq!(HostValue::set(Vec::new()).to_string(), "set()");
        assert_eq!(
            HostValue::dict(vec![("a".into(), HostValue::list(vec![1.into(), 2.into()]))])
                .to_string(),
            "{'a': [1, 2]}"
        );
    }

    #[test]
    fn test_shared_mutation() {
        let list = HostList::new();
        let alias = list.clone();
        alias.append(1.into());
        list.insert(0, 0.into());
        assert_eq!(list.to_vec(), vec![HostValue::from(0), HostValue::from(1)]);
        assert!(list.set(5, HostValue::None).is_err());

        let dict = HostDict::new();
        dict.set("k".into(), 1.into());
        dict.set("k".into(), 2.into());
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.remove(&"k".into()), Some(HostValue::from(2)));

        let set = HostSet::new();
        assert!(set.add(1.into()));
        assert!(!set.add(HostValue::Float(1.0)));
        assert!(set.discard(&HostValue::Bool(true)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_protocols() {
        let value = HostValue::dict(vec![("a".into(), 1.into())]);
        assert_eq!(value.len().unwrap(), 1);
        assert_eq!(value.iter_values().unwrap(), vec![HostValue::str("a")]);
        assert!(value.contains(&"a".into()).unwrap());
        assert_eq!(value.mapping_get(&"b".into()).unwrap(), None);
        assert!(HostValue::from(3).len().is_err());
        assert!(HostValue::str("hello").contains(&"ell".into()).unwrap());
        assert!(!HostValue::list(Vec::new()).is_truthy());
        assert_eq!(HostValue::from(JObject::null()), HostValue::None);
    }
}
