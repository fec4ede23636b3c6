//! Managed Objects
//!
//! [`JObject`] is a nullable reference to a managed object. Cloning a
//! reference never copies the object: two clones observe each other's
//! mutations, exactly like two Java variables holding the same reference.
//!
//! ## Object State
//!
//! The payload of an object depends on its class:
//!
//! | Class family                    | Payload                    |
//! |---------------------------------|----------------------------|
//! | boxed primitives, raw primitives| [`Primitive`]              |
//! | `String`                        | string contents            |
//! | `BigInteger` / `BigDecimal`     | arbitrary precision number |
//! | lists, sets, deques, iterables  | element vector             |
//! | maps                            | ordered entry vector       |
//! | arrays                          | raw bytes or references    |
//! | tables                          | column store               |
//!
//! Objects are single-threaded (`Rc` + `RefCell`), matching the
//! thread-affinity of a JNI local reference.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use smol_str::SmolStr;

use crate::class::{builtin, names, primitive_class, JClass};
use crate::error::{JvmError, JvmResult};
use crate::primitive::{Primitive, PrimitiveKind};
use crate::table::TableData;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// State held by a managed object.
#[derive(Debug, Clone)]
pub(crate) enum ObjectData {
    /// No state beyond identity
    Plain,
    /// Boxed or raw primitive; the class tells which
    Scalar(Primitive),
    /// `java.lang.String`
    Str(SmolStr),
    /// `java.math.BigInteger`
    BigInteger(BigInt),
    /// `java.math.BigDecimal`
    BigDecimal(BigDecimal),
    /// Lists, sets, deques and other element-holding iterables
    Elements(Vec<JObject>),
    /// Maps, in insertion order
    Entries(Vec<(JObject, JObject)>),
    /// Live key-set view of a map
    KeyView(JObject),
    /// Iterator over a snapshot
    Cursor { items: Vec<JObject>, position: usize },
    /// `java.nio.file.Path`
    Path(PathBuf),
    /// Primitive array, native-endian element bytes
    PrimitiveArray { kind: PrimitiveKind, bytes: Vec<u8> },
    /// Reference array
    ObjectArray(Vec<JObject>),
    /// Column store
    Table(TableData),
}

pub(crate) struct ObjectInner {
    id: u64,
    class: JClass,
    data: RefCell<ObjectData>,
}

/// A nullable reference to a managed object.
#[derive(Clone, Default)]
pub struct JObject {
    inner: Option<Rc<ObjectInner>>,
}

impl JObject {
    pub(crate) fn from_parts(class: JClass, data: ObjectData) -> Self {
        JObject {
            inner: Some(Rc::new(ObjectInner {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                class,
                data: RefCell::new(data),
            })),
        }
    }

    /// The null reference
    pub fn null() -> Self {
        JObject { inner: None }
    }

    /// Check for the null reference
    pub fn is_null(&self) -> bool {
        self.inner.is_none()
    }

    /// Identity hash of the object (0 for null)
    pub fn id(&self) -> u64 {
        self.inner.as_ref().map_or(0, |inner| inner.id)
    }

    /// Reference equality (Java `==`)
    pub fn same_object(&self, other: &JObject) -> bool {
        match (&self.inner, &other.inner) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    pub(crate) fn inner(&self, context: &str) -> JvmResult<&ObjectInner> {
        self.inner
            .as_deref()
            .ok_or_else(|| JvmError::null_pointer(context))
    }

    pub(crate) fn data(&self, context: &str) -> JvmResult<Ref<'_, ObjectData>> {
        Ok(self.inner(context)?.data.borrow())
    }

    pub(crate) fn data_mut(&self, context: &str) -> JvmResult<RefMut<'_, ObjectData>> {
        Ok(self.inner(context)?.data.borrow_mut())
    }

    pub(crate) fn unsupported(&self, operation: &str) -> JvmError {
        JvmError::unsupported(operation, self.class_name())
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    /// Box a primitive value (`Integer.valueOf` and friends)
    pub fn boxed(value: Primitive) -> Self {
        Self::from_parts(builtin(value.kind().boxed_class_name()), ObjectData::Scalar(value))
    }

    /// A raw primitive value, as surfaced by array element access
    pub fn primitive(value: Primitive) -> Self {
        Self::from_parts(primitive_class(value.kind()), ObjectData::Scalar(value))
    }

    pub fn boolean(value: bool) -> Self {
        Self::boxed(Primitive::Boolean(value))
    }

    pub fn byte(value: i8) -> Self {
        Self::boxed(Primitive::Byte(value))
    }

    pub fn short(value: i16) -> Self {
        Self::boxed(Primitive::Short(value))
    }

    pub fn integer(value: i32) -> Self {
        Self::boxed(Primitive::Int(value))
    }

    pub fn long(value: i64) -> Self {
        Self::boxed(Primitive::Long(value))
    }

    pub fn float(value: f32) -> Self {
        Self::boxed(Primitive::Float(value))
    }

    pub fn double(value: f64) -> Self {
        Self::boxed(Primitive::Double(value))
    }

    /// A `java.lang.Character` holding one UTF-16 code unit
    pub fn character(value: u16) -> Self {
        Self::boxed(Primitive::Char(value))
    }

    /// A `java.lang.String`
    pub fn string(value: impl Into<SmolStr>) -> Self {
        Self::from_parts(builtin(names::STRING), ObjectData::Str(value.into()))
    }

    /// A `java.math.BigInteger`
    pub fn big_integer(value: BigInt) -> Self {
        Self::from_parts(builtin(names::BIG_INTEGER), ObjectData::BigInteger(value))
    }

    /// `new BigInteger(String)`
    pub fn big_integer_from_str(text: &str) -> JvmResult<Self> {
        BigInt::from_str(text.trim())
            .map(Self::big_integer)
            .map_err(|_| JvmError::number_format(text, names::BIG_INTEGER))
    }

    /// A `java.math.BigDecimal`
    pub fn big_decimal(value: BigDecimal) -> Self {
        Self::from_parts(builtin(names::BIG_DECIMAL), ObjectData::BigDecimal(value))
    }

    /// `new BigDecimal(String)`
    pub fn big_decimal_from_str(text: &str) -> JvmResult<Self> {
        BigDecimal::from_str(text.trim())
            .map(Self::big_decimal)
            .map_err(|_| JvmError::number_format(text, names::BIG_DECIMAL))
    }

    /// `Paths.get(path)`
    pub fn path(path: impl AsRef<Path>) -> Self {
        Self::from_parts(
            builtin(names::UNIX_PATH),
            ObjectData::Path(path.as_ref().to_path_buf()),
        )
    }

    /// `new java.lang.Object()`
    pub fn new_object() -> Self {
        Self::from_parts(builtin(names::OBJECT), ObjectData::Plain)
    }

    /// Instantiate a class through its no-argument constructor.
    ///
    /// Classes implementing `Map` get map storage, other `Iterable`s get
    /// element storage, everything else carries identity only.
    pub fn new_instance(class: &JClass) -> JvmResult<Self> {
        if class.is_interface() || class.is_array() || class.is_primitive() {
            return Err(JvmError::illegal_argument(format!(
                "cannot instantiate {}",
                class
            )));
        }
        let data = if class.is_subtype_of(names::MAP) {
            ObjectData::Entries(Vec::new())
        } else if class.is_subtype_of(names::ITERABLE) {
            ObjectData::Elements(Vec::new())
        } else {
            ObjectData::Plain
        };
        Ok(Self::from_parts(class.clone(), data))
    }

    // ========================================================================
    // Class Queries
    // ========================================================================

    /// `getClass()`
    pub fn get_class(&self) -> JvmResult<JClass> {
        Ok(self.inner("getClass")?.class.clone())
    }

    /// Class name, or `"null"` for the null reference
    pub fn class_name(&self) -> String {
        match &self.inner {
            Some(inner) => inner.class.name().to_string(),
            None => "null".to_string(),
        }
    }

    /// Java `instanceof`: false for null
    pub fn instance_of(&self, class: &JClass) -> bool {
        match &self.inner {
            Some(inner) => class.is_assignable_from(&inner.class),
            None => false,
        }
    }

    /// `instanceof` against a type name
    pub fn is_instance_of(&self, name: &str) -> bool {
        match &self.inner {
            Some(inner) => inner.class.is_subtype_of(name),
            None => false,
        }
    }

    // ========================================================================
    // Value Extraction
    // ========================================================================

    /// The primitive held by a boxed or raw primitive object
    pub fn primitive_value(&self) -> JvmResult<Primitive> {
        match &*self.data("primitiveValue")? {
            ObjectData::Scalar(p) => Ok(*p),
            _ => Err(self.unsupported("primitiveValue")),
        }
    }

    /// `booleanValue()`
    pub fn boolean_value(&self) -> JvmResult<bool> {
        match self.primitive_value()? {
            Primitive::Boolean(b) => Ok(b),
            _ => Err(self.unsupported("booleanValue")),
        }
    }

    /// `charValue()`
    pub fn char_value(&self) -> JvmResult<u16> {
        match self.primitive_value()? {
            Primitive::Char(c) => Ok(c),
            _ => Err(self.unsupported("charValue")),
        }
    }

    /// `longValue()` of an integral primitive
    pub fn long_value(&self) -> JvmResult<i64> {
        match &*self.data("longValue")? {
            ObjectData::Scalar(p) => p.as_i64().ok_or_else(|| self.unsupported("longValue")),
            _ => Err(self.unsupported("longValue")),
        }
    }

    /// `doubleValue()` of any numeric primitive
    pub fn double_value(&self) -> JvmResult<f64> {
        match &*self.data("doubleValue")? {
            ObjectData::Scalar(p) => p
                .as_f64()
                .or_else(|| p.as_i64().map(|i| i as f64))
                .ok_or_else(|| self.unsupported("doubleValue")),
            _ => Err(self.unsupported("doubleValue")),
        }
    }

    /// Contents of a `java.lang.String`
    pub fn string_value(&self) -> JvmResult<String> {
        match &*self.data("toString")? {
            ObjectData::Str(s) => Ok(s.to_string()),
            _ => Err(self.unsupported("string contents")),
        }
    }

    /// Value of a `java.math.BigInteger`
    pub fn big_integer_value(&self) -> JvmResult<BigInt> {
        match &*self.data("toBigInteger")? {
            ObjectData::BigInteger(v) => Ok(v.clone()),
            _ => Err(self.unsupported("toBigInteger")),
        }
    }

    /// Value of a `java.math.BigDecimal`
    pub fn big_decimal_value(&self) -> JvmResult<BigDecimal> {
        match &*self.data("toBigDecimal")? {
            ObjectData::BigDecimal(v) => Ok(v.clone()),
            _ => Err(self.unsupported("toBigDecimal")),
        }
    }

    /// Filesystem path of a `java.nio.file.Path`
    pub fn path_value(&self) -> JvmResult<PathBuf> {
        match &*self.data("toFile")? {
            ObjectData::Path(p) => Ok(p.clone()),
            _ => Err(self.unsupported("toFile")),
        }
    }

    // ========================================================================
    // Object Methods
    // ========================================================================

    /// `Objects.equals(self, other)`
    pub fn java_equals(&self, other: &JObject) -> bool {
        if self.same_object(other) {
            return true;
        }
        let (Some(a), Some(b)) = (&self.inner, &other.inner) else {
            return false;
        };

        if a.class.is_subtype_of(names::LIST) && b.class.is_subtype_of(names::LIST) {
            return match (self.elements_snapshot(), other.elements_snapshot()) {
                (Ok(x), Ok(y)) => {
                    x.len() == y.len() && x.iter().zip(&y).all(|(l, r)| l.java_equals(r))
                }
                _ => false,
            };
        }
        if a.class.is_subtype_of(names::SET) && b.class.is_subtype_of(names::SET) {
            return match (self.elements_snapshot(), other.elements_snapshot()) {
                (Ok(x), Ok(y)) => {
                    x.len() == y.len() && x.iter().all(|l| y.iter().any(|r| l.java_equals(r)))
                }
                _ => false,
            };
        }
        if a.class.is_subtype_of(names::MAP) && b.class.is_subtype_of(names::MAP) {
            return match (self.entries_snapshot(), other.entries_snapshot()) {
                (Ok(x), Ok(y)) => {
                    x.len() == y.len()
                        && x.iter().all(|(k, v)| {
                            y.iter().any(|(k2, v2)| k.java_equals(k2) && v.java_equals(v2))
                        })
                }
                _ => false,
            };
        }
        if a.class != b.class {
            return false;
        }

        let (x, y) = (a.data.borrow(), b.data.borrow());
        match (&*x, &*y) {
            (ObjectData::Scalar(p), ObjectData::Scalar(q)) => scalar_equals(p, q),
            (ObjectData::Str(p), ObjectData::Str(q)) => p == q,
            (ObjectData::BigInteger(p), ObjectData::BigInteger(q)) => p == q,
            (ObjectData::BigDecimal(p), ObjectData::BigDecimal(q)) => p == q,
            (ObjectData::Path(p), ObjectData::Path(q)) => p == q,
            _ => false,
        }
    }

    /// `toString()`, with `"null"` for the null reference
    pub fn to_java_string(&self) -> String {
        self.to_string()
    }
}

/// Boxed equality compares bit patterns for floating values, so `NaN`
/// equals itself and `0.0` differs from `-0.0`.
fn scalar_equals(p: &Primitive, q: &Primitive) -> bool {
    match (p, q) {
        (Primitive::Float(a), Primitive::Float(b)) => a.to_bits() == b.to_bits(),
        (Primitive::Double(a), Primitive::Double(b)) => a.to_bits() == b.to_bits(),
        _ => p == q,
    }
}

impl From<bool> for JObject {
    fn from(value: bool) -> Self {
        JObject::boolean(value)
    }
}

impl From<i32> for JObject {
    fn from(value: i32) -> Self {
        JObject::integer(value)
    }
}

impl From<i64> for JObject {
    fn from(value: i64) -> Self {
        JObject::long(value)
    }
}

impl From<f64> for JObject {
    fn from(value: f64) -> Self {
        JObject::double(value)
    }
}

impl From<&str> for JObject {
    fn from(value: &str) -> Self {
        JObject::string(value)
    }
}

impl fmt::Display for JObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(inner) = &self.inner else {
            return f.write_str("null");
        };
        let data = match inner.data.try_borrow() {
            Ok(data) => data,
            Err(_) => return write!(f, "{}@{:x}", inner.class.name(), inner.id),
        };
        match &*data {
            ObjectData::Scalar(p) => write!(f, "{}", p),
            ObjectData::Str(s) => f.write_str(s),
            ObjectData::BigInteger(v) => write!(f, "{}", v),
            ObjectData::BigDecimal(v) => write!(f, "{}", v),
            ObjectData::Path(p) => write!(f, "{}", p.display()),
            ObjectData::Elements(items) => write_sequence(f, items),
            ObjectData::KeyView(map) => match map.entries_snapshot() {
                Ok(entries) => {
                    let keys: Vec<JObject> = entries.into_iter().map(|(k, _)| k).collect();
                    write_sequence(f, &keys)
                }
                Err(_) => f.write_str("[]"),
            },
            ObjectData::Entries(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                f.write_str("}")
            }
            ObjectData::Plain
            | ObjectData::Cursor { .. }
            | ObjectData::PrimitiveArray { .. }
            | ObjectData::ObjectArray(_)
            | ObjectData::Table(_) => write!(f, "{}@{:x}", inner.class.name(), inner.id),
        }
    }
}

fn write_sequence(f: &mut fmt::Formatter<'_>, items: &[JObject]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str("]")
}

impl fmt::Debug for JObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(inner) => write!(f, "JObject({}: {})", inner.class.name(), self),
            None => f.write_str("JObject(null)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_null_reference() {
        let null = JObject::null();
        assert!(null.is_null());
        assert_eq!(null.to_java_string(), "null");
        assert!(null.java_equals(&JObject::null()));
        assert!(matches!(null.get_class(), Err(JvmError::NullPointer { .. })));
        assert!(!null.is_instance_of(names::OBJECT));
    }

    #[test]
    fn test_boxed_values() {
        let five = JObject::integer(5);
        assert_eq!(five.class_name(), names::INTEGER);
        assert!(five.is_instance_of(names::NUMBER));
        assert_eq!(five.long_value().unwrap(), 5);
        assert_eq!(five.double_value().unwrap(), 5.0);
        assert!(five.boolean_value().is_err());
        assert_eq!(JObject::double(5.0).to_java_string(), "5.0");
        assert_eq!(JObject::float(0.1).to_java_string(), "0.1");
    }

    #[test]
    fn test_raw_primitive_class() {
        let raw = JObject::primitive(Primitive::Short(3));
        assert_eq!(raw.class_name(), "short");
        assert!(!raw.is_instance_of(names::OBJECT));
        assert_eq!(raw.primitive_value().unwrap(), Primitive::Short(3));
    }

    #[test]
    fn test_boxed_equality_is_class_sensitive() {
        assert!(JObject::integer(1).java_equals(&JObject::integer(1)));
        assert!(!JObject::integer(1).java_equals(&JObject::long(1)));
        assert!(JObject::double(f64::NAN).java_equals(&JObject::double(f64::NAN)));
        assert!(!JObject::double(0.0).java_equals(&JObject::double(-0.0)));
    }

    #[test]
    fn test_string_identity_and_equality() {
        let a = JObject::string("hello");
        let b = JObject::string("hello");
        assert!(a.java_equals(&b));
        assert!(!a.same_object(&b));
        assert!(a.same_object(&a.clone()));
        assert_eq!(a.string_value().unwrap(), "hello");
    }

    #[test]
    fn test_big_numbers() {
        let big = JObject::big_integer_from_str("123456789012345678901234567890").unwrap();
        assert_eq!(big.to_java_string(), "123456789012345678901234567890");
        assert!(JObject::big_integer_from_str("12x").is_err());

        let dec = JObject::big_decimal_from_str("3.25").unwrap();
        assert_eq!(dec.to_java_string(), "3.25");
        assert!(dec.is_instance_of(names::NUMBER));
    }

    #[test]
    fn test_path() {
        let path = JObject::path("/tmp/data.csv");
        assert!(path.is_instance_of(names::PATH));
        assert_eq!(path.path_value().unwrap(), PathBuf::from("/tmp/data.csv"));
        assert_eq!(path.to_java_string(), "/tmp/data.csv");
    }

    #[test]
    fn test_plain_object_to_string() {
        let obj = JObject::new_object();
        assert!(obj.to_java_string().starts_with("java.lang.Object@"));
        assert!(!obj.java_equals(&JObject::new_object()));
    }
}
