//! Class Handles and Resolution
//!
//! A [`JClass`] is a cheap, thread-safe handle to one managed class,
//! interface, array type or primitive type. Handles know their full
//! (transitive) set of supertypes, so `instanceof` checks are a set lookup.
//!
//! ## Resolution
//!
//! [`resolve_class`] is the class-resolution service the converters depend
//! on: it takes a fully qualified name (or an array descriptor such as
//! `[I` or `[Ljava.lang.String;`) and returns the handle. It only works
//! while the runtime is running, which is why converter registries are
//! populated lazily.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use smol_str::SmolStr;
use tracing::debug;

use crate::error::{JvmError, JvmResult};
use crate::lifecycle::assert_jvm_started;
use crate::object::JObject;
use crate::primitive::PrimitiveKind;

/// Fully qualified names of the built-in classes.
pub mod names {
    pub const OBJECT: &str = "java.lang.Object";
    pub const SERIALIZABLE: &str = "java.io.Serializable";
    pub const COMPARABLE: &str = "java.lang.Comparable";
    pub const CHAR_SEQUENCE: &str = "java.lang.CharSequence";
    pub const CLONEABLE: &str = "java.lang.Cloneable";
    pub const ITERABLE: &str = "java.lang.Iterable";
    pub const NUMBER: &str = "java.lang.Number";
    pub const BOOLEAN: &str = "java.lang.Boolean";
    pub const BYTE: &str = "java.lang.Byte";
    pub const CHARACTER: &str = "java.lang.Character";
    pub const SHORT: &str = "java.lang.Short";
    pub const INTEGER: &str = "java.lang.Integer";
    pub const LONG: &str = "java.lang.Long";
    pub const FLOAT: &str = "java.lang.Float";
    pub const DOUBLE: &str = "java.lang.Double";
    pub const VOID: &str = "java.lang.Void";
    pub const STRING: &str = "java.lang.String";
    pub const BIG_INTEGER: &str = "java.math.BigInteger";
    pub const BIG_DECIMAL: &str = "java.math.BigDecimal";
    pub const COLLECTION: &str = "java.util.Collection";
    pub const LIST: &str = "java.util.List";
    pub const SET: &str = "java.util.Set";
    pub const QUEUE: &str = "java.util.Queue";
    pub const DEQUE: &str = "java.util.Deque";
    pub const MAP: &str = "java.util.Map";
    pub const ITERATOR: &str = "java.util.Iterator";
    pub const RANDOM_ACCESS: &str = "java.util.RandomAccess";
    pub const ARRAY_LIST: &str = "java.util.ArrayList";
    pub const HASH_SET: &str = "java.util.HashSet";
    pub const LINKED_HASH_SET: &str = "java.util.LinkedHashSet";
    pub const HASH_MAP: &str = "java.util.HashMap";
    pub const LINKED_HASH_MAP: &str = "java.util.LinkedHashMap";
    pub const KEY_SET_VIEW: &str = "java.util.LinkedHashMap$LinkedKeySet";
    pub const ARRAY_DEQUE: &str = "java.util.ArrayDeque";
    pub const ITERATOR_IMPL: &str = "java.util.ArrayList$Itr";
    pub const PATH: &str = "java.nio.file.Path";
    pub const UNIX_PATH: &str = "sun.nio.fs.UnixPath";
    pub const TABLE: &str = "org.scijava.table.Table";
    pub const GENERIC_TABLE: &str = "org.scijava.table.DefaultGenericTable";
    pub const FLOAT_TABLE: &str = "org.scijava.table.DefaultFloatTable";
    pub const INT_TABLE: &str = "org.scijava.table.DefaultIntTable";
    pub const BOOL_TABLE: &str = "org.scijava.table.DefaultBoolTable";
}

/// What sort of type a class handle describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// A concrete or abstract class
    Class,
    /// An interface
    Interface,
    /// An array type
    Array,
    /// One of the eight primitive types
    Primitive,
}

#[derive(Debug)]
struct ClassInfo {
    name: SmolStr,
    kind: ClassKind,
    /// Every supertype, transitively, excluding the class itself
    supertypes: Vec<SmolStr>,
    component: Option<JClass>,
    primitive: Option<PrimitiveKind>,
}

/// Handle to a managed class.
#[derive(Clone)]
pub struct JClass(Arc<ClassInfo>);

impl JClass {
    /// Fully qualified name (`Class.getName()` form)
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The kind of type this handle describes
    pub fn kind(&self) -> ClassKind {
        self.0.kind
    }

    /// Check if this is an interface
    pub fn is_interface(&self) -> bool {
        self.0.kind == ClassKind::Interface
    }

    /// Check if this is an array type
    pub fn is_array(&self) -> bool {
        self.0.kind == ClassKind::Array
    }

    /// Check if this is a primitive type
    pub fn is_primitive(&self) -> bool {
        self.0.kind == ClassKind::Primitive
    }

    /// Element class of an array type
    pub fn component_type(&self) -> Option<&JClass> {
        self.0.component.as_ref()
    }

    /// Primitive kind, for primitive types
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        self.0.primitive
    }

    /// Innermost element class of a (possibly nested) array type
    pub fn leaf_component_type(&self) -> Option<&JClass> {
        let mut current = self.component_type()?;
        while let Some(inner) = current.component_type() {
            current = inner;
        }
        Some(current)
    }

    /// Number of array dimensions (0 for non-arrays)
    pub fn dimensions(&self) -> usize {
        let mut dims = 0;
        let mut current = self;
        while let Some(inner) = current.component_type() {
            dims += 1;
            current = inner;
        }
        dims
    }

    /// Java's `Class.isAssignableFrom`: can a value of `other` be used where
    /// `self` is expected?
    pub fn is_assignable_from(&self, other: &JClass) -> bool {
        other.0.name == self.0.name || other.0.supertypes.iter().any(|s| *s == self.0.name)
    }

    /// Check whether this class is, or inherits from, the named type
    pub fn is_subtype_of(&self, name: &str) -> bool {
        self.0.name == name || self.0.supertypes.iter().any(|s| s == name)
    }

    /// Every supertype of this class, transitively
    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.0.supertypes.iter().map(|s| s.as_str())
    }

    /// Read a static field.
    ///
    /// Only the numeric `MIN_VALUE`/`MAX_VALUE` constants of the boxed
    /// number classes are modeled.
    pub fn static_field(&self, field: &str) -> JvmResult<JObject> {
        let value = match (self.name(), field) {
            (names::BYTE, "MIN_VALUE") => JObject::byte(i8::MIN),
            (names::BYTE, "MAX_VALUE") => JObject::byte(i8::MAX),
            (names::SHORT, "MIN_VALUE") => JObject::short(i16::MIN),
            (names::SHORT, "MAX_VALUE") => JObject::short(i16::MAX),
            (names::INTEGER, "MIN_VALUE") => JObject::integer(i32::MIN),
            (names::INTEGER, "MAX_VALUE") => JObject::integer(i32::MAX),
            (names::LONG, "MIN_VALUE") => JObject::long(i64::MIN),
            (names::LONG, "MAX_VALUE") => JObject::long(i64::MAX),
            // Java's floating MIN_VALUE is the smallest positive subnormal.
            (names::FLOAT, "MIN_VALUE") => JObject::float(f32::from_bits(1)),
            (names::FLOAT, "MAX_VALUE") => JObject::float(f32::MAX),
            (names::DOUBLE, "MIN_VALUE") => JObject::double(f64::from_bits(1)),
            (names::DOUBLE, "MAX_VALUE") => JObject::double(f64::MAX),
            _ => {
                return Err(JvmError::NoSuchField {
                    class_name: self.name().to_string(),
                    field: field.to_string(),
                })
            }
        };
        Ok(value)
    }

    /// The array type whose elements are this class
    pub fn array_class(&self) -> JClass {
        let descriptor = match self.0.primitive {
            Some(kind) => format!("[{}", kind.descriptor()),
            None if self.is_array() => format!("[{}", self.name()),
            None => format!("[L{};", self.name()),
        };
        registry().intern_array(&descriptor, self.clone())
    }
}

impl PartialEq for JClass {
    fn eq(&self, other: &Self) -> bool {
        self.0.name == other.0.name
    }
}

impl Eq for JClass {}

impl fmt::Debug for JClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JClass({})", self.0.name)
    }
}

impl fmt::Display for JClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ClassKind::Interface => write!(f, "interface {}", self.name()),
            ClassKind::Primitive => write!(f, "{}", self.name()),
            _ => write!(f, "class {}", self.name()),
        }
    }
}

// ============================================================================
// Class Registry
// ============================================================================

struct ClassRegistry {
    classes: RwLock<HashMap<SmolStr, JClass>>,
}

static REGISTRY: OnceLock<ClassRegistry> = OnceLock::new();

fn registry() -> &'static ClassRegistry {
    REGISTRY.get_or_init(ClassRegistry::with_builtins)
}

/// (name, kind, direct supertypes)
const BUILTINS: &[(&str, ClassKind, &[&str])] = {
    use names::*;
    use ClassKind::{Class, Interface};
    &[
        (OBJECT, Class, &[]),
        (SERIALIZABLE, Interface, &[]),
        (COMPARABLE, Interface, &[]),
        (CHAR_SEQUENCE, Interface, &[]),
        (CLONEABLE, Interface, &[]),
        (ITERABLE, Interface, &[]),
        (NUMBER, Class, &[OBJECT, SERIALIZABLE]),
        (BOOLEAN, Class, &[OBJECT, SERIALIZABLE, COMPARABLE]),
        (CHARACTER, Class, &[OBJECT, SERIALIZABLE, COMPARABLE]),
        (BYTE, Class, &[NUMBER, COMPARABLE]),
        (SHORT, Class, &[NUMBER, COMPARABLE]),
        (INTEGER, Class, &[NUMBER, COMPARABLE]),
        (LONG, Class, &[NUMBER, COMPARABLE]),
        (FLOAT, Class, &[NUMBER, COMPARABLE]),
        (DOUBLE, Class, &[NUMBER, COMPARABLE]),
        (VOID, Class, &[OBJECT]),
        (STRING, Class, &[OBJECT, SERIALIZABLE, COMPARABLE, CHAR_SEQUENCE]),
        (BIG_INTEGER, Class, &[NUMBER, COMPARABLE]),
        (BIG_DECIMAL, Class, &[NUMBER, COMPARABLE]),
        (COLLECTION, Interface, &[ITERABLE]),
        (LIST, Interface, &[COLLECTION]),
        (SET, Interface, &[COLLECTION]),
        (QUEUE, Interface, &[COLLECTION]),
        (DEQUE, Interface, &[QUEUE]),
        (MAP, Interface, &[]),
        (ITERATOR, Interface, &[]),
        (RANDOM_ACCESS, Interface, &[]),
        (ARRAY_LIST, Class, &[OBJECT, LIST, RANDOM_ACCESS, CLONEABLE, SERIALIZABLE]),
        (HASH_SET, Class, &[OBJECT, SET, CLONEABLE, SERIALIZABLE]),
        (LINKED_HASH_SET, Class, &[HASH_SET]),
        (HASH_MAP, Class, &[OBJECT, MAP, CLONEABLE, SERIALIZABLE]),
        (LINKED_HASH_MAP, Class, &[HASH_MAP]),
        (KEY_SET_VIEW, Class, &[OBJECT, SET]),
        (ARRAY_DEQUE, Class, &[OBJECT, DEQUE, CLONEABLE, SERIALIZABLE]),
        (ITERATOR_IMPL, Class, &[OBJECT, ITERATOR]),
        (PATH, Interface, &[COMPARABLE, ITERABLE]),
        (UNIX_PATH, Class, &[OBJECT, PATH]),
        (TABLE, Interface, &[]),
        (GENERIC_TABLE, Class, &[OBJECT, TABLE]),
        (FLOAT_TABLE, Class, &[OBJECT, TABLE]),
        (INT_TABLE, Class, &[OBJECT, TABLE]),
        (BOOL_TABLE, Class, &[OBJECT, TABLE]),
    ]
};

impl ClassRegistry {
    fn with_builtins() -> Self {
        let mut classes: HashMap<SmolStr, JClass> = HashMap::new();

        for kind in PrimitiveKind::ALL {
            let class = JClass(Arc::new(ClassInfo {
                name: SmolStr::new(kind.name()),
                kind: ClassKind::Primitive,
                supertypes: Vec::new(),
                component: None,
                primitive: Some(kind),
            }));
            classes.insert(SmolStr::new(kind.name()), class);
        }

        // BUILTINS lists every supertype before its subtypes.
        for (name, kind, direct) in BUILTINS {
            let supertypes = transitive_supertypes(&classes, direct);
            let class = JClass(Arc::new(ClassInfo {
                name: SmolStr::new(name),
                kind: *kind,
                supertypes,
                component: None,
                primitive: None,
            }));
            classes.insert(SmolStr::new(name), class);
        }

        Self {
            classes: RwLock::new(classes),
        }
    }

    fn get(&self, name: &str) -> Option<JClass> {
        self.classes.read().get(name).cloned()
    }

    fn lookup(&self, name: &str) -> JvmResult<JClass> {
        if let Some(class) = self.get(name) {
            return Ok(class);
        }
        if let Some(component) = name.strip_prefix('[') {
            let component = self.lookup_component(component)?;
            return Ok(self.intern_array(name, component));
        }
        Err(JvmError::class_not_found(name))
    }

    fn lookup_component(&self, descriptor: &str) -> JvmResult<JClass> {
        if descriptor.starts_with('[') {
            return self.lookup(descriptor);
        }
        if let Some(class_name) = descriptor.strip_prefix('L').and_then(|d| d.strip_suffix(';')) {
            return self.lookup(class_name);
        }
        let mut chars = descriptor.chars();
        match (chars.next().and_then(PrimitiveKind::from_descriptor), chars.next()) {
            (Some(kind), None) => self.lookup(kind.name()),
            _ => Err(JvmError::class_not_found(format!("[{}", descriptor))),
        }
    }

    fn intern_array(&self, descriptor: &str, component: JClass) -> JClass {
        if let Some(class) = self.get(descriptor) {
            return class;
        }
        let mut classes = self.classes.write();
        classes
            .entry(SmolStr::new(descriptor))
            .or_insert_with(|| {
                JClass(Arc::new(ClassInfo {
                    name: SmolStr::new(descriptor),
                    kind: ClassKind::Array,
                    supertypes: vec![
                        SmolStr::new(names::OBJECT),
                        SmolStr::new(names::CLONEABLE),
                        SmolStr::new(names::SERIALIZABLE),
                    ],
                    component: Some(component),
                    primitive: None,
                }))
            })
            .clone()
    }

    fn define(&self, name: &str, kind: ClassKind, direct: &[&str]) -> JvmResult<JClass> {
        let mut classes = self.classes.write();
        if classes.contains_key(name) {
            return Err(JvmError::ClassAlreadyDefined {
                name: name.to_string(),
            });
        }
        for parent in direct {
            if !classes.contains_key(*parent) {
                return Err(JvmError::class_not_found(*parent));
            }
        }
        let mut direct: Vec<&str> = direct.to_vec();
        if kind == ClassKind::Class && !direct.contains(&names::OBJECT) {
            direct.insert(0, names::OBJECT);
        }
        let class = JClass(Arc::new(ClassInfo {
            name: SmolStr::new(name),
            kind,
            supertypes: transitive_supertypes(&classes, &direct),
            component: None,
            primitive: None,
        }));
        classes.insert(SmolStr::new(name), class.clone());
        debug!(class = name, "defined managed class");
        Ok(class)
    }
}

fn transitive_supertypes(classes: &HashMap<SmolStr, JClass>, direct: &[&str]) -> Vec<SmolStr> {
    let mut all: Vec<SmolStr> = Vec::new();
    for parent in direct {
        let mut push = |name: &str| {
            if !all.iter().any(|s| s == name) {
                all.push(SmolStr::new(name));
            }
        };
        push(*parent);
        if let Some(class) = classes.get(*parent) {
            for inherited in class.supertypes() {
                push(inherited);
            }
        }
    }
    all
}

// ============================================================================
// Public Resolution API
// ============================================================================

/// Resolve a class by fully qualified name or array descriptor.
///
/// Fails with [`JvmError::NotStarted`] while the runtime is down.
pub fn resolve_class(name: &str) -> JvmResult<JClass> {
    assert_jvm_started()?;
    registry().lookup(name)
}

/// Define a new class extending/implementing the named supertypes.
///
/// `java.lang.Object` is implied.
pub fn define_class(name: &str, supertypes: &[&str]) -> JvmResult<JClass> {
    assert_jvm_started()?;
    registry().define(name, ClassKind::Class, supertypes)
}

/// Define a new interface extending the named interfaces.
pub fn define_interface(name: &str, supertypes: &[&str]) -> JvmResult<JClass> {
    assert_jvm_started()?;
    registry().define(name, ClassKind::Interface, supertypes)
}

/// Handle for a built-in class, without the started check.
///
/// Object constructors use this; built-in names always resolve.
pub(crate) fn builtin(name: &str) -> JClass {
    registry().lookup(name).unwrap_or_else(|_| {
        // Only reachable with a name missing from BUILTINS.
        JClass(Arc::new(ClassInfo {
            name: SmolStr::new(name),
            kind: ClassKind::Class,
            supertypes: vec![SmolStr::new(names::OBJECT)],
            component: None,
            primitive: None,
        }))
    })
}

/// Handle for a primitive type
pub(crate) fn primitive_class(kind: PrimitiveKind) -> JClass {
    builtin(kind.name())
}
