//! Managed Arrays
//!
//! Primitive arrays keep their elements as one contiguous native-endian
//! byte buffer, the same layout a bridge sees when it pins the array.
//! Reference arrays hold object references and enforce their component
//! type on store.
//!
//! Multi-dimensional arrays are arrays of arrays, so `new int[2][3]` is a
//! `[[I` whose two elements are independent `[I` rows.

use crate::class::{primitive_class, JClass};
use crate::error::{JvmError, JvmResult};
use crate::object::{JObject, ObjectData};
use crate::primitive::{Primitive, PrimitiveKind};

/// Element type of a new array.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayKind {
    /// One of the primitive types
    Primitive(PrimitiveKind),
    /// A reference type
    Object(JClass),
}

impl ArrayKind {
    /// Parse a primitive code (`z b c s i j f d`) or keyword
    pub fn from_code(code: &str) -> Option<Self> {
        PrimitiveKind::parse(code).map(ArrayKind::Primitive)
    }

    fn class(&self) -> JClass {
        match self {
            ArrayKind::Primitive(kind) => primitive_class(*kind),
            ArrayKind::Object(class) => class.clone(),
        }
    }
}

/// Allocate a (possibly multi-dimensional) array.
///
/// `lengths` gives the size of each dimension, outermost first. Elements
/// start at zero for primitive arrays and null for reference arrays.
pub fn new_array(kind: &ArrayKind, lengths: &[usize]) -> JvmResult<JObject> {
    let Some((&outer, inner)) = lengths.split_first() else {
        return Err(JvmError::illegal_argument("an array needs at least one dimension"));
    };

    let mut element_class = kind.class();
    for _ in inner {
        element_class = element_class.array_class();
    }
    let array_class = element_class.array_class();

    if !inner.is_empty() {
        let rows = (0..outer)
            .map(|_| new_array(kind, inner))
            .collect::<JvmResult<Vec<_>>>()?;
        return Ok(JObject::from_parts(array_class, ObjectData::ObjectArray(rows)));
    }

    let data = match kind {
        ArrayKind::Primitive(p) => ObjectData::PrimitiveArray {
            kind: *p,
            bytes: vec![0; outer * p.size()],
        },
        ArrayKind::Object(_) => ObjectData::ObjectArray(vec![JObject::null(); outer]),
    };
    Ok(JObject::from_parts(array_class, data))
}

impl JObject {
    /// A one-dimensional primitive array holding `values`.
    ///
    /// Every value is cast to `kind`.
    pub fn primitive_array(kind: PrimitiveKind, values: &[Primitive]) -> JvmResult<Self> {
        let mut bytes = Vec::with_capacity(values.len() * kind.size());
        for value in values {
            let value = value
                .cast(kind)
                .ok_or_else(|| JvmError::array_store(kind.name(), value.kind().name()))?;
            bytes.extend(value.to_ne_bytes());
        }
        Ok(Self::from_parts(
            primitive_class(kind).array_class(),
            ObjectData::PrimitiveArray { kind, bytes },
        ))
    }

    /// A one-dimensional reference array with the given component class
    pub fn object_array(component: &JClass, items: Vec<JObject>) -> JvmResult<Self> {
        for item in &items {
            if !item.is_null() && !item.instance_of(component) {
                return Err(JvmError::array_store(component.name(), item.class_name()));
            }
        }
        Ok(Self::from_parts(component.array_class(), ObjectData::ObjectArray(items)))
    }

    /// Check whether this is an array
    pub fn is_array(&self) -> bool {
        self.get_class().map_or(false, |c| c.is_array())
    }

    /// Element kind of a one-dimensional primitive array
    pub fn primitive_array_kind(&self) -> Option<PrimitiveKind> {
        match &*self.data("getComponentType").ok()? {
            ObjectData::PrimitiveArray { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// `array.length`
    pub fn array_length(&self) -> JvmResult<usize> {
        match &*self.data("length")? {
            ObjectData::PrimitiveArray { kind, bytes } => Ok(bytes.len() / kind.size()),
            ObjectData::ObjectArray(items) => Ok(items.len()),
            _ => Err(self.unsupported("length")),
        }
    }

    /// `array[index]`: primitive elements come back as raw primitives
    pub fn array_get(&self, index: usize) -> JvmResult<JObject> {
        match &*self.data("array load")? {
            ObjectData::PrimitiveArray { kind, bytes } => {
                let len = bytes.len() / kind.size();
                let offset = index * kind.size();
                kind.read(bytes.get(offset..).unwrap_or_default())
                    .filter(|_| index < len)
                    .map(JObject::primitive)
                    .ok_or_else(|| JvmError::index_out_of_bounds(index, len))
            }
            ObjectData::ObjectArray(items) => items
                .get(index)
                .cloned()
                .ok_or_else(|| JvmError::index_out_of_bounds(index, items.len())),
            _ => Err(self.unsupported("array load")),
        }
    }

    /// `array[index] = value`.
    ///
    /// Primitive arrays accept raw or boxed primitives and cast them to the
    /// element type. Reference arrays accept null or instances of the
    /// component type.
    pub fn array_set(&self, index: usize, value: &JObject) -> JvmResult<()> {
        let class = self.get_class()?;
        let primitive = match &*self.data("array store")? {
            ObjectData::PrimitiveArray { kind, .. } => Some(*kind),
            ObjectData::ObjectArray(_) => None,
            _ => return Err(self.unsupported("array store")),
        };

        match primitive {
            Some(kind) => {
                let element = value
                    .primitive_value()
                    .ok()
                    .and_then(|p| p.cast(kind))
                    .ok_or_else(|| JvmError::array_store(kind.name(), value.class_name()))?;
                self.array_set_primitive(index, element)
            }
            None => {
                if let Some(component) = class.component_type() {
                    if !value.is_null() && !value.instance_of(component) {
                        return Err(JvmError::array_store(component.name(), value.class_name()));
                    }
                }
                match &mut *self.data_mut("array store")? {
                    ObjectData::ObjectArray(items) => {
                        let len = items.len();
                        let slot = items
                            .get_mut(index)
                            .ok_or_else(|| JvmError::index_out_of_bounds(index, len))?;
                        *slot = value.clone();
                        Ok(())
                    }
                    _ => Err(self.unsupported("array store")),
                }
            }
        }
    }

    /// Store a primitive into a primitive array (exact kind required)
    pub fn array_set_primitive(&self, index: usize, value: Primitive) -> JvmResult<()> {
        match &mut *self.data_mut("array store")? {
            ObjectData::PrimitiveArray { kind, bytes } if *kind == value.kind() => {
                let size = kind.size();
                let len = bytes.len() / size;
                let slot = bytes
                    .get_mut(index * size..(index + 1) * size)
                    .ok_or_else(|| JvmError::index_out_of_bounds(index, len))?;
                slot.copy_from_slice(&value.to_ne_bytes());
                Ok(())
            }
            ObjectData::PrimitiveArray { kind, .. } => {
                Err(JvmError::array_store(kind.name(), value.kind().name()))
            }
            _ => Err(self.unsupported("array store")),
        }
    }

    /// Owned copy of a primitive array's element bytes (native-endian)
    pub fn primitive_bytes(&self) -> JvmResult<Vec<u8>> {
        match &*self.data("array buffer")? {
            ObjectData::PrimitiveArray { bytes, .. } => Ok(bytes.clone()),
            _ => Err(self.unsupported("array buffer")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{names, resolve_class};
    use crate::lifecycle::start_jvm;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_primitive_array() {
        let kind = ArrayKind::from_code("i").unwrap();
        let arr = new_array(&kind, &[4]).unwrap();
        assert_eq!(arr.class_name(), "[I");
        assert_eq!(arr.array_length().unwrap(), 4);
        assert_eq!(arr.array_get(2).unwrap().primitive_value().unwrap(), Primitive::Int(0));

        arr.array_set(2, &JObject::integer(42)).unwrap();
        let element = arr.array_get(2).unwrap();
        assert_eq!(element.class_name(), "int");
        assert_eq!(element.primitive_value().unwrap(), Primitive::Int(42));
        assert_eq!(arr.primitive_bytes().unwrap().len(), 16);

        assert_eq!(arr.array_get(4).unwrap_err(), JvmError::index_out_of_bounds(4, 4));
        assert!(arr.array_set(0, &JObject::string("x")).is_err());
    }

    #[test]
    fn test_nested_array() {
        let grid = new_array(&ArrayKind::Primitive(PrimitiveKind::Double), &[2, 3]).unwrap();
        assert_eq!(grid.class_name(), "[[D");
        assert_eq!(grid.array_length().unwrap(), 2);
        let row = grid.array_get(1).unwrap();
        assert_eq!(row.class_name(), "[D");
        assert_eq!(row.array_length().unwrap(), 3);
        assert!(grid.primitive_bytes().is_err());
    }

    #[test]
    fn test_object_array_store_check() {
        start_jvm().unwrap();
        let string = resolve_class(names::STRING).unwrap();
        let arr = new_array(&ArrayKind::Object(string), &[2]).unwrap();
        assert_eq!(arr.class_name(), "[Ljava.lang.String;");
        assert!(arr.array_get(0).unwrap().is_null());

        arr.array_set(0, &JObject::string("hi")).unwrap();
        assert!(matches!(
            arr.array_set(1, &JObject::integer(1)),
            Err(JvmError::ArrayStore { .. })
        ));
    }

    #[test]
    fn test_primitive_array_from_values() {
        let arr = JObject::primitive_array(
            PrimitiveKind::Short,
            &[Primitive::Int(1), Primitive::Short(2)],
        )
        .unwrap();
        assert_eq!(arr.primitive_array_kind(), Some(PrimitiveKind::Short));
        assert_eq!(arr.array_get(0).unwrap().primitive_value().unwrap(), Primitive::Short(1));
        assert!(JObject::primitive_array(PrimitiveKind::Int, &[Primitive::Boolean(true)]).is_err());
    }

    #[test]
    fn test_empty_dimensions_rejected() {
        let err = new_array(&ArrayKind::Primitive(PrimitiveKind::Int), &[]).unwrap_err();
        assert!(matches!(err, JvmError::IllegalArgument { .. }));
    }
}
