//! Numeric Arrays
//!
//! A host-side, fixed-width, n-dimensional numeric array: the target of the
//! managed primitive-array conversion.
//!
//! ## Memory Layout
//!
//! Elements are stored C-contiguous (row-major) in one owned byte buffer,
//! native-endian, with no padding. That is also the layout of a managed
//! primitive array buffer, so a managed buffer is adopted as-is without
//! byte swapping.

use std::fmt;

use jbridge_jvm::{java_f32_string, PrimitiveKind};
use num_bigint::BigInt;

use crate::error::{BridgeError, BridgeResult};
use crate::host::value::{float_repr, HostValue};

// ============================================================================
// DType
// ============================================================================

/// Element type of an [`NdArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// Boolean, one byte per element
    Bool,
    /// Signed 8-bit integer
    Int8,
    /// Signed 16-bit integer
    Int16,
    /// Signed 32-bit integer
    Int32,
    /// Signed 64-bit integer
    Int64,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
}

impl DType {
    /// Get the size in bytes for this dtype
    pub fn size(&self) -> usize {
        match self {
            DType::Bool | DType::Int8 => 1,
            DType::Int16 => 2,
            DType::Int32 | DType::Float32 => 4,
            DType::Int64 | DType::Float64 => 8,
        }
    }

    /// Get the dtype name (e.g., "float64")
    pub fn name(&self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        }
    }

    /// Parse dtype from its name or type code
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bool" | "bool_" | "?" => Some(DType::Bool),
            "int8" | "i1" | "b" => Some(DType::Int8),
            "int16" | "i2" | "h" => Some(DType::Int16),
            "int32" | "i4" | "i" => Some(DType::Int32),
            "int64" | "i8" | "l" => Some(DType::Int64),
            "float32" | "f4" | "f" => Some(DType::Float32),
            "float64" | "f8" | "d" | "float" => Some(DType::Float64),
            _ => None,
        }
    }

    /// The dtype matching a managed primitive array element type.
    ///
    /// `char` has no counterpart.
    pub fn from_primitive(kind: PrimitiveKind) -> Option<Self> {
        match kind {
            PrimitiveKind::Boolean => Some(DType::Bool),
            PrimitiveKind::Byte => Some(DType::Int8),
            PrimitiveKind::Short => Some(DType::Int16),
            PrimitiveKind::Int => Some(DType::Int32),
            PrimitiveKind::Long => Some(DType::Int64),
            PrimitiveKind::Float => Some(DType::Float32),
            PrimitiveKind::Double => Some(DType::Float64),
            PrimitiveKind::Char => None,
        }
    }

    /// The managed primitive type with the same layout
    pub fn primitive_kind(&self) -> PrimitiveKind {
        match self {
            DType::Bool => PrimitiveKind::Boolean,
            DType::Int8 => PrimitiveKind::Byte,
            DType::Int16 => PrimitiveKind::Short,
            DType::Int32 => PrimitiveKind::Int,
            DType::Int64 => PrimitiveKind::Long,
            DType::Float32 => PrimitiveKind::Float,
            DType::Float64 => PrimitiveKind::Double,
        }
    }

    /// Check if this is an integer type
    pub fn is_integer(&self) -> bool {
        matches!(self, DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64)
    }

    /// Check if this is a floating point type
    pub fn is_float(&self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// ArrayElement
// ============================================================================

/// A Rust type that can be an [`NdArray`] element.
pub trait ArrayElement: Copy {
    /// The dtype storing this type
    const DTYPE: DType;

    /// Decode one element from native-endian bytes
    fn read_ne(bytes: &[u8]) -> Option<Self>;

    /// Append this element's native-endian bytes
    fn write_ne(self, out: &mut Vec<u8>);
}

impl ArrayElement for bool {
    const DTYPE: DType = DType::Bool;

    fn read_ne(bytes: &[u8]) -> Option<Self> {
        bytes.first().map(|b| *b != 0)
    }

    fn write_ne(self, out: &mut Vec<u8>) {
        out.push(u8::from(self));
    }
}

macro_rules! numeric_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl ArrayElement for $ty {
                const DTYPE: DType = DType::$dtype;

                fn read_ne(bytes: &[u8]) -> Option<Self> {
                    let bytes = bytes.get(..std::mem::size_of::<$ty>())?;
                    Some(<$ty>::from_ne_bytes(bytes.try_into().ok()?))
                }

                fn write_ne(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_ne_bytes());
                }
            }
        )*
    };
}

numeric_element! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
}

// ============================================================================
// NdArray
// ============================================================================

/// A C-contiguous n-dimensional numeric array owning its buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    dtype: DType,
    shape: Vec<usize>,
    data: Vec<u8>,
}

impl NdArray {
    /// Adopt a raw buffer; its size must match `shape` and `dtype`
    pub fn from_bytes(dtype: DType, shape: Vec<usize>, data: Vec<u8>) -> BridgeResult<Self> {
        let expected = shape.iter().product::<usize>() * dtype.size();
        if data.len() != expected {
            return Err(BridgeError::array_layout_incompatible(format!(
                "{} bytes cannot hold a {} array of shape {:?}",
                data.len(),
                dtype,
                shape
            )));
        }
        Ok(Self { dtype, shape, data })
    }

    /// A one-dimensional array of `values`
    pub fn from_vec<T: ArrayElement>(values: Vec<T>) -> Self {
        let mut data = Vec::with_capacity(values.len() * T::DTYPE.size());
        for value in &values {
            value.write_ne(&mut data);
        }
        Self {
            dtype: T::DTYPE,
            shape: vec![values.len()],
            data,
        }
    }

    /// A zero-filled array
    pub fn zeros(dtype: DType, shape: Vec<usize>) -> Self {
        let len = shape.iter().product::<usize>() * dtype.size();
        Self {
            dtype,
            shape,
            data: vec![0; len],
        }
    }

    /// Element type
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Size of each dimension, outermost first
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total element count
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    /// Buffer size in bytes
    pub fn nbytes(&self) -> usize {
        self.data.len()
    }

    /// The raw buffer
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Same elements under a new shape
    pub fn reshape(&self, shape: Vec<usize>) -> BridgeResult<Self> {
        if shape.iter().product::<usize>() != self.size() {
            return Err(BridgeError::array_layout_incompatible(format!(
                "cannot reshape array of size {} into shape {:?}",
                self.size(),
                shape
            )));
        }
        Ok(Self {
            dtype: self.dtype,
            shape,
            data: self.data.clone(),
        })
    }

    /// Typed element at a flat (row-major) index
    pub fn get<T: ArrayElement>(&self, index: usize) -> BridgeResult<T> {
        self.check_dtype::<T>()?;
        let offset = index * self.dtype.size();
        self.data
            .get(offset..)
            .and_then(T::read_ne)
            .filter(|_| index < self.size())
            .ok_or_else(|| {
                BridgeError::custom(format!("index {} out of range for size {}", index, self.size()))
            })
    }

    /// All elements, flattened
    pub fn to_vec<T: ArrayElement>(&self) -> BridgeResult<Vec<T>> {
        self.check_dtype::<T>()?;
        Ok(self
            .data
            .chunks_exact(self.dtype.size())
            .filter_map(T::read_ne)
            .collect())
    }

    fn check_dtype<T: ArrayElement>(&self) -> BridgeResult<()> {
        if T::DTYPE == self.dtype {
            Ok(())
        } else {
            Err(BridgeError::type_mismatch(T::DTYPE.name(), self.dtype.name()))
        }
    }

    /// Element at a flat index as a host scalar
    pub fn item(&self, index: usize) -> BridgeResult<HostValue> {
        Ok(match self.dtype {
            DType::Bool => HostValue::Bool(self.get::<bool>(index)?),
            DType::Int8 => HostValue::Int(BigInt::from(self.get::<i8>(index)?)),
            DType::Int16 => HostValue::Int(BigInt::from(self.get::<i16>(index)?)),
            DType::Int32 => HostValue::Int(BigInt::from(self.get::<i32>(index)?)),
            DType::Int64 => HostValue::Int(BigInt::from(self.get::<i64>(index)?)),
            DType::Float32 => HostValue::Float(f64::from(self.get::<f32>(index)?)),
            DType::Float64 => HostValue::Float(self.get::<f64>(index)?),
        })
    }

    /// What iterating the array yields: scalars for one dimension,
    /// sub-arrays along the first axis otherwise
    pub fn outer_items(&self) -> BridgeResult<Vec<HostValue>> {
        match self.shape.split_first() {
            None => Err(BridgeError::type_mismatch("iterable", "0-d ndarray")),
            Some((&len, [])) => (0..len).map(|i| self.item(i)).collect(),
            Some((&len, inner)) => {
                let stride = inner.iter().product::<usize>() * self.dtype.size();
                (0..len)
                    .map(|i| {
                        let chunk = self.data[i * stride..(i + 1) * stride].to_vec();
                        NdArray::from_bytes(self.dtype, inner.to_vec(), chunk).map(HostValue::Array)
                    })
                    .collect()
            }
        }
    }

    fn fmt_element(&self, f: &mut fmt::Formatter<'_>, index: usize) -> fmt::Result {
        match self.dtype {
            DType::Float32 => match self.get::<f32>(index) {
                Ok(v) => {
                    let text = java_f32_string(v)
                        .replace("Infinity", "inf")
                        .replace("NaN", "nan");
                    f.write_str(&text)
                }
                Err(_) => f.write_str("?"),
            },
            DType::Float64 => match self.get::<f64>(index) {
                Ok(v) => f.write_str(&float_repr(v)),
                Err(_) => f.write_str("?"),
            },
            _ => match self.item(index) {
                Ok(v) => write!(f, "{}", v),
                Err(_) => f.write_str("?"),
            },
        }
    }

    fn fmt_level(&self, f: &mut fmt::Formatter<'_>, dim: usize, offset: usize) -> fmt::Result {
        write!(f, "[")?;
        let len = self.shape[dim];
        let stride: usize = self.shape[dim + 1..].iter().product();
        for i in 0..len {
            if i > 0 {
                write!(f, ", ")?;
            }
            if dim + 1 == self.shape.len() {
                self.fmt_element(f, offset + i)?;
            } else {
                self.fmt_level(f, dim + 1, offset + i * stride)?;
            }
        }
        write!(f, "]")
    }
}

impl fmt::Display for NdArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "array(")?;
        if self.shape.is_empty() {
            self.fmt_element(f, 0)?;
        } else {
            self.fmt_level(f, 0, 0)?;
        }
        write!(f, ", dtype={})", self.dtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dtype_mapping() {
        for kind in PrimitiveKind::ALL {
            match DType::from_primitive(kind) {
                Some(dtype) => {
                    assert_eq!(dtype.primitive_kind(), kind);
                    assert_eq!(dtype.size(), kind.size());
                }
                None => assert_eq!(kind, PrimitiveKind::Char),
            }
        }
        assert_eq!(DType::parse("f8"), Some(DType::Float64));
        assert_eq!(DType::parse("complex"), None);
    }

    #[test]
    fn test_typed_access() {
        let array = NdArray::from_vec(vec![1i32, -2, 3]);
        assert_eq!(array.shape(), &[3]);
        assert_eq!(array.get::<i32>(1).unwrap(), -2);
        assert!(array.get::<i64>(1).is_err());
        assert!(array.get::<i32>(3).is_err());
        assert_eq!(array.item(2).unwrap(), HostValue::from(3));
    }

    #[test]
    fn test_reshape_and_outer_items() {
        let array = NdArray::from_vec(vec![1i16, 2, 3, 4, 5, 6]).reshape(vec![2, 3]).unwrap();
        assert_eq!(array.ndim(), 2);
        let rows = array.outer_items().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1],
            HostValue::Array(NdArray::from_vec(vec![4i16, 5, 6]))
        );
        assert!(array.reshape(vec![4]).is_err());
        assert_eq!(array.to_string(), "array([[1, 2, 3], [4, 5, 6]], dtype=int16)");
    }

    #[test]
    fn test_layout_mismatch() {
        let err = NdArray::from_bytes(DType::Int32, vec![2], vec![0; 7]).unwrap_err();
        assert!(matches!(err, BridgeError::ArrayLayoutIncompatible { .. }));
        assert_eq!(NdArray::zeros(DType::Float64, vec![2, 2]).nbytes(), 32);
    }
}
