//! Native Rust Conversions
//!
//! Traits for moving plain Rust values in and out of [`HostValue`], so
//! callers can build host inputs and read host results without matching on
//! the enum by hand.
//!
//! ## Traits
//!
//! - `ToHost`: Rust value to host value (infallible)
//! - `FromHost`: host value to Rust value (type checked, range checked)
//!
//! Sequence extraction also accepts the managed collection façades, so the
//! result of a `to_host` call can be read back directly.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use smol_str::SmolStr;

use crate::error::{BridgeError, BridgeResult};
use crate::host::value::{HostDict, HostList, HostValue};

// ============================================================================
// ToHost
// ============================================================================

/// Conversion of a Rust value into a host value.
pub trait ToHost {
    /// Build the host value
    fn to_host(&self) -> HostValue;
}

impl ToHost for () {
    fn to_host(&self) -> HostValue {
        HostValue::None
    }
}

impl ToHost for bool {
    fn to_host(&self) -> HostValue {
        HostValue::Bool(*self)
    }
}

macro_rules! int_to_host {
    ($($t:ty),*) => {
        $(
            impl ToHost for $t {
                fn to_host(&self) -> HostValue {
                    HostValue::Int(BigInt::from(*self))
                }
            }
        )*
    };
}

int_to_host!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl ToHost for BigInt {
    fn to_host(&self) -> HostValue {
        HostValue::Int(self.clone())
    }
}

impl ToHost for f32 {
    fn to_host(&self) -> HostValue {
        HostValue::Float(f64::from(*self))
    }
}

impl ToHost for f64 {
    fn to_host(&self) -> HostValue {
        HostValue::Float(*self)
    }
}

impl ToHost for str {
    fn to_host(&self) -> HostValue {
        HostValue::Str(SmolStr::new(self))
    }
}

impl ToHost for String {
    fn to_host(&self) -> HostValue {
        HostValue::Str(SmolStr::new(self))
    }
}

impl ToHost for SmolStr {
    fn to_host(&self) -> HostValue {
        HostValue::Str(self.clone())
    }
}

impl ToHost for Path {
    fn to_host(&self) -> HostValue {
        HostValue::Path(self.to_path_buf())
    }
}

impl ToHost for PathBuf {
    fn to_host(&self) -> HostValue {
        HostValue::Path(self.clone())
    }
}

impl ToHost for HostValue {
    fn to_host(&self) -> HostValue {
        self.clone()
    }
}

impl<T: ToHost + ?Sized> ToHost for &T {
    fn to_host(&self) -> HostValue {
        (**self).to_host()
    }
}

impl<T: ToHost> ToHost for Option<T> {
    fn to_host(&self) -> HostValue {
        match self {
            Some(v) => v.to_host(),
            None => HostValue::None,
        }
    }
}

impl<T: ToHost> ToHost for Vec<T> {
    fn to_host(&self) -> HostValue {
        self.as_slice().to_host()
    }
}

impl<T: ToHost> ToHost for [T] {
    fn to_host(&self) -> HostValue {
        HostValue::List(self.iter().map(ToHost::to_host).collect())
    }
}

impl<K: AsRef<str>, V: ToHost> ToHost for HashMap<K, V> {
    fn to_host(&self) -> HostValue {
        HostValue::Dict(
            self.iter()
                .map(|(k, v)| (HostValue::str(k.as_ref()), v.to_host()))
                .collect(),
        )
    }
}

impl<A: ToHost, B: ToHost> ToHost for (A, B) {
    fn to_host(&self) -> HostValue {
        HostValue::Tuple(vec![self.0.to_host(), self.1.to_host()])
    }
}

impl<A: ToHost, B: ToHost, C: ToHost> ToHost for (A, B, C) {
    fn to_host(&self) -> HostValue {
        HostValue::Tuple(vec![self.0.to_host(), self.1.to_host(), self.2.to_host()])
    }
}

// ============================================================================
// FromHost
// ============================================================================

/// Conversion of a host value into a Rust value.
pub trait FromHost: Sized {
    /// Extract, failing on a type mismatch or out-of-range number
    fn from_host(value: &HostValue) -> BridgeResult<Self>;
}

impl FromHost for () {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        match value {
            HostValue::None => Ok(()),
            _ => Err(BridgeError::type_mismatch("None", value.type_name())),
        }
    }
}

impl FromHost for bool {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        value
            .as_bool()
            .ok_or_else(|| BridgeError::type_mismatch("bool", value.type_name()))
    }
}

impl FromHost for BigInt {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        value
            .as_integer()
            .ok_or_else(|| BridgeError::type_mismatch("int", value.type_name()))
    }
}

macro_rules! int_from_host {
    ($($t:ty => $to:ident),*) => {
        $(
            impl FromHost for $t {
                fn from_host(value: &HostValue) -> BridgeResult<Self> {
                    let n = BigInt::from_host(value)?;
                    n.$to()
                        .ok_or_else(|| BridgeError::numeric_overflow(n.to_string(), stringify!($t)))
                }
            }
        )*
    };
}

int_from_host!(
    i8 => to_i8,
    i16 => to_i16,
    i32 => to_i32,
    i64 => to_i64,
    isize => to_isize,
    u8 => to_u8,
    u16 => to_u16,
    u32 => to_u32,
    u64 => to_u64,
    usize => to_usize
);

impl FromHost for f64 {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        match value {
            HostValue::Float(f) => Ok(*f),
            HostValue::Int(n) => n
                .to_f64()
                .filter(|f| f.is_finite())
                .ok_or_else(|| BridgeError::numeric_overflow(n.to_string(), "f64")),
            _ => Err(BridgeError::type_mismatch("float", value.type_name())),
        }
    }
}

impl FromHost for f32 {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        let f = f64::from_host(value)?;
        if !f.is_finite() || f.abs() <= f64::from(f32::MAX) {
            Ok(f as f32)
        } else {
            Err(BridgeError::numeric_overflow(f.to_string(), "f32"))
        }
    }
}

impl FromHost for String {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        match value {
            HostValue::Str(s) => Ok(s.to_string()),
            _ => Err(BridgeError::type_mismatch("str", value.type_name())),
        }
    }
}

impl FromHost for SmolStr {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        match value {
            HostValue::Str(s) => Ok(s.clone()),
            _ => Err(BridgeError::type_mismatch("str", value.type_name())),
        }
    }
}

impl FromHost for PathBuf {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        match value {
            HostValue::Path(p) => Ok(p.clone()),
            _ => Err(BridgeError::type_mismatch("pathlib.Path", value.type_name())),
        }
    }
}

impl FromHost for HostValue {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        Ok(value.clone())
    }
}

impl FromHost for HostList {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        value
            .as_list()
            .cloned()
            .ok_or_else(|| BridgeError::type_mismatch("list", value.type_name()))
    }
}

impl FromHost for HostDict {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        value
            .as_dict()
            .cloned()
            .ok_or_else(|| BridgeError::type_mismatch("dict", value.type_name()))
    }
}

impl<T: FromHost> FromHost for Option<T> {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        match value {
            HostValue::None => Ok(None),
            _ => T::from_host(value).map(Some),
        }
    }
}

impl<T: FromHost> FromHost for Vec<T> {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        match value {
            HostValue::List(_)
            | HostValue::Tuple(_)
            | HostValue::Set(_)
            | HostValue::JavaList(_)
            | HostValue::JavaSet(_)
            | HostValue::JavaCollection(_)
            | HostValue::JavaIterable(_)
            | HostValue::JavaIterator(_) => {
                value.iter_values()?.iter().map(T::from_host).collect()
            }
            _ => Err(BridgeError::type_mismatch("list", value.type_name())),
        }
    }
}

impl<V: FromHost> FromHost for HashMap<String, V> {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        if !value.is_mapping() {
            return Err(BridgeError::type_mismatch("dict", value.type_name()));
        }
        value
            .items()?
            .iter()
            .map(|(k, v)| -> BridgeResult<(String, V)> {
                Ok((String::from_host(k)?, V::from_host(v)?))
            })
            .collect()
    }
}

// ============================================================================
// Conversion Helpers
// ============================================================================

/// Extract every item of a list
pub fn extract_list<T: FromHost>(list: &HostList) -> BridgeResult<Vec<T>> {
    list.to_vec().iter().map(T::from_host).collect()
}

/// Extract a dict with string keys
pub fn extract_dict<V: FromHost>(dict: &HostDict) -> BridgeResult<HashMap<String, V>> {
    let mut result = HashMap::with_capacity(dict.len());
    for (k, v) in dict.items() {
        result.insert(String::from_host(&k)?, V::from_host(&v)?);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalars_to_host() {
        assert_eq!(().to_host(), HostValue::None);
        assert_eq!(7u8.to_host(), HostValue::from(7));
        assert_eq!(u64::MAX.to_host(), HostValue::Int(BigInt::from(u64::MAX)));
        assert_eq!(1.5f32.to_host(), HostValue::Float(1.5));
        assert_eq!("hi".to_host(), HostValue::str("hi"));
        assert_eq!(Some(3i32).to_host(), HostValue::from(3));
        assert_eq!(None::<i32>.to_host(), HostValue::None);
    }

    #[test]
    fn test_containers_to_host() {
        let list = vec![1i64, 2, 3].to_host();
        assert_eq!(list.to_string(), "[1, 2, 3]");

        let mut map = HashMap::new();
        map.insert("k", 1.5f64);
        assert_eq!(map.to_host().to_string(), "{'k': 1.5}");

        assert_eq!((1i32, "a").to_host().to_string(), "(1, 'a')");
    }

    #[test]
    fn test_integers_from_host() {
        assert_eq!(i64::from_host(&HostValue::from(42)).unwrap(), 42);
        assert_eq!(i32::from_host(&HostValue::Bool(true)).unwrap(), 1);
        assert!(matches!(
            i8::from_host(&HostValue::from(300)),
            Err(BridgeError::NumericOverflow { .. })
        ));
        assert!(matches!(
            u32::from_host(&HostValue::from(-1)),
            Err(BridgeError::NumericOverflow { .. })
        ));
        assert!(matches!(
            i64::from_host(&HostValue::Float(1.0)),
            Err(BridgeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_floats_from_host() {
        assert_eq!(f64::from_host(&HostValue::from(2)).unwrap(), 2.0);
        assert!(f32::from_host(&HostValue::Float(f64::INFINITY)).unwrap().is_infinite());
        assert!(matches!(
            f32::from_host(&HostValue::Float(1e300)),
            Err(BridgeError::NumericOverflow { .. })
        ));
    }

    #[test]
    fn test_sequences_from_host() {
        let value = HostValue::list(vec![1.into(), 2.into()]);
        assert_eq!(Vec::<i64>::from_host(&value).unwrap(), vec![1, 2]);
        let tuple = HostValue::Tuple(vec!["a".into(), HostValue::None]);
        assert_eq!(
            Vec::<Option<String>>::from_host(&tuple).unwrap(),
            vec![Some("a".to_string()), None]
        );
        assert!(Vec::<i64>::from_host(&HostValue::str("12")).is_err());
        assert_eq!(extract_list::<i64>(value.as_list().unwrap()).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_dicts_from_host() {
        let value = HostValue::dict(vec![("a".into(), 1.into()), ("b".into(), 2.into())]);
        let map = HashMap::<String, i32>::from_host(&value).unwrap();
        assert_eq!(map.get("b"), Some(&2));
        assert_eq!(extract_dict::<i32>(value.as_dict().unwrap()).unwrap(), map);

        let bad_keys = HostValue::dict(vec![(1.into(), 1.into())]);
        assert!(HashMap::<String, i32>::from_host(&bad_keys).is_err());
    }
}
