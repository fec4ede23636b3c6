//! Numeric Bounds
//!
//! The smallest and largest value of each managed numeric type, read from
//! the type's own `MIN_VALUE` / `MAX_VALUE` constants rather than assumed
//! from host widths.
//!
//! Floating types are bounded by `(-MAX_VALUE, MAX_VALUE)`: Java's floating
//! `MIN_VALUE` is the smallest positive value, not the most negative one.

use std::sync::OnceLock;

use jbridge_jvm::{names, resolve_class, JClass, JObject, PrimitiveKind};
use num_bigint::BigInt;

use crate::error::{BridgeError, BridgeResult};

/// Inclusive value range of a managed numeric type.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericBounds {
    /// Byte, Short, Integer, Long
    Integral { min: BigInt, max: BigInt },
    /// Float, Double
    Floating { min: f64, max: f64 },
}

impl NumericBounds {
    /// Whether an integer lies within the range
    pub fn contains_int(&self, value: &BigInt) -> bool {
        match self {
            NumericBounds::Integral { min, max } => min <= value && value <= max,
            NumericBounds::Floating { .. } => false,
        }
    }

    /// Whether a float lies within the range.
    ///
    /// Infinities and NaN are representable by every floating type.
    pub fn contains_float(&self, value: f64) -> bool {
        match self {
            NumericBounds::Floating { min, max } => {
                !value.is_finite() || (*min <= value && value <= *max)
            }
            NumericBounds::Integral { .. } => false,
        }
    }
}

/// Bounds of a managed numeric class.
///
/// Accepts the boxed classes and their primitive counterparts; every other
/// class has no known bounds.
pub fn numeric_bounds(class: &JClass) -> Option<NumericBounds> {
    let boxed_name = match class.primitive_kind() {
        Some(kind) => kind.boxed_class_name(),
        None => class.name(),
    };
    let boxed = resolve_class(boxed_name).ok()?;
    let min = boxed.static_field("MIN_VALUE").ok()?;
    let max = boxed.static_field("MAX_VALUE").ok()?;
    match boxed_name {
        names::BYTE | names::SHORT | names::INTEGER | names::LONG => {
            Some(NumericBounds::Integral {
                min: BigInt::from(min.long_value().ok()?),
                max: BigInt::from(max.long_value().ok()?),
            })
        }
        names::FLOAT | names::DOUBLE => {
            let max = max.double_value().ok()?;
            Some(NumericBounds::Floating { min: -max, max })
        }
        _ => None,
    }
}

// ============================================================================
// Bounds Table
// ============================================================================

/// Bounds of the six bounded numeric types.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsTable {
    pub byte: NumericBounds,
    pub short: NumericBounds,
    pub int: NumericBounds,
    pub long: NumericBounds,
    pub float: NumericBounds,
    pub double: NumericBounds,
}

impl BoundsTable {
    /// Read every bound from the managed runtime
    pub fn load() -> BridgeResult<Self> {
        Ok(Self {
            byte: load(names::BYTE)?,
            short: load(names::SHORT)?,
            int: load(names::INTEGER)?,
            long: load(names::LONG)?,
            float: load(names::FLOAT)?,
            double: load(names::DOUBLE)?,
        })
    }

    /// Bounds for a primitive kind (`None` for boolean and char)
    pub fn for_kind(&self, kind: PrimitiveKind) -> Option<&NumericBounds> {
        match kind {
            PrimitiveKind::Byte => Some(&self.byte),
            PrimitiveKind::Short => Some(&self.short),
            PrimitiveKind::Int => Some(&self.int),
            PrimitiveKind::Long => Some(&self.long),
            PrimitiveKind::Float => Some(&self.float),
            PrimitiveKind::Double => Some(&self.double),
            PrimitiveKind::Boolean | PrimitiveKind::Char => None,
        }
    }
}

fn load(name: &str) -> BridgeResult<NumericBounds> {
    let class = resolve_class(name)?;
    numeric_bounds(&class)
        .ok_or_else(|| BridgeError::custom(format!("no numeric bounds for {}", name)))
}

static TABLE: OnceLock<BoundsTable> = OnceLock::new();

/// The process-wide bounds table, read on first use.
///
/// Fails while the managed runtime is not started.
pub fn table() -> BridgeResult<&'static BoundsTable> {
    if let Some(table) = TABLE.get() {
        return Ok(table);
    }
    let loaded = BoundsTable::load()?;
    Ok(TABLE.get_or_init(|| loaded))
}

/// Bounds of the class of a boxed number
pub fn bounds_of(value: &JObject) -> Option<NumericBounds> {
    numeric_bounds(&value.get_class().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jbridge_jvm::start_jvm;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_integral_bounds() {
        start_jvm().unwrap();
        let table = table().unwrap();
        assert_eq!(
            table.byte,
            NumericBounds::Integral {
                min: BigInt::from(-128),
                max: BigInt::from(127)
            }
        );
        assert!(table.int.contains_int(&BigInt::from(i32::MAX)));
        assert!(!table.int.contains_int(&(BigInt::from(i32::MAX) + 1)));
        assert!(table.long.contains_int(&BigInt::from(i64::MIN)));
        assert!(!table.long.contains_float(1.0));
    }

    #[test]
    fn test_floating_bounds() {
        start_jvm().unwrap();
        let table = table().unwrap();
        assert_eq!(
            table.float,
            NumericBounds::Floating {
                min: -f64::from(f32::MAX),
                max: f64::from(f32::MAX)
            }
        );
        assert!(table.float.contains_float(f64::INFINITY));
        assert!(table.float.contains_float(f64::NAN));
        assert!(!table.float.contains_float(1e300));
        assert!(table.double.contains_float(1e300));
    }

    #[test]
    fn test_primitive_and_unbounded_classes() {
        start_jvm().unwrap();
        let int = resolve_class("int").unwrap();
        assert_eq!(numeric_bounds(&int), Some(table().unwrap().int.clone()));
        let string = resolve_class(names::STRING).unwrap();
        assert_eq!(numeric_bounds(&string), None);
        assert_eq!(bounds_of(&JObject::short(3)), Some(table().unwrap().short.clone()));
    }
}
