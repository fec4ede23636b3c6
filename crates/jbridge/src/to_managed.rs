//! Host to Managed Rules
//!
//! The stock rule set of the `to_managed` dispatcher. Rules are tried from
//! the highest priority down; the first whose predicate accepts the value
//! (and hints) converts it.
//!
//! ## Numeric Cascade
//!
//! Integers try Byte and Short (only when hinted), then Integer, Long and
//! finally BigInteger, each gated by the target type's own `MIN_VALUE` /
//! `MAX_VALUE`. A value too large for one rule simply falls through to the
//! next. Floats cascade the same way through Float, Double and BigDecimal.
//!
//! ## Composites
//!
//! Mappings, sets and other iterables are copied element by element,
//! recursing through the global dispatcher without hints. A single
//! unconvertible element fails the whole conversion.

use jbridge_jvm::{JObject, TableKind};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::bounds::{self, BoundsTable};
use crate::converter::{Action, Converter, Predicate};
use crate::error::{BridgeError, BridgeResult};
use crate::hints::{Hints, NumericTarget};
use crate::host::{float_repr, ColumnDtype, DataFrame, HostValue};
use crate::priority::Priority;
use crate::registry::to_managed;

type ManagedConverter = Converter<HostValue, JObject>;

/// Build the stock host→managed rules.
///
/// Reads the numeric bounds, so the managed runtime must be started.
pub fn managed_converters() -> BridgeResult<Vec<ManagedConverter>> {
    let bounds = bounds::table()?;

    let mut rules = vec![
        Converter::new(
            "Other (Exceptional) converter",
            Predicate::always(),
            Action::plain(|v: &HostValue| Err(BridgeError::unsupported_type(v.type_name()))),
        )
        .with_priority(Priority::EXTREMELY_LOW - 1.0),
        Converter::new(
            "None -> None",
            Predicate::plain(HostValue::is_none),
            Action::plain(|_: &HostValue| Ok(JObject::null())),
        )
        .with_priority(Priority::EXTREMELY_HIGH + 1.0),
        Converter::new(
            "Java object identity",
            Predicate::plain(HostValue::is_managed),
            Action::plain(|v: &HostValue| {
                v.as_managed()
                    .cloned()
                    .ok_or_else(|| BridgeError::type_mismatch("a managed object", v.type_name()))
            }),
        )
        .with_priority(Priority::EXTREMELY_HIGH),
        Converter::new(
            "str -> java.lang.String",
            Predicate::plain(|v: &HostValue| matches!(v, HostValue::Str(_))),
            Action::plain(|v: &HostValue| match v {
                HostValue::Str(s) => Ok(JObject::string(s.clone())),
                other => Err(BridgeError::type_mismatch("str", other.type_name())),
            }),
        ),
        Converter::new(
            "bool -> java.lang.Boolean",
            Predicate::plain(|v: &HostValue| matches!(v, HostValue::Bool(_))),
            Action::plain(|v: &HostValue| match v {
                HostValue::Bool(b) => Ok(JObject::boolean(*b)),
                other => Err(BridgeError::type_mismatch("bool", other.type_name())),
            }),
        )
        .with_priority(Priority::NORMAL + 1.0),
    ];

    rules.extend(integer_converters(bounds));
    rules.extend(float_converters(bounds));

    rules.push(
        Converter::new(
            "pathlib.Path -> java.nio.file.Path",
            Predicate::plain(|v: &HostValue| matches!(v, HostValue::Path(_))),
            Action::plain(|v: &HostValue| match v {
                HostValue::Path(p) => Ok(JObject::path(p)),
                other => Err(BridgeError::type_mismatch("pathlib.Path", other.type_name())),
            }),
        )
        .with_priority(Priority::NORMAL + 1.0),
    );
    rules.push(
        Converter::new(
            "pandas.DataFrame -> org.scijava.table.Table",
            Predicate::plain(|v: &HostValue| matches!(v, HostValue::Frame(_))),
            Action::plain(|v: &HostValue| match v {
                HostValue::Frame(frame) => frame_to_table(frame),
                other => Err(BridgeError::type_mismatch("DataFrame", other.type_name())),
            }),
        )
        .with_priority(Priority::NORMAL + 1.0),
    );
    rules.push(Converter::new(
        "collections.abc.Mapping -> java.util.Map",
        Predicate::plain(HostValue::is_mapping),
        Action::plain(mapping_to_map),
    ));
    rules.push(Converter::new(
        "collections.abc.Set -> java.util.Set",
        Predicate::plain(HostValue::is_set_like),
        Action::plain(set_to_set),
    ));
    rules.push(
        Converter::new(
            "collections.abc.Iterable -> java.util.Iterable",
            Predicate::plain(HostValue::is_iterable),
            Action::plain(iterable_to_list),
        )
        .with_priority(Priority::NORMAL - 1.0),
    );

    Ok(rules)
}

// ============================================================================
// Numbers
// ============================================================================

fn as_int(value: &HostValue) -> Option<&BigInt> {
    match value {
        HostValue::Int(n) => Some(n),
        _ => None,
    }
}

fn as_float(value: &HostValue) -> Option<f64> {
    match value {
        HostValue::Float(f) => Some(*f),
        _ => None,
    }
}

fn narrow<T>(value: &BigInt, target: &str, cast: impl Fn(&BigInt) -> Option<T>) -> BridgeResult<T> {
    cast(value).ok_or_else(|| BridgeError::numeric_overflow(value.to_string(), target))
}

fn int_argument(value: &HostValue) -> BridgeResult<&BigInt> {
    as_int(value).ok_or_else(|| BridgeError::type_mismatch("int", value.type_name()))
}

fn float_argument(value: &HostValue) -> BridgeResult<f64> {
    as_float(value).ok_or_else(|| BridgeError::type_mismatch("float", value.type_name()))
}

fn integer_converters(bounds: &'static BoundsTable) -> Vec<ManagedConverter> {
    vec![
        Converter::new(
            "int -> java.lang.Byte",
            Predicate::hinted(move |v: &HostValue, hints: &Hints| {
                hints.requests(NumericTarget::Byte)
                    && as_int(v).map_or(false, |n| bounds.byte.contains_int(n))
            }),
            Action::plain(|v: &HostValue| {
                let n = narrow(int_argument(v)?, "java.lang.Byte", BigInt::to_i8)?;
                Ok(JObject::byte(n))
            }),
        )
        .with_priority(Priority::HIGH),
        Converter::new(
            "int -> java.lang.Short",
            Predicate::hinted(move |v: &HostValue, hints: &Hints| {
                hints.requests(NumericTarget::Short)
                    && as_int(v).map_or(false, |n| bounds.short.contains_int(n))
            }),
            Action::plain(|v: &HostValue| {
                let n = narrow(int_argument(v)?, "java.lang.Short", BigInt::to_i16)?;
                Ok(JObject::short(n))
            }),
        )
        .with_priority(Priority::HIGH),
        Converter::new(
            "int -> java.lang.Integer",
            Predicate::hinted(move |v: &HostValue, hints: &Hints| {
                hints.allows(NumericTarget::Int)
                    && as_int(v).map_or(false, |n| bounds.int.contains_int(n))
            }),
            Action::plain(|v: &HostValue| {
                let n = narrow(int_argument(v)?, "java.lang.Integer", BigInt::to_i32)?;
                Ok(JObject::integer(n))
            }),
        ),
        Converter::new(
            "int -> java.lang.Long",
            Predicate::hinted(move |v: &HostValue, hints: &Hints| {
                hints.allows(NumericTarget::Long)
                    && as_int(v).map_or(false, |n| bounds.long.contains_int(n))
            }),
            Action::plain(|v: &HostValue| {
                let n = narrow(int_argument(v)?, "java.lang.Long", BigInt::to_i64)?;
                Ok(JObject::long(n))
            }),
        )
        .with_priority(Priority::NORMAL - 1.0),
        Converter::new(
            "int -> java.math.BigInteger",
            Predicate::hinted(|v: &HostValue, hints: &Hints| {
                hints.allows(NumericTarget::BigInteger) && as_int(v).is_some()
            }),
            Action::plain(|v: &HostValue| {
                let text = int_argument(v)?.to_string();
                Ok(JObject::big_integer_from_str(&text)?)
            }),
        )
        .with_priority(Priority::NORMAL - 2.0),
    ]
}

fn float_converters(bounds: &'static BoundsTable) -> Vec<ManagedConverter> {
    vec![
        Converter::new(
            "float -> java.lang.Float",
            Predicate::hinted(move |v: &HostValue, hints: &Hints| {
                hints.allows(NumericTarget::Float)
                    && as_float(v).map_or(false, |f| bounds.float.contains_float(f))
            }),
            Action::plain(|v: &HostValue| Ok(JObject::float(float_argument(v)? as f32))),
        )
        .with_priority(Priority::NORMAL + 1.0),
        Converter::new(
            "float -> java.lang.Double",
            Predicate::hinted(move |v: &HostValue, hints: &Hints| {
                hints.allows(NumericTarget::Double)
                    && as_float(v).map_or(false, |f| bounds.double.contains_float(f))
            }),
            Action::plain(|v: &HostValue| Ok(JObject::double(float_argument(v)?))),
        ),
        Converter::new(
            "float -> java.math.BigDecimal",
            Predicate::hinted(|v: &HostValue, hints: &Hints| {
                hints.allows(NumericTarget::BigDecimal) && as_float(v).is_some()
            }),
            Action::plain(|v: &HostValue| {
                let text = float_repr(float_argument(v)?);
                Ok(JObject::big_decimal_from_str(&text)?)
            }),
        )
        .with_priority(Priority::NORMAL - 1.0),
    ]
}

// ============================================================================
// Composites
// ============================================================================

fn element(value: &HostValue) -> BridgeResult<JObject> {
    to_managed(value, &Hints::new())
}

fn mapping_to_map(value: &HostValue) -> BridgeResult<JObject> {
    let map = JObject::linked_hash_map();
    for (k, v) in value.items()? {
        map.put(element(&k)?, element(&v)?)?;
    }
    Ok(map)
}

fn set_to_set(value: &HostValue) -> BridgeResult<JObject> {
    let set = JObject::linked_hash_set();
    for item in value.iter_values()? {
        set.add(element(&item)?)?;
    }
    Ok(set)
}

fn iterable_to_list(value: &HostValue) -> BridgeResult<JObject> {
    let list = JObject::array_list();
    for item in value.iter_values()? {
        list.add(element(&item)?)?;
    }
    Ok(list)
}

/// Copy a dataframe into a new managed table.
///
/// A frame whose columns share one float, int or bool dtype becomes the
/// matching typed table; mixed dtypes (and frames without columns) become
/// a generic table. A single shared `object` dtype is rejected.
pub fn frame_to_table(frame: &DataFrame) -> BridgeResult<JObject> {
    let unique = frame.unique_dtypes();
    let kind = match unique.as_slice() {
        [] => TableKind::Generic,
        [ColumnDtype::Float64] => TableKind::Float,
        [ColumnDtype::Int64] => TableKind::Int,
        [ColumnDtype::Bool] => TableKind::Bool,
        [other] => return Err(BridgeError::unsupported_dtype(other.name())),
        _ => TableKind::Generic,
    };

    let (rows, columns) = frame.shape();
    let table = JObject::new_table(kind, columns, rows);
    for (c, series) in frame.series().iter().enumerate() {
        table.set_column_header(c, series.name())?;
        for (r, value) in series.values().iter().enumerate() {
            table.table_set(c, r, element(value)?)?;
        }
    }
    Ok(table)
}
