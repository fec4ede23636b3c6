//! Managed to Host Rules
//!
//! The stock rule set of the `to_host` dispatcher: boxed numbers and
//! strings unwrap to host natives, collections are wrapped in façades,
//! arrays become lists (or n-d arrays), and tables become dataframes.
//!
//! Which optional rules are present depends on the [`BridgeConfig`] they
//! are built from; see [`host_converters`].

use jbridge_jvm::{names, resolve_class, JClass, JObject, JvmError, PrimitiveKind};
use num_bigint::BigInt;

use crate::adapters::{JavaCollection, JavaIterable, JavaIterator, JavaList, JavaMap, JavaSet};
use crate::config::{BridgeConfig, Mode};
use crate::converter::{Action, Converter, Predicate};
use crate::error::{BridgeError, BridgeResult};
use crate::host::{DType, DataFrame, HostValue, NdArray};
use crate::priority::Priority;
use crate::registry::to_host;

type HostConverter = Converter<HostValue, HostValue>;

fn java(value: &HostValue) -> Option<&JObject> {
    match value {
        HostValue::Java(obj) => Some(obj),
        _ => None,
    }
}

/// A rule for non-null instances of `class`
fn instance_rule(
    name: &str,
    class: JClass,
    action: impl Fn(&JObject) -> BridgeResult<HostValue> + Send + Sync + 'static,
) -> HostConverter {
    Converter::new(
        name,
        Predicate::plain(move |v: &HostValue| java(v).map_or(false, |obj| obj.instance_of(&class))),
        Action::plain(move |v: &HostValue| match java(v) {
            Some(obj) => action(obj),
            None => Err(BridgeError::type_mismatch("a managed object", v.type_name())),
        }),
    )
}

/// A rule for raw (unboxed) primitives of one of `kinds`
fn raw_rule(
    name: &str,
    kinds: &'static [PrimitiveKind],
    action: impl Fn(&JObject) -> BridgeResult<HostValue> + Send + Sync + 'static,
) -> HostConverter {
    Converter::new(
        name,
        Predicate::plain(move |v: &HostValue| {
            java(v)
                .and_then(|obj| obj.get_class().ok())
                .and_then(|class| class.primitive_kind())
                .map_or(false, |kind| kinds.contains(&kind))
        }),
        Action::plain(move |v: &HostValue| match java(v) {
            Some(obj) => action(obj),
            None => Err(BridgeError::type_mismatch("a managed primitive", v.type_name())),
        }),
    )
    .with_priority(Priority::NORMAL + 1.0)
}

/// Build the stock managed→host rules for `config`.
///
/// Resolves the classes the rules test against, so the managed runtime
/// must be started.
///
/// - The raw-primitive rules exist only in [`Mode::Jpype`].
/// - The primitive-array rule also needs `numeric_arrays`.
/// - The table rule needs `tables`.
pub fn host_converters(config: &BridgeConfig) -> BridgeResult<Vec<HostConverter>> {
    let class = |name: &str| -> BridgeResult<JClass> { Ok(resolve_class(name)?) };

    let mut rules = vec![
        Converter::new(
            "Other (Exceptional) converter",
            Predicate::always(),
            Action::plain(|v: &HostValue| Err(BridgeError::unsupported_type(v.type_name()))),
        )
        .with_priority(Priority::EXTREMELY_LOW - 1.0),
        Converter::new(
            "null -> None",
            Predicate::plain(|v: &HostValue| java(v).map_or(false, JObject::is_null)),
            Action::plain(|_: &HostValue| Ok(HostValue::None)),
        )
        .with_priority(Priority::EXTREMELY_HIGH + 1.0),
        Converter::new(
            "Python object identity",
            Predicate::plain(|v: &HostValue| java(v).is_none()),
            Action::plain(|v: &HostValue| Ok(v.clone())),
        )
        .with_priority(Priority::EXTREMELY_HIGH),
    ];

    // Boxed values
    rules.push(instance_rule("java.lang.Boolean -> bool", class(names::BOOLEAN)?, |obj| {
        Ok(HostValue::Bool(obj.boolean_value()?))
    }));
    for (name, boxed) in [
        ("java.lang.Byte -> int", names::BYTE),
        ("java.lang.Short -> int", names::SHORT),
        ("java.lang.Integer -> int", names::INTEGER),
        ("java.lang.Long -> int", names::LONG),
    ] {
        rules.push(instance_rule(name, class(boxed)?, |obj| {
            Ok(HostValue::Int(BigInt::from(obj.long_value()?)))
        }));
    }
    for (name, boxed) in [
        ("java.lang.Float -> float", names::FLOAT),
        ("java.lang.Double -> float", names::DOUBLE),
    ] {
        rules.push(instance_rule(name, class(boxed)?, |obj| {
            Ok(HostValue::Float(obj.double_value()?))
        }));
    }
    rules.push(instance_rule("java.lang.Character -> str", class(names::CHARACTER)?, |obj| {
        Ok(char_to_str(obj.char_value()?))
    }));
    rules.push(instance_rule("java.lang.Void -> None", class(names::VOID)?, |_| {
        Ok(HostValue::None)
    }));
    rules.push(instance_rule("java.lang.String -> str", class(names::STRING)?, |obj| {
        Ok(HostValue::str(obj.string_value()?))
    }));
    rules.push(instance_rule("java.math.BigInteger -> int", class(names::BIG_INTEGER)?, |obj| {
        let text = obj.to_java_string();
        let value: BigInt = text
            .parse()
            .map_err(|_| JvmError::number_format(text.as_str(), "int"))?;
        Ok(HostValue::Int(value))
    }));
    rules.push(instance_rule("java.math.BigDecimal -> float", class(names::BIG_DECIMAL)?, |obj| {
        let text = obj.to_java_string();
        let value: f64 = text
            .parse()
            .map_err(|_| JvmError::number_format(text.as_str(), "float"))?;
        Ok(HostValue::Float(value))
    }));

    // Collections. Equal priorities resolve to the later rule, so the
    // wider interfaces go first.
    rules.push(instance_rule("java.util.List -> JavaList", class(names::LIST)?, |obj| {
        Ok(HostValue::JavaList(JavaList::new(obj.clone())?))
    }));
    rules.push(instance_rule("java.util.Map -> JavaMap", class(names::MAP)?, |obj| {
        Ok(HostValue::JavaMap(JavaMap::new(obj.clone())?))
    }));
    rules.push(instance_rule("java.util.Set -> JavaSet", class(names::SET)?, |obj| {
        Ok(HostValue::JavaSet(JavaSet::new(obj.clone())?))
    }));
    rules.push(
        instance_rule("java.lang.Iterable -> JavaIterable", class(names::ITERABLE)?, |obj| {
            Ok(HostValue::JavaIterable(JavaIterable::new(obj.clone())?))
        })
        .with_priority(Priority::NORMAL - 1.0),
    );
    rules.push(
        instance_rule("java.util.Iterator -> JavaIterator", class(names::ITERATOR)?, |obj| {
            Ok(HostValue::JavaIterator(JavaIterator::new(obj.clone())?))
        })
        .with_priority(Priority::NORMAL - 1.0),
    );
    rules.push(
        instance_rule("java.util.Collection -> JavaCollection", class(names::COLLECTION)?, |obj| {
            Ok(HostValue::JavaCollection(JavaCollection::new(obj.clone())?))
        })
        .with_priority(Priority::NORMAL - 1.0),
    );

    // Tables share NORMAL with List; registered later, they win the tie
    if config.tables {
        rules.push(instance_rule(
            "org.scijava.table.Table -> pandas.DataFrame",
            class(names::TABLE)?,
            table_to_frame,
        ));
    }

    rules.push(
        instance_rule("java.nio.file.Path -> pathlib.Path", class(names::PATH)?, |obj| {
            Ok(HostValue::Path(obj.path_value()?))
        })
        .with_priority(Priority::NORMAL + 1.0),
    );

    // Arrays
    let box_elements = config.mode == Mode::Jep;
    rules.push(
        Converter::new(
            "jarray -> list",
            Predicate::plain(|v: &HostValue| java(v).map_or(false, JObject::is_array)),
            Action::plain(move |v: &HostValue| match java(v) {
                Some(array) => array_to_list(array, box_elements),
                None => Err(BridgeError::type_mismatch("a managed array", v.type_name())),
            }),
        )
        .with_priority(Priority::VERY_LOW),
    );

    if config.mode == Mode::Jpype {
        rules.extend(raw_primitive_converters());
        if config.numeric_arrays {
            rules.push(Converter::new(
                "primitive array -> numpy.ndarray",
                Predicate::plain(|v: &HostValue| java(v).and_then(numeric_leaf_kind).is_some()),
                Action::plain(|v: &HostValue| match java(v) {
                    Some(array) => array_to_ndarray(array).map(HostValue::Array),
                    None => Err(BridgeError::type_mismatch("a managed array", v.type_name())),
                }),
            ));
        }
    }

    Ok(rules)
}

fn raw_primitive_converters() -> Vec<HostConverter> {
    use PrimitiveKind::*;

    vec![
        raw_rule("JBoolean -> bool", &[Boolean], |obj| {
            Ok(HostValue::Bool(obj.boolean_value()?))
        }),
        raw_rule("JByte/JInt/JLong/JShort -> int", &[Byte, Int, Long, Short], |obj| {
            Ok(HostValue::Int(BigInt::from(obj.long_value()?)))
        }),
        raw_rule("JDouble/JFloat -> float", &[Double, Float], |obj| {
            Ok(HostValue::Float(obj.double_value()?))
        }),
        raw_rule("JChar -> str", &[Char], |obj| Ok(char_to_str(obj.char_value()?))),
    ]
}

fn char_to_str(unit: u16) -> HostValue {
    HostValue::str(String::from_utf16_lossy(&[unit]))
}

// ============================================================================
// Arrays
// ============================================================================

/// Convert each element, failing on the first unconvertible one.
///
/// With `box_elements`, raw primitive elements are boxed first, as a bridge
/// that never surfaces raw primitives would hand them over.
fn array_to_list(array: &JObject, box_elements: bool) -> BridgeResult<HostValue> {
    let len = array.array_length()?;
    let mut items = Vec::with_capacity(len);
    for i in 0..len {
        let mut element = array.array_get(i)?;
        if box_elements && element.get_class().map_or(false, |c| c.is_primitive()) {
            element = JObject::boxed(element.primitive_value()?);
        }
        items.push(to_host(&HostValue::Java(element), false)?);
    }
    Ok(HostValue::list(items))
}

/// Leaf element kind of a primitive array with a host dtype
fn numeric_leaf_kind(array: &JObject) -> Option<PrimitiveKind> {
    let class = array.get_class().ok()?;
    if !class.is_array() {
        return None;
    }
    class
        .leaf_component_type()?
        .primitive_kind()
        .filter(|kind| *kind != PrimitiveKind::Char)
}

/// Copy a (possibly nested) primitive array into an n-d array.
///
/// The shape is read by descending through the first element of each
/// level. A level of length zero ends the descent and the remaining
/// dimensions are zero. Rows of unequal length are rejected.
pub fn array_to_ndarray(array: &JObject) -> BridgeResult<NdArray> {
    let kind = numeric_leaf_kind(array).ok_or_else(|| {
        BridgeError::array_layout_incompatible(format!(
            "{} is not an array of numbers or booleans",
            array.class_name()
        ))
    })?;
    let dtype =
        DType::from_primitive(kind).ok_or_else(|| BridgeError::unsupported_dtype(kind.name()))?;
    let dims = array.get_class()?.dimensions();

    let mut shape = Vec::with_capacity(dims);
    let mut level = array.clone();
    loop {
        let len = level.array_length()?;
        shape.push(len);
        if shape.len() == dims || len == 0 {
            break;
        }
        level = level.array_get(0)?;
    }
    shape.resize(dims, 0);

    let mut data = Vec::with_capacity(shape.iter().product::<usize>() * dtype.size());
    gather(array, &shape, &mut data)?;
    NdArray::from_bytes(dtype, shape, data)
}

fn gather(array: &JObject, shape: &[usize], out: &mut Vec<u8>) -> BridgeResult<()> {
    let Some((&expected, inner)) = shape.split_first() else {
        return Ok(());
    };
    let len = array.array_length()?;
    if len != expected {
        return Err(BridgeError::array_layout_incompatible(format!(
            "ragged array: found a row of length {}, expected {}",
            len, expected
        )));
    }
    if inner.is_empty() {
        out.extend(array.primitive_bytes()?);
        return Ok(());
    }
    for i in 0..len {
        gather(&array.array_get(i)?, inner, out)?;
    }
    Ok(())
}

// ============================================================================
// Tables
// ============================================================================

/// Copy a managed table into a dataframe.
///
/// Each column is converted through the dispatcher; unset headers become
/// the label `"None"`.
pub fn table_to_frame(table: &JObject) -> BridgeResult<HostValue> {
    let arrays = table.columns_to_arrays()?;
    let mut columns = Vec::with_capacity(arrays.len());
    for (c, array) in arrays.into_iter().enumerate() {
        let header = table
            .column_header(c)?
            .unwrap_or_else(|| "None".to_string());
        let values = match to_host(&HostValue::Java(array), false)? {
            HostValue::List(list) => list.to_vec(),
            other => other.iter_values()?,
        };
        columns.push((header, values));
    }
    Ok(HostValue::Frame(DataFrame::from_columns(columns)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hints::Hints;
    use jbridge_jvm::{define_class, start_jvm};
    use pretty_assertions::assert_eq;

    /// Name of the rule the dispatcher would pick for `obj`
    fn selected(rules: &[HostConverter], obj: &JObject) -> String {
        let value = HostValue::Java(obj.clone());
        let registry = crate::converter::ConverterRegistry::new("stock");
        registry.extend(rules.iter().cloned());
        registry
            .snapshot()
            .iter()
            .rev()
            .find(|c| c.supports(&value, &Hints::new()))
            .map(|c| c.name().to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_collection_outranks_iterable() {
        start_jvm().unwrap();
        let rules = host_converters(&BridgeConfig::DEFAULT).unwrap();

        let deque = JObject::array_deque();
        assert_eq!(selected(&rules, &deque), "java.util.Collection -> JavaCollection");
        assert_eq!(
            selected(&rules, &deque.iterator().unwrap()),
            "java.util.Iterator -> JavaIterator"
        );
        assert_eq!(selected(&rules, &JObject::array_list()), "java.util.List -> JavaList");
        assert_eq!(
            selected(&rules, &JObject::linked_hash_set()),
            "java.util.Set -> JavaSet"
        );
    }

    #[test]
    fn test_table_outranks_list() {
        start_jvm().unwrap();
        let rules = host_converters(&BridgeConfig::DEFAULT).unwrap();

        let class = define_class(
            "org.example.ListBackedTable",
            &[names::OBJECT, names::TABLE, names::LIST],
        )
        .unwrap();
        let table = JObject::new_instance(&class).unwrap();
        assert_eq!(selected(&rules, &table), "org.scijava.table.Table -> pandas.DataFrame");
    }
}
