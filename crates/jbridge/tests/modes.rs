//! Stock rule sets built for other configurations, in isolated registries.

use jbridge::jvm::{start_jvm, JObject, Primitive, PrimitiveKind, TableKind};
use jbridge::to_host::host_converters;
use jbridge::{BridgeConfig, ConverterRegistry, Hints, HostValue, Mode};
use pretty_assertions::assert_eq;

fn registry(config: BridgeConfig) -> ConverterRegistry<HostValue, HostValue> {
    start_jvm().unwrap();
    let registry = ConverterRegistry::new("isolated");
    registry.extend(host_converters(&config).unwrap());
    registry
}

fn has_rule(registry: &ConverterRegistry<HostValue, HostValue>, name: &str) -> bool {
    registry.names().iter().any(|n| n == name)
}

#[test]
fn test_jep_mode_has_no_raw_primitive_rules() {
    let jep = registry(BridgeConfig {
        mode: Mode::Jep,
        ..BridgeConfig::DEFAULT
    });
    assert!(!has_rule(&jep, "JByte/JInt/JLong/JShort -> int"));
    assert!(!has_rule(&jep, "primitive array -> numpy.ndarray"));
    assert!(has_rule(&jep, "jarray -> list"));

    let raw = HostValue::Java(JObject::primitive(Primitive::Int(3)));
    let err = jep.convert(&raw, &Hints::new()).unwrap_err();
    assert!(err.is_unsupported_type());
}

#[test]
fn test_jep_mode_arrays_become_lists() {
    let jep = registry(BridgeConfig {
        mode: Mode::Jep,
        ..BridgeConfig::DEFAULT
    });
    let array = JObject::primitive_array(
        PrimitiveKind::Short,
        &[Primitive::Short(4), Primitive::Short(-4)],
    )
    .unwrap();
    let list = jep.convert(&HostValue::Java(array), &Hints::new()).unwrap();
    assert_eq!(list, HostValue::list(vec![HostValue::from(4), HostValue::from(-4)]));
}

#[test]
fn test_without_numeric_arrays() {
    let plain = registry(BridgeConfig {
        numeric_arrays: false,
        ..BridgeConfig::DEFAULT
    });
    assert!(has_rule(&plain, "JDouble/JFloat -> float"));
    assert!(!has_rule(&plain, "primitive array -> numpy.ndarray"));

    let array = JObject::primitive_array(PrimitiveKind::Double, &[Primitive::Double(0.25)]).unwrap();
    let list = plain.convert(&HostValue::Java(array), &Hints::new()).unwrap();
    assert_eq!(list, HostValue::list(vec![HostValue::Float(0.25)]));
}

#[test]
fn test_without_tables() {
    let plain = registry(BridgeConfig {
        tables: false,
        ..BridgeConfig::DEFAULT
    });
    assert!(!has_rule(&plain, "org.scijava.table.Table -> pandas.DataFrame"));

    let table = HostValue::Java(JObject::new_table(TableKind::Generic, 0, 0));
    assert!(plain.convert(&table, &Hints::new()).unwrap_err().is_unsupported_type());
}

#[test]
fn test_rule_sets_are_sorted() {
    for config in [
        BridgeConfig::DEFAULT,
        BridgeConfig {
            mode: Mode::Jep,
            numeric_arrays: false,
            tables: false,
        },
    ] {
        let registry = registry(config);
        assert!(registry.is_sorted());
        assert_eq!(
            registry.names().first().map(|n| n.as_str()),
            Some("Other (Exceptional) converter")
        );
    }
}
