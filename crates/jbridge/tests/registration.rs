//! Registering custom rules on the global dispatchers.
//!
//! These tests change process-wide conversions, so they live in their own
//! test binary.

use jbridge::jvm::{names, JObject};
use jbridge::registry::{host_registry, managed_registry};
use jbridge::{
    register_host_converter, register_managed_converter, to_host, to_managed, Action, BridgeError,
    Converter, Hints, HostObject, HostValue, Predicate, Priority,
};
use pretty_assertions::assert_eq;

#[test]
fn test_high_priority_string_rule_wins() {
    let before = to_managed(&HostValue::str("Hello world!"), &Hints::new()).unwrap();
    assert_eq!(before.string_value().unwrap(), "Hello world!");

    register_managed_converter(
        Converter::new(
            "shouting str -> java.lang.String",
            Predicate::plain(|v: &HostValue| v.as_str() == Some("Hello world!")),
            Action::plain(|v: &HostValue| {
                Ok(JObject::string(v.as_str().unwrap_or_default().to_uppercase()))
            }),
        )
        .with_priority(Priority::HIGH),
    )
    .unwrap();

    let after = to_managed(&HostValue::str("Hello world!"), &Hints::new()).unwrap();
    assert_eq!(after.string_value().unwrap(), "HELLO WORLD!");

    // Other strings still take the stock rule
    let other = to_managed(&HostValue::str("quiet"), &Hints::new()).unwrap();
    assert_eq!(other.string_value().unwrap(), "quiet");
    assert!(managed_registry().is_sorted());
}

#[test]
fn test_custom_host_type_becomes_convertible() {
    let point = HostValue::Object(HostObject::new("Point"));
    assert_eq!(
        to_managed(&point, &Hints::new()).unwrap_err(),
        BridgeError::unsupported_type("Point")
    );

    register_managed_converter(Converter::new(
        "Point -> java.lang.String",
        Predicate::plain(|v: &HostValue| matches!(v, HostValue::Object(o) if o.type_name() == "Point")),
        Action::plain(|_: &HostValue| Ok(JObject::string("Point(0, 0)"))),
    ))
    .unwrap();

    let obj = to_managed(&point, &Hints::new()).unwrap();
    assert_eq!(obj.class_name(), names::STRING);
}

#[test]
fn test_custom_hint_key() {
    register_managed_converter(
        Converter::new(
            "int -> java.lang.String (as=text)",
            Predicate::hinted(|v: &HostValue, hints: &Hints| {
                matches!(v, HostValue::Int(_)) && hints.get("as") == Some("text")
            }),
            Action::plain(|v: &HostValue| Ok(JObject::string(v.to_string()))),
        )
        .with_priority(Priority::VERY_HIGH),
    )
    .unwrap();

    let text = to_managed(&HostValue::from(12), &Hints::new().with("as", "text")).unwrap();
    assert_eq!(text.string_value().unwrap(), "12");
    let number = to_managed(&HostValue::from(12), &Hints::new()).unwrap();
    assert_eq!(number.class_name(), names::INTEGER);
}

#[test]
fn test_host_rule_registration() {
    let opaque = JObject::new_object();
    let value = HostValue::Java(opaque.clone());
    assert!(to_host(&value, false).is_err());

    let before = host_registry().len();
    register_host_converter(
        Converter::new(
            "java.lang.Object -> object",
            Predicate::plain(|v: &HostValue| {
                v.as_managed().map_or(false, |o| o.class_name() == names::OBJECT)
            }),
            Action::plain(|_: &HostValue| Ok(HostValue::Object(HostObject::new("object")))),
        )
        .with_priority(Priority::LOW),
    )
    .unwrap();
    assert_eq!(host_registry().len(), before + 1);

    match to_host(&value, false).unwrap() {
        HostValue::Object(obj) => assert_eq!(obj.type_name(), "object"),
        other => panic!("expected a host object, got {}", other),
    }
}
