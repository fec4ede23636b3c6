//! Integration tests for the runtime lifecycle.
//!
//! Lives in its own binary: shutting the runtime down would break any
//! test running in parallel in the same process.

use jbridge_jvm::{
    jvm_started, names, resolve_class, shutdown_jvm, start_count, start_jvm, JObject, JvmError,
};

#[test]
fn test_class_resolution_follows_lifecycle() {
    assert!(!jvm_started());
    assert_eq!(resolve_class(names::STRING).unwrap_err(), JvmError::NotStarted);

    start_jvm().unwrap();
    start_jvm().unwrap();
    assert_eq!(start_count(), 1);
    let string = resolve_class(names::STRING).unwrap();

    // Objects stay usable after shutdown; resolution does not.
    let hello = JObject::string("hello");
    shutdown_jvm().unwrap();
    shutdown_jvm().unwrap();
    assert!(!jvm_started());
    assert!(hello.instance_of(&string));
    assert_eq!(hello.to_java_string(), "hello");
    assert_eq!(resolve_class(names::STRING).unwrap_err(), JvmError::NotStarted);

    start_jvm().unwrap();
    assert_eq!(start_count(), 2);
    assert!(resolve_class(names::STRING).is_ok());
}
