//! # jbridge-jvm
//!
//! The managed-runtime side of jbridge: classes, objects, collections,
//! arrays and tables with Java semantics.
//!
//! ## Overview
//!
//! The conversion core never touches a real JVM directly. It talks to this
//! crate, which provides:
//! - A lifecycle switch (`start_jvm` / `shutdown_jvm`) that class resolution
//!   depends on
//! - Class handles with a full supertype set, resolved by name or array
//!   descriptor
//! - Nullable object references with Java identity, `equals` and `toString`
//! - The `Collection`, `List`, `Set`, `Map` and `Iterator` methods
//! - Primitive arrays stored as native-endian bytes, and reference arrays
//! - `org.scijava.table` style column tables
//!
//! ## Module Structure
//!
//! - [`lifecycle`]: runtime start/stop
//! - [`class`]: class handles and resolution
//! - [`object`]: object references and scalar values
//! - [`collections`]: collection methods on [`JObject`]
//! - [`array`]: array allocation and element access
//! - [`table`]: column tables
//! - [`primitive`]: the eight primitive types
//! - [`error`]: runtime error types

pub mod array;
pub mod class;
pub mod collections;
pub mod error;
pub mod lifecycle;
pub mod object;
pub mod primitive;
pub mod table;

// Re-export main types for convenience
pub use array::{new_array, ArrayKind};
pub use class::{define_class, define_interface, names, resolve_class, ClassKind, JClass};
pub use error::{JvmError, JvmResult};
pub use lifecycle::{assert_jvm_started, jvm_started, shutdown_jvm, start_count, start_jvm};
pub use object::JObject;
pub use primitive::{java_f32_string, java_float_string, Primitive, PrimitiveKind};
pub use table::TableKind;
