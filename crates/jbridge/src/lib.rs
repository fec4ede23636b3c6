//! # jbridge
//!
//! Value conversion between a dynamically typed host and the JVM.
//!
//! Conversions in either direction are chosen by scanning a registry of
//! prioritized rules: the highest-priority rule whose predicate accepts
//! the value performs the conversion. The stock rules cover numbers,
//! strings, paths, collections, arrays and tables, and callers can add
//! their own at any priority.
//!
//! ## Overview
//!
//! - [`to_managed`]: host value → managed object, steered by [`Hints`]
//! - [`to_host`]: managed object → host value, optionally "gentle"
//! - [`register_managed_converter`] / [`register_host_converter`]: extend
//!   either direction
//!
//! Managed collections are not copied on the way back. They are wrapped in
//! façades ([`JavaList`], [`JavaMap`], [`JavaSet`], ...) that forward every
//! operation to the managed object, so writes are visible on both sides.
//!
//! ## Example
//!
//! ```no_run
//! use jbridge::{to_host, to_managed, Hints, HostValue};
//!
//! let managed = to_managed(&HostValue::from(42), &Hints::of_type("long"))?;
//! assert_eq!(managed.class_name(), "java.lang.Long");
//! assert_eq!(to_host(&managed.into(), false)?, HostValue::from(42));
//! # Ok::<(), jbridge::BridgeError>(())
//! ```
//!
//! ## Module Structure
//!
//! - [`priority`]: rule priorities and their named bands
//! - [`hints`]: dispatch hints
//! - [`converter`]: the generic rule engine
//! - [`registry`]: the two global dispatchers
//! - [`to_managed`](mod@to_managed) / [`to_host`](mod@to_host): the stock rules
//! - [`adapters`]: façades over managed collections
//! - [`host`]: the host value model
//! - [`bounds`]: managed numeric ranges
//! - [`config`]: bridge configuration
//! - [`error`]: error types

pub mod adapters;
pub mod bounds;
pub mod config;
pub mod converter;
pub mod error;
pub mod hints;
pub mod host;
pub mod priority;
pub mod registry;
pub mod to_host;
pub mod to_managed;

// Re-export main types for convenience
pub use adapters::{JavaCollection, JavaIterable, JavaIterator, JavaList, JavaMap, JavaSet};
pub use bounds::{numeric_bounds, NumericBounds};
pub use config::{BridgeConfig, ConfigError, Mode};
pub use converter::{Action, Converter, ConverterRegistry, Predicate};
pub use error::{BridgeError, BridgeResult};
pub use hints::{Hints, NumericTarget};
pub use host::{
    ColumnDtype, DType, DataFrame, FromHost, HostDict, HostList, HostObject, HostSet, HostValue,
    NdArray, Series, ToHost,
};
pub use priority::Priority;
pub use registry::{
    register_host_converter, register_managed_converter, to_host, to_managed,
};

pub use jbridge_jvm as jvm;
