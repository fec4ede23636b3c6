//! Host Side
//!
//! The dynamically typed side of the bridge: its values, the optional
//! dataframe and n-d array types, and the Rust-native conversion traits.

pub mod frame;
pub mod native;
pub mod ndarray;
pub mod value;

pub use frame::{ColumnDtype, DataFrame, Series};
pub use native::{extract_dict, extract_list, FromHost, ToHost};
pub use ndarray::{ArrayElement, DType, NdArray};
pub use value::{float_repr, str_repr, HostDict, HostList, HostObject, HostSet, HostValue};
