//! Error Types for the Conversion Bridge
//!
//! Every failure a conversion can report.
//!
//! ## Error Categories
//!
//! - Unconvertible values (the fallback rule of either dispatcher)
//! - Registries with no applicable rule at all
//! - Managed runtime exceptions surfacing through a rule
//! - Host-side type mismatches and numeric overflow
//! - Dataframe / array shape problems
//! - Configuration

use thiserror::Error;

use jbridge_jvm::JvmError;

use crate::config::ConfigError;

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Bridge error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// No stock or registered rule can convert the value
    #[error("Unsupported type: {type_name}")]
    UnsupportedType {
        /// Host-side type name of the offending value
        type_name: String,
    },

    /// A registry was exhausted without any rule matching.
    ///
    /// Registries with a fallback rule never report this.
    #[error("no converter in {registry} accepts the value")]
    NoApplicableConverter {
        /// Label of the registry that was scanned
        registry: String,
    },

    /// The managed runtime raised an exception
    #[error(transparent)]
    Jvm(#[from] JvmError),

    /// A host value had the wrong type for the requested operation
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type
        expected: String,
        /// Actual type received
        actual: String,
    },

    /// Numeric overflow while narrowing a host value
    #[error("numeric overflow: {value} cannot be represented as {target_type}")]
    NumericOverflow {
        /// String representation of the value
        value: String,
        /// Target type name
        target_type: String,
    },

    /// Dataframe or array dtype with no managed counterpart
    #[error("unsupported dtype: {dtype}")]
    UnsupportedDtype {
        /// The unsupported dtype name
        dtype: String,
    },

    /// Array shape does not match its data
    #[error("array layout incompatible: {reason}")]
    ArrayLayoutIncompatible {
        /// Description of the incompatibility
        reason: String,
    },

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Custom error with message
    #[error("{0}")]
    Custom(String),
}

impl BridgeError {
    /// Create an unsupported type error
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        BridgeError::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        BridgeError::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a numeric overflow error
    pub fn numeric_overflow(value: impl Into<String>, target_type: impl Into<String>) -> Self {
        BridgeError::NumericOverflow {
            value: value.into(),
            target_type: target_type.into(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: impl Into<String>) -> Self {
        BridgeError::UnsupportedDtype {
            dtype: dtype.into(),
        }
    }

    /// Create an array layout incompatible error
    pub fn array_layout_incompatible(reason: impl Into<String>) -> Self {
        BridgeError::ArrayLayoutIncompatible {
            reason: reason.into(),
        }
    }

    /// Create a custom error
    pub fn custom(message: impl Into<String>) -> Self {
        BridgeError::Custom(message.into())
    }

    /// Check if this is the unconvertible-value error that gentle mode absorbs
    pub fn is_unsupported_type(&self) -> bool {
        matches!(self, BridgeError::UnsupportedType { .. })
    }

    /// Check if this is a type-related error
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            BridgeError::UnsupportedType { .. }
                | BridgeError::TypeMismatch { .. }
                | BridgeError::UnsupportedDtype { .. }
        )
    }

    /// Check if this came from the managed runtime
    pub fn is_jvm_error(&self) -> bool {
        matches!(self, BridgeError::Jvm(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unsupported_type_message() {
        let err = BridgeError::unsupported_type("java.lang.Thread");
        assert_eq!(err.to_string(), "Unsupported type: java.lang.Thread");
        assert!(err.is_unsupported_type());
        assert!(err.is_type_error());
        assert!(!err.is_jvm_error());
    }

    #[test]
    fn test_jvm_error_is_transparent() {
        let err: BridgeError = JvmError::index_out_of_bounds(3, 1).into();
        assert!(err.is_jvm_error());
        assert!(!err.is_unsupported_type());
        assert_eq!(err.to_string(), "index 3 out of bounds for length 1");
    }

    #[test]
    fn test_overflow_names_target() {
        let err = BridgeError::numeric_overflow("300", "i8");
        assert!(err.to_string().contains("300"));
        assert!(err.to_string().contains("i8"));
        assert!(!err.is_type_error());
    }
}
