//! Error Types for the Managed Runtime
//!
//! Every failure a managed-side call can produce. These mirror the Java
//! exceptions the real runtime would throw for the same misuse.
//!
//! ## Error Categories
//!
//! - Lifecycle (runtime not started)
//! - Class resolution
//! - Null dereference and unsupported methods
//! - Index and element errors
//! - Number parsing

use thiserror::Error;

/// Result type for managed runtime operations
pub type JvmResult<T> = Result<T, JvmError>;

/// Managed runtime error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JvmError {
    /// The runtime has not been started yet
    #[error("the JVM is not running")]
    NotStarted,

    /// No class is known under the given name
    #[error("class not found: {name}")]
    ClassNotFound {
        /// Fully qualified name that was requested
        name: String,
    },

    /// A class with this name already exists
    #[error("class already defined: {name}")]
    ClassAlreadyDefined {
        /// Fully qualified name of the class
        name: String,
    },

    /// The class has no static field of that name
    #[error("no such field: {class_name}.{field}")]
    NoSuchField {
        /// Class that was searched
        class_name: String,
        /// Field name
        field: String,
    },

    /// A method was called on the managed null reference
    #[error("null pointer: {context}")]
    NullPointer {
        /// Operation that dereferenced null
        context: String,
    },

    /// The object's class does not support the requested method
    #[error("unsupported operation {operation} on {class_name}")]
    UnsupportedOperation {
        /// Method name
        operation: String,
        /// Class of the receiver
        class_name: String,
    },

    /// Index outside `0..len`
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Length of the receiver
        len: usize,
    },

    /// An iterator was advanced past its end
    #[error("no such element")]
    NoSuchElement,

    /// A value of the wrong class was stored into a typed slot
    #[error("cannot store {actual} into {expected}")]
    ArrayStore {
        /// Class the slot accepts
        expected: String,
        /// Class of the value offered
        actual: String,
    },

    /// A string did not parse as a number
    #[error("number format: {input:?} is not a valid {target}")]
    NumberFormat {
        /// Offending input
        input: String,
        /// Target class name
        target: String,
    },

    /// Any other illegal argument
    #[error("illegal argument: {message}")]
    IllegalArgument {
        /// Description of the problem
        message: String,
    },
}

impl JvmError {
    /// Create a class not found error
    pub fn class_not_found(name: impl Into<String>) -> Self {
        JvmError::ClassNotFound { name: name.into() }
    }

    /// Create a null pointer error
    pub fn null_pointer(context: impl Into<String>) -> Self {
        JvmError::NullPointer {
            context: context.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(operation: impl Into<String>, class_name: impl Into<String>) -> Self {
        JvmError::UnsupportedOperation {
            operation: operation.into(),
            class_name: class_name.into(),
        }
    }

    /// Create an index out of bounds error
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        JvmError::IndexOutOfBounds { index, len }
    }

    /// Create an array store error
    pub fn array_store(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        JvmError::ArrayStore {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a number format error
    pub fn number_format(input: impl Into<String>, target: impl Into<String>) -> Self {
        JvmError::NumberFormat {
            input: input.into(),
            target: target.into(),
        }
    }

    /// Create an illegal argument error
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        JvmError::IllegalArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = JvmError::class_not_found("com.example.Missing");
        assert!(err.to_string().contains("com.example.Missing"));

        let err = JvmError::index_out_of_bounds(7, 3);
        assert_eq!(err.to_string(), "index 7 out of bounds for length 3");

        let err = JvmError::number_format("12x", "java.math.BigInteger");
        assert!(err.to_string().contains("\"12x\""));
    }

    #[test]
    fn test_unsupported_names_receiver() {
        let err = JvmError::unsupported("get", "java.util.LinkedHashSet");
        assert!(err.to_string().contains("get"));
        assert!(err.to_string().contains("java.util.LinkedHashSet"));
    }
}
