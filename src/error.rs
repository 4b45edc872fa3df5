// Copyright 2024 Tracelang Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for graph resolution
//!
//! Every failure raised while forcing a node propagates unmodified to the
//! caller of [`Node::value`](crate::Node::value). Nothing in the crate catches,
//! wraps or retries an error internally.

use thiserror::Error;

/// Result type alias for resolution operations
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors that can occur while forcing an expression graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Key absent from the mapping a lookup was resolved against
    #[error("Key {key} not found{}", scope.as_ref().map(|s| format!(" in {s}")).unwrap_or_default())]
    KeyNotFound {
        /// Rendered key
        key: String,
        /// Rendered scope the lookup ran against
        scope: Option<String>,
    },

    /// Lookup forced before any context bound it
    #[error("Symbol {key} is not bound to any scope")]
    UnboundSymbol {
        /// Rendered key of the free symbol
        key: String,
    },

    /// Resolution nested deeper than the configured limit
    #[error("Recursion limit of {limit} exceeded")]
    RecursionLimitExceeded {
        /// The recursion limit that was exceeded
        limit: usize,
    },

    /// Lookup against a value that is not a mapping or sequence
    #[error("Value of type {type_name} is not indexable")]
    NotIndexable {
        /// Type of the indexed value
        type_name: &'static str,
    },

    /// Call against a value that is neither a function, a context nor a lazy list
    #[error("Value of type {type_name} is not callable")]
    NotCallable {
        /// Type of the called value
        type_name: &'static str,
    },

    /// Sequence index out of range
    #[error("Index out of bounds: {index} for sequence of size {size}")]
    IndexOutOfBounds {
        /// The index that was out of bounds
        index: i64,
        /// The size of the sequence
        size: usize,
    },

    /// Invalid operand types for a primitive operator
    #[error("Invalid operand types for operator '{operator}': {left_type} and {right_type}")]
    InvalidOperandTypes {
        /// The operator symbol
        operator: &'static str,
        /// Type of the left operand
        left_type: &'static str,
        /// Type of the right operand
        right_type: &'static str,
    },

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Integer arithmetic overflow
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// The operation that overflowed
        operation: &'static str,
    },

    /// Wrong number of positional arguments passed to a function
    #[error("Function '{function_name}' expects {expected} arguments, got {actual}")]
    InvalidArgumentCount {
        /// Name of the called function
        function_name: String,
        /// Expected number of arguments
        expected: usize,
        /// Actual number of arguments received
        actual: usize,
    },

    /// Type mismatch with optional context
    #[error("Type mismatch: expected {expected}, got {actual}{}", context.as_ref().map(|c| format!(" in {c}")).unwrap_or_default())]
    TypeMismatch {
        /// Expected type
        expected: String,
        /// Actual type received
        actual: String,
        /// Where the mismatch occurred
        context: Option<String>,
    },

    /// Failure reported by a user supplied callable
    #[error("Function '{function_name}' error: {message}")]
    Function {
        /// Name of the failing function
        function_name: String,
        /// Human-readable error message
        message: String,
    },
}

impl EvalError {
    /// Create a key-not-found error for a lookup against `scope`
    pub fn key_not_found(key: impl ToString, scope: Option<String>) -> Self {
        Self::KeyNotFound {
            key: key.to_string(),
            scope,
        }
    }

    /// Create a recursion limit exceeded error
    pub fn recursion_limit_exceeded(limit: usize) -> Self {
        Self::RecursionLimitExceeded { limit }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
            context: None,
        }
    }

    /// Create a type mismatch error with context
    pub fn type_mismatch_with_context(
        expected: impl Into<String>,
        actual: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
            context: Some(context.into()),
        }
    }

    /// Create an error on behalf of a user supplied function
    pub fn function(function_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Function {
            function_name: function_name.into(),
            message: message.into(),
        }
    }

    /// Whether this error signals runaway recursion
    pub fn is_recursion_limit(&self) -> bool {
        matches!(self, Self::RecursionLimitExceeded { .. })
    }
}
