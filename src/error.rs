// ABOUTME: Error types for evaluation and module-loading failures

use crate::value::Value;
use thiserror::Error;

// ===== Arity constant strings (eliminates allocations in error paths) =====
pub const ARITY_ONE: &str = "1";
pub const ARITY_TWO: &str = "2";
pub const ARITY_THREE: &str = "3";
pub const ARITY_AT_LEAST_ONE: &str = "at least 1";
pub const ARITY_AT_LEAST_TWO: &str = "at least 2";
pub const ARITY_TWO_OR_THREE: &str = "2-3";

#[derive(Error, Debug, Clone)]
pub enum EvalError {
    // ===== Language-level errors with fixed observable texts =====
    #[error("{name} was not declared")]
    UndeclaredIdentifier { name: String },

    #[error("this function takes at least {expected} arguments ({given} given)")]
    ArityOverflow { expected: usize, given: usize },

    #[error("expected function, got {callee}")]
    NotAFunction { callee: String },

    #[error("module was expected")]
    ModuleExpected,

    #[error("module access expects a member name or call")]
    InvalidModuleAccess,

    #[error("unknown operator for {left} {operator} {right}")]
    UnknownInfixOperator {
        operator: String,
        left: String,
        right: String,
    },

    #[error("unknown operator for {operator}{operand}")]
    UnknownPrefixOperator { operator: String, operand: String },

    #[error("division by zero")]
    DivisionByZero,

    // ===== Built-in argument errors with rich context =====
    /// Type mismatch with function name, expected kind, actual kind, and position
    #[error("{function}: expected {expected}, got {actual} at argument {position}")]
    TypeMismatch {
        function: String,
        expected: String,
        actual: String,
        position: usize,
    },

    /// Arity error with function name, expected count/range, and actual count
    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    ArityError {
        function: String,
        expected: String, // "2", "2-3", "at least 1"
        actual: usize,
    },

    /// Runtime error with function context
    #[error("{function}: {message}")]
    RuntimeError { function: String, message: String },

    // ===== Module loading =====
    #[error("no module {path} found")]
    ModuleNotFound { path: String },

    #[error("the module {path} could not be read: {reason}")]
    ModuleUnreadable { path: String, reason: String },

    #[error("error parsing the module {path}: {errors}")]
    ModuleParseFailed { path: String, errors: String },
}

impl EvalError {
    /// Create a type mismatch error with full context
    pub fn type_error(function: &str, expected: &str, actual: &Value, position: usize) -> Self {
        EvalError::TypeMismatch {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.kind().to_string(),
            position,
        }
    }

    /// Create an arity error with expected and actual counts
    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::ArityError {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    /// Create a runtime error with function context
    pub fn runtime_error(function: &str, message: impl Into<String>) -> Self {
        EvalError::RuntimeError {
            function: function.to_string(),
            message: message.into(),
        }
    }
}
