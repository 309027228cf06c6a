// This module defines error types for the register engine using the thiserror crate for
// idiomatic Rust error handling. RegError is the main error enum covering the failure
// scenarios of the engine: malformed profile lines, offset arithmetic that does not fit,
// lookups that miss, buffers or bit vectors whose width disagrees with a register or
// arena, writes refused because a register is read-only, and condition codes whose flag
// bits cannot be located. Each variant carries the context needed for a useful message
// (line numbers, register names, expected and actual sizes). The module also provides
// RegResult<T> as a convenience alias for Result<T, RegError>.

//! Error types for the register engine.
//!
//! Using thiserror for more idiomatic error handling.

use thiserror::Error;

/// Main error type for profile parsing and register access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegError {
    #[error("Profile parse error at line {line}: {reason}")]
    Parse {
        line: usize,
        reason: String,
    },

    #[error("Layout overflow while placing register {name}")]
    LayoutOverflow {
        name: String,
    },

    #[error("Not found: {what}")]
    NotFound {
        what: String,
    },

    #[error("Size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        expected: usize,
        actual: usize,
    },

    #[error("Register {name} is read-only")]
    ReadOnly {
        name: String,
    },

    #[error("Condition {condition} cannot be resolved: flag bits are missing")]
    ConditionUnresolved {
        condition: String,
    },
}

impl RegError {
    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        RegError::Parse {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        RegError::NotFound { what: what.into() }
    }
}

/// Result type alias for register operations.
pub type RegResult<T> = Result<T, RegError>;
