//! Core error types for state machine extraction
//!
//! Parsing and extraction fail with these; rendering never fails.

use thiserror::Error;

/// Core error types for state machine extraction
#[derive(Error, Debug)]
pub enum StatevizError {
    #[error("Parse error: {message} at line {line}, column {column}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    /// A matched `StateMachine.create` call that cannot be evaluated.
    ///
    /// This is the only fatal extraction condition; every other shape
    /// mismatch is skipped silently.
    #[error("Malformed state machine DSL: {message} at line {line}, column {column}")]
    MalformedDsl {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Nesting too deep: exceeded the limit of {limit} levels")]
    NestingTooDeep { limit: usize },
}

impl StatevizError {
    /// Create a new parse error
    pub fn parse_error(message: String, line: usize, column: usize) -> Self {
        Self::ParseError {
            message,
            line,
            column,
        }
    }

    /// Create a new malformed DSL error
    pub fn malformed_dsl(message: String, line: usize, column: usize) -> Self {
        Self::MalformedDsl {
            message,
            line,
            column,
        }
    }

    /// Create a new nesting depth error
    pub fn nesting_too_deep(limit: usize) -> Self {
        Self::NestingTooDeep { limit }
    }

    /// Whether this error came from a `create` call without a lambda body
    pub fn is_malformed_dsl(&self) -> bool {
        matches!(self, Self::MalformedDsl { .. })
    }
}
