//! Input errors raised while handling protocol commands.
//!
//! Anything a handler returns that downcasts to [`UciError`] is treated as a
//! controller mistake: it is reported and the read loop carries on. Every
//! other error is unexpected and goes to the connection's error handler.

use thiserror::Error;

/// Error type returned by command handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UciError {
    #[error("No such option: {0}")]
    OptionNotFound(String),

    #[error("Option {name} is of type {expected}, got a {found} value")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Maximum value for option {name} is {max}")]
    AboveMaximum { name: String, max: i64 },

    #[error("Minimum value for option {name} is {min}")]
    BelowMinimum { name: String, min: i64 },

    #[error("Expected {expected}, found '{found}'")]
    Parse {
        expected: &'static str,
        found: String,
    },

    #[error("Expected a value for '{field}'")]
    MissingValue { field: String },

    #[error("{0}")]
    InvalidArgument(String),
}

impl UciError {
    pub fn invalid(message: impl Into<String>) -> Self {
        UciError::InvalidArgument(message.into())
    }
}
