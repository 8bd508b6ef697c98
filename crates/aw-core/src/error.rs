//! Errors raised while constructing model values.

use thiserror::Error;

/// Errors that can occur when building model values from raw input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Identity key is empty")]
    EmptyIdentityKey,

    #[error("Identity key contains whitespace: '{0}'")]
    InvalidIdentityKey(String),

    #[error("Unknown system: {0}")]
    UnknownSystem(String),

    #[error("Account belongs to {actual}, expected {expected}")]
    SystemMismatch { expected: String, actual: String },
}
