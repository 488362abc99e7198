//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures of domain values (parsing,
/// validation). Storage concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (empty, too long, or otherwise malformed).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A value is not a member of a closed enumeration.
    #[error("invalid {kind}: '{value}' (expected one of: {expected})")]
    InvalidEnum {
        kind: &'static str,
        value: String,
        expected: String,
    },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_enum(kind: &'static str, value: impl Into<String>, expected: &[&str]) -> Self {
        Self::InvalidEnum {
            kind,
            value: value.into(),
            expected: expected.join(", "),
        }
    }
}
