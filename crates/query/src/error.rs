use thiserror::Error;

use catalog_core::DomainError;

/// Errors surfaced by the catalog query engine.
///
/// Validation and cursor failures are raised before any storage round trip.
/// Storage failures are passed through as-is (no retries, no partial pages).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The request parameters compile to an invalid query
    /// (e.g. an inventory-derived sort without a concrete store).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The opaque pagination cursor could not be decoded.
    #[error("invalid cursor: {0}")]
    CursorDecode(String),

    /// A single-item lookup missed.
    #[error("not found: {0}")]
    NotFound(String),

    /// A storage round trip failed.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl QueryError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn cursor(msg: impl Into<String>) -> Self {
        Self::CursorDecode(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    /// Whether the failure is attributable to the caller (bad input or a
    /// lookup miss) rather than to storage.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::CursorDecode(_) | Self::NotFound(_))
    }
}

impl From<DomainError> for QueryError {
    fn from(err: DomainError) -> Self {
        QueryError::Validation(err.to_string())
    }
}
