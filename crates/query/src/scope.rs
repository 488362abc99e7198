//! Store-scope resolution.
//!
//! The `storeId` request token is classified exactly once into one of three
//! states; everything downstream matches on [`StoreScope`] instead of
//! re-inspecting the raw token.

use core::fmt;

use catalog_core::StoreId;

use crate::error::QueryError;

/// Sentinel token selecting the tenant-wide catalog without inventory data.
pub const GLOBAL_SCOPE_TOKEN: &str = "global";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreScope {
    /// No `storeId` given: inventory is not requested at all.
    Unscoped,
    /// Explicit `storeId=global`: global catalog, no inventory overlay.
    Global,
    /// A concrete store: inventory snapshot of that store is overlaid or joined.
    Store(StoreId),
}

impl StoreScope {
    /// Resolve a raw `storeId` token.
    ///
    /// A missing or blank token is `Unscoped`; the sentinel (case-insensitive)
    /// is `Global`; anything else must be a valid store identifier.
    pub fn resolve(token: Option<&str>) -> Result<Self, QueryError> {
        let Some(raw) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(StoreScope::Unscoped);
        };
        if raw.eq_ignore_ascii_case(GLOBAL_SCOPE_TOKEN) {
            return Ok(StoreScope::Global);
        }
        Ok(StoreScope::Store(StoreId::new(raw)?))
    }

    pub fn store_id(&self) -> Option<&StoreId> {
        match self {
            StoreScope::Store(id) => Some(id),
            StoreScope::Unscoped | StoreScope::Global => None,
        }
    }

    pub fn is_concrete_store(&self) -> bool {
        matches!(self, StoreScope::Store(_))
    }
}

impl Default for StoreScope {
    fn default() -> Self {
        StoreScope::Unscoped
    }
}

impl fmt::Display for StoreScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreScope::Unscoped => f.write_str("unscoped"),
            StoreScope::Global => f.write_str(GLOBAL_SCOPE_TOKEN),
            StoreScope::Store(id) => write!(f, "store:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_is_unscoped() {
        assert_eq!(StoreScope::resolve(None).unwrap(), StoreScope::Unscoped);
        assert_eq!(StoreScope::resolve(Some("  ")).unwrap(), StoreScope::Unscoped);
    }

    #[test]
    fn sentinel_is_global() {
        assert_eq!(StoreScope::resolve(Some("global")).unwrap(), StoreScope::Global);
        assert_eq!(StoreScope::resolve(Some("GLOBAL")).unwrap(), StoreScope::Global);
    }

    #[test]
    fn anything_else_is_a_store() {
        let scope = StoreScope::resolve(Some("store-7")).unwrap();
        assert_eq!(scope.store_id().map(|s| s.as_str()), Some("store-7"));
        assert!(scope.is_concrete_store());
    }

    #[test]
    fn overlong_store_id_is_a_validation_error() {
        let raw = "s".repeat(65);
        assert!(matches!(
            StoreScope::resolve(Some(&raw)),
            Err(QueryError::Validation(_))
        ));
    }
}
