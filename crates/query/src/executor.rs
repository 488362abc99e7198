//! Storage capability seams.
//!
//! A backend hands out one [`Executor`] per execution path. Both executors of
//! a backend answer the same two questions (how many rows match, and which
//! rows fall in a window) from the identical compiled predicate.

use std::sync::Arc;

use catalog_core::{ItemId, TenantId};

use crate::cursor::CursorPayload;
use crate::error::QueryError;
use crate::filter::ItemFilter;
use crate::row::{ItemDetailRow, ItemRow};
use crate::scope::StoreScope;
use crate::sort::SortSpec;
use crate::strategy::ExecutionPath;

/// Which slice of the ordered result to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub take: u64,
    /// Seek position; rows at or before it in `(createdAt desc, id desc)`
    /// order are excluded.
    pub after: Option<CursorPayload>,
}

impl PageWindow {
    pub fn offset(offset: u64, take: u64) -> Self {
        Self { offset, take, after: None }
    }

    pub fn seek(after: Option<CursorPayload>, take: u64) -> Self {
        Self { offset: 0, take, after }
    }
}

#[async_trait::async_trait]
pub trait Executor: Send + Sync {
    /// Number of rows matching `filter` on this path.
    async fn count(&self, filter: &ItemFilter) -> Result<u64, QueryError>;

    /// Rows matching `filter`, ordered by `sort.keys()`, restricted to `window`.
    async fn fetch(
        &self,
        filter: &ItemFilter,
        sort: &SortSpec,
        window: &PageWindow,
    ) -> Result<Vec<ItemRow>, QueryError>;
}

/// A storage handle able to serve catalog reads.
#[async_trait::async_trait]
pub trait CatalogBackend: Send + Sync {
    /// The executor implementing `path`.
    fn executor<'a>(&'a self, path: &'a ExecutionPath) -> Box<dyn Executor + 'a>;

    /// Single-item lookup. Returns `Ok(None)` on a miss.
    async fn find_item(
        &self,
        tenant_id: Option<&TenantId>,
        id: &ItemId,
        scope: &StoreScope,
    ) -> Result<Option<ItemDetailRow>, QueryError>;
}

#[async_trait::async_trait]
impl<T: CatalogBackend + ?Sized> CatalogBackend for Arc<T> {
    fn executor<'a>(&'a self, path: &'a ExecutionPath) -> Box<dyn Executor + 'a> {
        (**self).executor(path)
    }

    async fn find_item(
        &self,
        tenant_id: Option<&TenantId>,
        id: &ItemId,
        scope: &StoreScope,
    ) -> Result<Option<ItemDetailRow>, QueryError> {
        (**self).find_item(tenant_id, id, scope).await
    }
}
