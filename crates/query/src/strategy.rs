//! Pagination strategy selection.
//!
//! Two independent axes are decided once per request: the pagination mode
//! (offset or seek) and the execution path (generic or inventory join).
//! Nothing downstream re-evaluates either choice.

use catalog_core::StoreId;

use crate::cursor::CursorPayload;
use crate::error::QueryError;
use crate::filter::{CompiledQuery, ItemFilter};
use crate::scope::StoreScope;
use crate::sort::SortSpec;

/// Which public operation is being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// Page-number listing; switches to seek only for a cursor without a page.
    List,
    /// Newest-first feed; always seek.
    Feed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationMode {
    Offset { page: u64, limit: u64 },
    /// `after` is `None` on the first feed page.
    Seek { after: Option<CursorPayload>, limit: u64 },
}

impl PaginationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaginationMode::Offset { .. } => "offset",
            PaginationMode::Seek { .. } => "seek",
        }
    }

    pub fn limit(&self) -> u64 {
        match self {
            PaginationMode::Offset { limit, .. } | PaginationMode::Seek { limit, .. } => *limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionPath {
    /// Predicate + sort over the item table, with an optional one-row
    /// inventory overlay when `overlay` is set.
    Generic { overlay: Option<StoreId> },
    /// Inner join against one store's inventory snapshot.
    InventoryJoin(StoreId),
}

impl ExecutionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionPath::Generic { .. } => "generic",
            ExecutionPath::InventoryJoin(_) => "inventory_join",
        }
    }
}

/// A fully decided query, ready to hand to an executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub filter: ItemFilter,
    pub scope: StoreScope,
    pub sort: SortSpec,
    pub mode: PaginationMode,
    pub path: ExecutionPath,
}

/// Choose mode and path for a compiled query.
///
/// Seek mode always orders by `(createdAt desc, id desc)` and therefore
/// always runs on the generic path; the requested sort is ignored there.
pub fn select(compiled: CompiledQuery, entry: EntryPoint) -> Result<QueryPlan, QueryError> {
    let seek = match entry {
        EntryPoint::Feed => {
            if compiled.page_requested {
                return Err(QueryError::validation(
                    "the feed is cursor-paginated; page is not accepted",
                ));
            }
            true
        }
        EntryPoint::List => compiled.cursor.is_some() && !compiled.page_requested,
    };

    let (mode, sort) = if seek {
        let mode = PaginationMode::Seek {
            after: compiled.cursor,
            limit: compiled.limit,
        };
        (mode, SortSpec::seek())
    } else {
        let mode = PaginationMode::Offset {
            page: compiled.page,
            limit: compiled.limit,
        };
        (mode, compiled.sort)
    };

    let path = match compiled.scope.store_id() {
        Some(store) if sort.is_inventory_derived() => ExecutionPath::InventoryJoin(store.clone()),
        overlay => ExecutionPath::Generic {
            overlay: overlay.cloned(),
        },
    };

    Ok(QueryPlan {
        filter: compiled.filter,
        scope: compiled.scope,
        sort,
        mode,
        path,
    })
}
