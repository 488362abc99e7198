//! `catalog-query`: the catalog query & pagination engine.
//!
//! Request parameters flow through the filter compiler ([`filter`]), the
//! strategy selector ([`strategy`]), one of the backend's executors
//! ([`executor`]) and the result assembler ([`assembler`]). Storage adapters
//! live in `catalog-infra`; this crate performs no I/O of its own.

pub mod assembler;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod executor;
pub mod filter;
pub mod page;
pub mod row;
pub mod scope;
pub mod sort;
pub mod strategy;

pub use assembler::{CatalogItem, ItemDetail, ResultAssembler};
pub use cursor::CursorPayload;
pub use engine::CatalogQueryEngine;
pub use error::QueryError;
pub use executor::{CatalogBackend, Executor, PageWindow};
pub use filter::{CatalogQueryParams, CompiledQuery, ItemFilter};
pub use page::{CatalogPage, OffsetPage, SeekPage};
pub use scope::StoreScope;
pub use sort::{SortColumn, SortDir, SortField, SortKey, SortSpec};
pub use strategy::{EntryPoint, ExecutionPath, PaginationMode, QueryPlan};
