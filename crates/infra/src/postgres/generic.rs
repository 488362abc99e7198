use std::sync::Arc;

use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use catalog_core::StoreId;
use catalog_query::{Executor, ItemFilter, PageWindow, QueryError, SortSpec, row::ItemRow};

use super::map_sqlx_error;
use super::rows::flat_item;
use super::statement::{Source, count_statement, page_statement};

/// Predicate + sort over the item table, optionally overlaying one store's
/// inventory snapshot (at most one row per item) without ordering on it.
#[derive(Debug)]
pub struct GenericExecutor<'a> {
    pool: &'a Arc<PgPool>,
    overlay: Option<&'a StoreId>,
}

impl<'a> GenericExecutor<'a> {
    pub fn new(pool: &'a Arc<PgPool>, overlay: Option<&'a StoreId>) -> Self {
        Self { pool, overlay }
    }

    fn source(&self) -> Source<'a> {
        match self.overlay {
            Some(store) => Source::Overlay(store),
            None => Source::Items,
        }
    }
}

#[async_trait::async_trait]
impl Executor for GenericExecutor<'_> {
    #[instrument(skip_all, fields(path = "generic"), err(level = "warn"))]
    async fn count(&self, filter: &ItemFilter) -> Result<u64, QueryError> {
        let mut qb = count_statement(self.source(), filter);
        let row = qb
            .build()
            .fetch_one(&**self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_items", e))?;
        let total: i64 = row
            .try_get("total")
            .map_err(|e| map_sqlx_error("count_items", e))?;
        debug!(total, "counted catalog items");
        Ok(u64::try_from(total).unwrap_or_default())
    }

    #[instrument(
        skip_all,
        fields(path = "generic", offset = window.offset, take = window.take),
        err(level = "warn")
    )]
    async fn fetch(
        &self,
        filter: &ItemFilter,
        sort: &SortSpec,
        window: &PageWindow,
    ) -> Result<Vec<ItemRow>, QueryError> {
        if sort.is_inventory_derived() {
            return Err(QueryError::validation(format!(
                "sorting by {} is only available on the inventory join path",
                sort.field
            )));
        }

        let mut qb = page_statement(self.source(), filter, sort, window);
        let rows = qb
            .build()
            .fetch_all(&**self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_items", e))?;
        debug!(rows = rows.len(), "fetched catalog page");

        rows.iter()
            .map(|row| flat_item(row).map_err(|e| map_sqlx_error("decode_item", e)))
            .collect()
    }
}
