use std::sync::Arc;

use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use catalog_core::StoreId;
use catalog_query::{Executor, ItemFilter, PageWindow, QueryError, SortSpec, row::ItemRow};

use super::map_sqlx_error;
use super::rows::flat_item;
use super::statement::{Source, count_statement, page_statement};

/// Items inner-joined to one store's inventory snapshot; items without a
/// snapshot in that store are excluded. Offset pagination only.
#[derive(Debug)]
pub struct InventoryJoinExecutor<'a> {
    pool: &'a Arc<PgPool>,
    store_id: &'a StoreId,
}

impl<'a> InventoryJoinExecutor<'a> {
    pub fn new(pool: &'a Arc<PgPool>, store_id: &'a StoreId) -> Self {
        Self { pool, store_id }
    }
}

#[async_trait::async_trait]
impl Executor for InventoryJoinExecutor<'_> {
    #[instrument(
        skip_all,
        fields(path = "inventory_join", store_id = %self.store_id),
        err(level = "warn")
    )]
    async fn count(&self, filter: &ItemFilter) -> Result<u64, QueryError> {
        let mut qb = count_statement(Source::Joined(self.store_id), filter);
        let row = qb
            .build()
            .fetch_one(&**self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_stocked_items", e))?;
        let total: i64 = row
            .try_get("total")
            .map_err(|e| map_sqlx_error("count_stocked_items", e))?;
        debug!(total, "counted stocked items");
        Ok(u64::try_from(total).unwrap_or_default())
    }

    #[instrument(
        skip_all,
        fields(
            path = "inventory_join",
            store_id = %self.store_id,
            offset = window.offset,
            take = window.take
        ),
        err(level = "warn")
    )]
    async fn fetch(
        &self,
        filter: &ItemFilter,
        sort: &SortSpec,
        window: &PageWindow,
    ) -> Result<Vec<ItemRow>, QueryError> {
        if window.after.is_some() {
            return Err(QueryError::validation(
                "cursor pagination is not available for inventory-derived sorts",
            ));
        }

        let mut qb = page_statement(Source::Joined(self.store_id), filter, sort, window);
        let rows = qb
            .build()
            .fetch_all(&**self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_stocked_items", e))?;
        debug!(rows = rows.len(), "fetched stocked page");

        rows.iter()
            .map(|row| flat_item(row).map_err(|e| map_sqlx_error("decode_item", e)))
            .collect()
    }
}
