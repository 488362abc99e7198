//! Catalog query engine: compile → select → execute → assemble.

use tracing::{Span, debug, field, instrument, warn};

use catalog_core::{ItemId, TenantId};

use crate::assembler::{ItemDetail, ResultAssembler};
use crate::cursor::{self, CursorPayload};
use crate::error::QueryError;
use crate::executor::{CatalogBackend, PageWindow};
use crate::filter::{CatalogQueryParams, compile};
use crate::page::{CatalogPage, OffsetPage, SeekPage, total_pages};
use crate::scope::StoreScope;
use crate::strategy::{EntryPoint, PaginationMode, QueryPlan, select};

/// Read-only catalog query service over a storage backend.
///
/// Holds no per-request state; a single instance is shared by all callers.
#[derive(Debug, Clone)]
pub struct CatalogQueryEngine<B> {
    backend: B,
    assembler: ResultAssembler,
}

impl<B: CatalogBackend> CatalogQueryEngine<B> {
    pub fn new(backend: B, assembler: ResultAssembler) -> Self {
        Self { backend, assembler }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Page-number listing. A `cursor` without a `page` switches to seek mode.
    #[instrument(
        name = "catalog.list",
        skip(self, params),
        fields(
            tenant_id = params.tenant_id.as_deref(),
            store_scope = field::Empty,
            mode = field::Empty,
            path = field::Empty,
            total = field::Empty,
            returned = field::Empty,
        )
    )]
    pub async fn list(&self, params: &CatalogQueryParams) -> Result<CatalogPage, QueryError> {
        self.run(params, EntryPoint::List).await.inspect_err(log_failure)
    }

    /// Newest-first feed, always cursor-paginated.
    #[instrument(
        name = "catalog.feed",
        skip(self, params),
        fields(
            tenant_id = params.tenant_id.as_deref(),
            store_scope = field::Empty,
            mode = field::Empty,
            path = field::Empty,
            total = field::Empty,
            returned = field::Empty,
        )
    )]
    pub async fn feed(&self, params: &CatalogQueryParams) -> Result<CatalogPage, QueryError> {
        self.run(params, EntryPoint::Feed).await.inspect_err(log_failure)
    }

    /// Single item by id, with the inventory overlay of a concrete store.
    #[instrument(name = "catalog.get_item", skip(self), fields(store_scope = field::Empty))]
    pub async fn get_item(
        &self,
        tenant_id: Option<&str>,
        item_id: &str,
        store_id: Option<&str>,
    ) -> Result<ItemDetail, QueryError> {
        self.lookup(tenant_id, item_id, store_id)
            .await
            .inspect_err(log_failure)
    }

    async fn lookup(
        &self,
        tenant_id: Option<&str>,
        item_id: &str,
        store_id: Option<&str>,
    ) -> Result<ItemDetail, QueryError> {
        let tenant_id = tenant_id
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(TenantId::new)
            .transpose()?;
        let id = ItemId::new(item_id)?;
        let scope = StoreScope::resolve(store_id)?;
        Span::current().record("store_scope", field::display(&scope));

        let row = self
            .backend
            .find_item(tenant_id.as_ref(), &id, &scope)
            .await?
            .ok_or_else(|| QueryError::not_found(format!("catalog item {id}")))?;
        Ok(self.assembler.assemble_detail(&row))
    }

    async fn run(
        &self,
        params: &CatalogQueryParams,
        entry: EntryPoint,
    ) -> Result<CatalogPage, QueryError> {
        let compiled = compile(params)?;
        let plan = select(compiled, entry)?;

        let span = Span::current();
        span.record("store_scope", field::display(&plan.scope));
        span.record("mode", plan.mode.as_str());
        span.record("path", plan.path.as_str());

        let page = self.execute(&plan).await?;

        span.record("total", page.total());
        span.record("returned", page.items().len());
        Ok(page)
    }

    async fn execute(&self, plan: &QueryPlan) -> Result<CatalogPage, QueryError> {
        let executor = self.backend.executor(&plan.path);
        // Count and page are separate round trips; `total` may lag the page
        // under concurrent writes.
        let total = executor.count(&plan.filter).await?;

        match &plan.mode {
            PaginationMode::Offset { page, limit } => {
                let window = PageWindow::offset((page - 1) * limit, *limit);
                let rows = executor.fetch(&plan.filter, &plan.sort, &window).await?;
                Ok(CatalogPage::Offset(OffsetPage {
                    items: self.assembler.assemble_all(&rows),
                    total,
                    page: *page,
                    total_pages: total_pages(total, *limit),
                    limit: *limit,
                }))
            }
            PaginationMode::Seek { after, limit } => {
                let window = PageWindow::seek(after.clone(), limit + 1);
                let mut rows = executor.fetch(&plan.filter, &plan.sort, &window).await?;

                let next_cursor = if rows.len() as u64 > *limit {
                    rows.truncate(*limit as usize);
                    rows.last().map(|row| {
                        let core = row.core();
                        cursor::encode(&CursorPayload::new(core.created_at, core.id.clone()))
                    })
                } else {
                    None
                };

                Ok(CatalogPage::Seek(SeekPage {
                    items: self.assembler.assemble_all(&rows),
                    next_cursor,
                    total,
                }))
            }
        }
    }
}

fn log_failure(err: &QueryError) {
    if err.is_client_error() {
        debug!(error = %err, "catalog query rejected");
    } else {
        warn!(error = %err, "catalog query failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{Duration, TimeZone, Utc};

    use catalog_core::{BcgTag, Visibility};

    use crate::executor::Executor;
    use crate::filter::ItemFilter;
    use crate::row::{FlatItemRow, ItemCore, ItemDetailRow, ItemRow};
    use crate::sort::SortSpec;
    use crate::strategy::ExecutionPath;

    /// Serves `rows` verbatim (already ordered) and records every round trip.
    #[derive(Default)]
    struct StubBackend {
        rows: Vec<ItemRow>,
        calls: AtomicUsize,
        windows: Mutex<Vec<PageWindow>>,
        fail: bool,
    }

    struct StubExecutor<'a>(&'a StubBackend);

    #[async_trait::async_trait]
    impl Executor for StubExecutor<'_> {
        async fn count(&self, _filter: &ItemFilter) -> Result<u64, QueryError> {
            self.0.calls.fetch_add(1, Ordering::SeqCst);
            if self.0.fail {
                return Err(QueryError::storage("count: connection refused"));
            }
            Ok(self.0.rows.len() as u64)
        }

        async fn fetch(
            &self,
            _filter: &ItemFilter,
            _sort: &SortSpec,
            window: &PageWindow,
        ) -> Result<Vec<ItemRow>, QueryError> {
            self.0.calls.fetch_add(1, Ordering::SeqCst);
            self.0.windows.lock().unwrap().push(window.clone());
            Ok(self
                .0
                .rows
                .iter()
                .filter(|r| {
                    window
                        .after
                        .as_ref()
                        .is_none_or(|c| c.admits(&r.core().created_at, &r.core().id))
                })
                .skip(window.offset as usize)
                .take(window.take as usize)
                .cloned()
                .collect())
        }
    }

    #[async_trait::async_trait]
    impl CatalogBackend for StubBackend {
        fn executor<'a>(&'a self, _path: &'a ExecutionPath) -> Box<dyn Executor + 'a> {
            Box::new(StubExecutor(self))
        }

        async fn find_item(
            &self,
            _tenant_id: Option<&TenantId>,
            _id: &ItemId,
            _scope: &StoreScope,
        ) -> Result<Option<ItemDetailRow>, QueryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    fn rows(n: usize) -> Vec<ItemRow> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .rev()
            .map(|i| {
                ItemRow::Flat(FlatItemRow {
                    core: ItemCore {
                        id: ItemId::new(format!("item-{i:03}")).unwrap(),
                        tenant_id: TenantId::new("t1").unwrap(),
                        store_id: None,
                        title: format!("Item {i}"),
                        sku: None,
                        barcode: None,
                        bcg_tag: BcgTag::Unclassified,
                        item_type: "PRODUCT".into(),
                        visibility: Visibility::Visible,
                        is_featured: false,
                        sell_unit: "UNIT".into(),
                        tax_rate: None,
                        thumbnail_url: None,
                        created_at: base + Duration::minutes(i as i64),
                        updated_at: base + Duration::minutes(i as i64),
                    },
                    brand_name: None,
                    primary_category_name: None,
                    on_hand: None,
                    reserved: None,
                    reorder_point: None,
                    lot_code: None,
                    expires_at: None,
                })
            })
            .collect()
    }

    fn engine(rows: Vec<ItemRow>) -> CatalogQueryEngine<StubBackend> {
        CatalogQueryEngine::new(
            StubBackend { rows, ..Default::default() },
            ResultAssembler::default(),
        )
    }

    #[tokio::test]
    async fn validation_failures_never_reach_storage() {
        let engine = engine(rows(3));
        let bad = [
            CatalogQueryParams { sort_by: Some("stockOnHand".into()), ..Default::default() },
            CatalogQueryParams { cursor: Some("not-base64!!".into()), ..Default::default() },
            CatalogQueryParams { visibility: Some("SECRET".into()), ..Default::default() },
        ];
        for params in bad {
            assert!(engine.list(&params).await.is_err());
        }
        let feed_with_page = CatalogQueryParams { page: Some(2), ..Default::default() };
        assert!(matches!(
            engine.feed(&feed_with_page).await,
            Err(QueryError::Validation(_))
        ));
        assert_eq!(engine.backend().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn offset_mode_issues_count_then_page() {
        let engine = engine(rows(45));
        let params = CatalogQueryParams { page: Some(3), ..Default::default() };
        let CatalogPage::Offset(page) = engine.list(&params).await.unwrap() else {
            panic!("expected offset page");
        };
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 3);
        assert_eq!(page.items.len(), 5);
        assert_eq!(engine.backend().calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            engine.backend().windows.lock().unwrap()[0],
            PageWindow::offset(40, 20)
        );
    }

    #[tokio::test]
    async fn seek_mode_fetches_one_extra_row() {
        let engine = engine(rows(5));
        let params = CatalogQueryParams { limit: Some(2), ..Default::default() };

        let CatalogPage::Seek(first) = engine.feed(&params).await.unwrap() else {
            panic!("expected seek page");
        };
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.total, 5);
        assert_eq!(engine.backend().windows.lock().unwrap()[0].take, 3);

        let token = first.next_cursor.clone().unwrap();
        let decoded = cursor::decode(&token).unwrap();
        assert_eq!(decoded.id.as_str(), first.items[1].id);

        let mut seen: Vec<String> = first.items.iter().map(|i| i.id.clone()).collect();
        let mut next = Some(token);
        while let Some(token) = next {
            let params = CatalogQueryParams {
                limit: Some(2),
                cursor: Some(token),
                ..Default::default()
            };
            let CatalogPage::Seek(page) = engine.feed(&params).await.unwrap() else {
                panic!("expected seek page");
            };
            for item in &page.items {
                assert!(!seen.contains(&item.id));
                seen.push(item.id.clone());
            }
            next = page.next_cursor;
        }
        assert_eq!(seen.len(), 5);
    }

    #[tokio::test]
    async fn exact_fill_has_no_next_cursor() {
        let engine = engine(rows(2));
        let params = CatalogQueryParams { limit: Some(2), ..Default::default() };
        let CatalogPage::Seek(page) = engine.feed(&params).await.unwrap() else {
            panic!("expected seek page");
        };
        assert_eq!(page.items.len(), 2);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn storage_errors_pass_through() {
        let engine = CatalogQueryEngine::new(
            StubBackend { rows: rows(1), fail: true, ..Default::default() },
            ResultAssembler::default(),
        );
        assert!(matches!(
            engine.list(&CatalogQueryParams::default()).await,
            Err(QueryError::StorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let engine = engine(vec![]);
        assert!(matches!(
            engine.get_item(None, "nope", None).await,
            Err(QueryError::NotFound(_))
        ));
        assert!(matches!(
            engine.get_item(None, "  ", None).await,
            Err(QueryError::Validation(_))
        ));
    }
}
