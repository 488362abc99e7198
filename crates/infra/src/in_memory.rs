//! In-memory catalog backend for tests/dev.
//!
//! Mirrors the Postgres executors: the same global-only restriction, the same
//! key order from `SortSpec::keys()` (text compared bytewise, nulls last where
//! flagged) and the same inner-join semantics for inventory-derived sorts.
//! The generic path hands back nested rows; the join path flat rows.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use catalog_core::{
    BcgTag, BrandId, CategoryId, DomainError, DomainResult, ItemId, StoreId, TenantId, Visibility,
};
use catalog_query::row::{
    BrandRecord, BrandRef, CategoryLink, CategoryRecord, FlatItemRow, InventorySnapshot, ItemCore,
    ItemDetailRow, ItemRow, NestedItemRow,
};
use catalog_query::{
    CatalogBackend, ExecutionPath, Executor, ItemFilter, PageWindow, QueryError, SortColumn,
    SortDir, SortKey, SortSpec, StoreScope,
};

/// A stored catalog item with its write-side attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub core: ItemCore,
    pub brand_id: Option<BrandId>,
    pub description: Option<String>,
    pub is_weighable: bool,
    pub tracks_stock: bool,
}

impl ItemRecord {
    /// A visible, unclassified global product with no optional attributes.
    pub fn new(
        tenant_id: TenantId,
        id: ItemId,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            core: ItemCore {
                id,
                tenant_id,
                store_id: None,
                title: title.into(),
                sku: None,
                barcode: None,
                bcg_tag: BcgTag::default(),
                item_type: "PRODUCT".to_string(),
                visibility: Visibility::Visible,
                is_featured: false,
                sell_unit: "UNIT".to_string(),
                tax_rate: None,
                thumbnail_url: None,
                created_at,
                updated_at: created_at,
            },
            brand_id: None,
            description: None,
            is_weighable: false,
            tracks_stock: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrandEntry {
    pub id: BrandId,
    pub tenant_id: TenantId,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryEntry {
    pub id: CategoryId,
    pub tenant_id: TenantId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

#[derive(Debug, Default)]
struct CatalogData {
    items: BTreeMap<ItemId, ItemRecord>,
    brands: HashMap<BrandId, BrandEntry>,
    categories: HashMap<CategoryId, CategoryEntry>,
    /// `(item, category) -> is_primary`, ordered by item then category id.
    links: BTreeMap<(ItemId, CategoryId), bool>,
    inventory: HashMap<(TenantId, StoreId, ItemId), InventorySnapshot>,
}

/// In-memory catalog store.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    inner: RwLock<CatalogData>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an item. `(tenant_id, sku)` must stay unique.
    pub fn upsert_item(&self, item: ItemRecord) -> DomainResult<()> {
        let mut data = self.write()?;
        if let Some(sku) = &item.core.sku {
            let clash = data.items.values().any(|other| {
                other.core.id != item.core.id
                    && other.core.tenant_id == item.core.tenant_id
                    && other.core.sku.as_ref() == Some(sku)
            });
            if clash {
                return Err(DomainError::validation(format!(
                    "sku {sku} already exists for tenant {}",
                    item.core.tenant_id
                )));
            }
        }
        data.items.insert(item.core.id.clone(), item);
        Ok(())
    }

    /// Remove an item with its category links and inventory snapshots.
    pub fn remove_item(&self, id: &ItemId) -> DomainResult<()> {
        let mut data = self.write()?;
        data.items.remove(id);
        data.links.retain(|(item_id, _), _| item_id != id);
        data.inventory.retain(|(_, _, item_id), _| item_id != id);
        Ok(())
    }

    pub fn upsert_brand(&self, brand: BrandEntry) -> DomainResult<()> {
        self.write()?.brands.insert(brand.id.clone(), brand);
        Ok(())
    }

    pub fn upsert_category(&self, category: CategoryEntry) -> DomainResult<()> {
        self.write()?.categories.insert(category.id.clone(), category);
        Ok(())
    }

    pub fn link_category(
        &self,
        item_id: ItemId,
        category_id: CategoryId,
        is_primary: bool,
    ) -> DomainResult<()> {
        self.write()?.links.insert((item_id, category_id), is_primary);
        Ok(())
    }

    /// Insert or replace the snapshot for `(tenant, store, item)`.
    pub fn upsert_inventory(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        item_id: ItemId,
        snapshot: InventorySnapshot,
    ) -> DomainResult<()> {
        self.write()?
            .inventory
            .insert((tenant_id, store_id, item_id), snapshot);
        Ok(())
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, CatalogData>> {
        self.inner
            .write()
            .map_err(|_| DomainError::validation("in-memory catalog lock poisoned"))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CatalogData>, QueryError> {
        self.inner
            .read()
            .map_err(|_| QueryError::storage("in-memory catalog lock poisoned"))
    }
}

impl CatalogData {
    fn matches(&self, item: &ItemRecord, filter: &ItemFilter) -> bool {
        let core = &item.core;
        if core.store_id.is_some() {
            return false;
        }
        if filter.tenant_id.as_ref().is_some_and(|t| *t != core.tenant_id) {
            return false;
        }
        if let Some(needle) = filter.text_needle() {
            let hit = core.title.to_lowercase().contains(&needle)
                || core.sku.as_ref().is_some_and(|s| s.to_lowercase().contains(&needle))
                || core.barcode.as_ref().is_some_and(|b| b.to_lowercase().contains(&needle))
                || core.id.as_str().to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if filter.sku.is_some() && filter.sku != core.sku {
            return false;
        }
        if filter.barcode.is_some() && filter.barcode != core.barcode {
            return false;
        }
        if filter.brand_id.is_some() && filter.brand_id != item.brand_id {
            return false;
        }
        if let Some(category) = &filter.category_id {
            if !self.links.contains_key(&(core.id.clone(), category.clone())) {
                return false;
            }
        }
        if filter.bcg_tag.is_some_and(|t| t != core.bcg_tag) {
            return false;
        }
        if filter.visibility.is_some_and(|v| v != core.visibility) {
            return false;
        }
        true
    }

    fn snapshot(&self, core: &ItemCore, store_id: &StoreId) -> Option<&InventorySnapshot> {
        self.inventory
            .get(&(core.tenant_id.clone(), store_id.clone(), core.id.clone()))
    }

    /// Matching items paired with the store snapshot. With `inner_join`,
    /// items lacking a snapshot are dropped.
    fn candidates<'a>(
        &'a self,
        filter: &ItemFilter,
        store: Option<&StoreId>,
        inner_join: bool,
    ) -> Vec<(&'a ItemRecord, Option<&'a InventorySnapshot>)> {
        self.items
            .values()
            .filter(|item| self.matches(item, filter))
            .map(|item| (item, store.and_then(|s| self.snapshot(&item.core, s))))
            .filter(|(_, snapshot)| !inner_join || snapshot.is_some())
            .collect()
    }

    /// Category links of an item, ordered by category id.
    fn links_of<'a>(
        &'a self,
        item_id: &'a ItemId,
    ) -> impl Iterator<Item = (&'a CategoryEntry, bool)> + 'a {
        self.links
            .iter()
            .filter(move |((owner, _), _)| owner == item_id)
            .filter_map(|((_, category_id), is_primary)| {
                self.categories.get(category_id).map(|c| (c, *is_primary))
            })
    }

    fn brand_of(&self, item: &ItemRecord) -> Option<&BrandEntry> {
        item.brand_id.as_ref().and_then(|id| self.brands.get(id))
    }

    fn nested_row(&self, item: &ItemRecord, snapshot: Option<&InventorySnapshot>) -> ItemRow {
        ItemRow::Nested(NestedItemRow {
            core: item.core.clone(),
            brand: self.brand_of(item).map(|b| BrandRef { name: b.name.clone() }),
            categories: self
                .links_of(&item.core.id)
                .map(|(c, is_primary)| CategoryLink {
                    name: c.name.clone(),
                    is_primary,
                })
                .collect(),
            stock_items: snapshot.cloned().into_iter().collect(),
        })
    }

    fn flat_row(&self, item: &ItemRecord, snapshot: Option<&InventorySnapshot>) -> ItemRow {
        ItemRow::Flat(FlatItemRow {
            core: item.core.clone(),
            brand_name: self.brand_of(item).map(|b| b.name.clone()),
            primary_category_name: self
                .links_of(&item.core.id)
                .find(|(_, is_primary)| *is_primary)
                .map(|(c, _)| c.name.clone()),
            on_hand: snapshot.map(|s| s.on_hand),
            reserved: snapshot.map(|s| s.reserved),
            reorder_point: snapshot.and_then(|s| s.reorder_point),
            lot_code: snapshot.and_then(|s| s.lot_code.clone()),
            expires_at: snapshot.and_then(|s| s.expires_at),
        })
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue<'a> {
    Time(DateTime<Utc>),
    Text(&'a str),
    Flag(bool),
    Amount(Decimal),
}

fn sort_value<'a>(
    column: SortColumn,
    item: &'a ItemRecord,
    snapshot: Option<&'a InventorySnapshot>,
) -> Option<SortValue<'a>> {
    let core = &item.core;
    match column {
        SortColumn::CreatedAt => Some(SortValue::Time(core.created_at)),
        SortColumn::UpdatedAt => Some(SortValue::Time(core.updated_at)),
        SortColumn::Title => Some(SortValue::Text(&core.title)),
        SortColumn::Sku => core.sku.as_deref().map(SortValue::Text),
        SortColumn::Barcode => core.barcode.as_deref().map(SortValue::Text),
        SortColumn::Visibility => Some(SortValue::Text(core.visibility.as_str())),
        SortColumn::IsFeatured => Some(SortValue::Flag(core.is_featured)),
        SortColumn::AvailableStock => snapshot.map(|s| SortValue::Amount(s.available())),
        SortColumn::ReorderPoint => snapshot.and_then(|s| s.reorder_point).map(SortValue::Amount),
        SortColumn::LotExpiresAt => snapshot.and_then(|s| s.expires_at).map(SortValue::Time),
        SortColumn::Id => Some(SortValue::Text(core.id.as_str())),
    }
}

fn compare_key(key: &SortKey, a: Option<SortValue<'_>>, b: Option<SortValue<'_>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match key.dir {
            SortDir::Asc => a.cmp(&b),
            SortDir::Desc => b.cmp(&a),
        },
    }
}

type Candidate<'a> = (&'a ItemRecord, Option<&'a InventorySnapshot>);

/// Order, seek and slice candidates the way the SQL statements do.
fn ordered_window<'a>(
    mut rows: Vec<Candidate<'a>>,
    sort: &SortSpec,
    window: &PageWindow,
) -> Vec<Candidate<'a>> {
    let keys = sort.keys();
    rows.sort_by(|(ia, sa), (ib, sb)| {
        keys.iter()
            .map(|k| compare_key(k, sort_value(k.column, ia, *sa), sort_value(k.column, ib, *sb)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    let offset = usize::try_from(window.offset).unwrap_or(usize::MAX);
    let take = usize::try_from(window.take).unwrap_or(usize::MAX);
    rows.into_iter()
        .filter(|(item, _)| {
            window
                .after
                .as_ref()
                .is_none_or(|c| c.admits(&item.core.created_at, &item.core.id))
        })
        .skip(offset)
        .take(take)
        .collect()
}

/// Generic path over the in-memory store.
#[derive(Debug)]
pub struct InMemoryGenericExecutor<'a> {
    catalog: &'a InMemoryCatalog,
    overlay: Option<&'a StoreId>,
}

#[async_trait::async_trait]
impl Executor for InMemoryGenericExecutor<'_> {
    async fn count(&self, filter: &ItemFilter) -> Result<u64, QueryError> {
        let data = self.catalog.read()?;
        Ok(data.candidates(filter, None, false).len() as u64)
    }

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
        let data = self.catalog.read()?;
        let candidates = data.candidates(filter, self.overlay, false);
        Ok(ordered_window(candidates, sort, window)
            .into_iter()
            .map(|(item, snapshot)| data.nested_row(item, snapshot))
            .collect())
    }
}

/// Inventory-join path over the in-memory store.
#[derive(Debug)]
pub struct InMemoryJoinExecutor<'a> {
    catalog: &'a InMemoryCatalog,
    store_id: &'a StoreId,
}

#[async_trait::async_trait]
impl Executor for InMemoryJoinExecutor<'_> {
    async fn count(&self, filter: &ItemFilter) -> Result<u64, QueryError> {
        let data = self.catalog.read()?;
        Ok(data.candidates(filter, Some(self.store_id), true).len() as u64)
    }

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
        let data = self.catalog.read()?;
        let candidates = data.candidates(filter, Some(self.store_id), true);
        Ok(ordered_window(candidates, sort, window)
            .into_iter()
            .map(|(item, snapshot)| data.flat_row(item, snapshot))
            .collect())
    }
}

#[async_trait::async_trait]
impl CatalogBackend for InMemoryCatalog {
    fn executor<'a>(&'a self, path: &'a ExecutionPath) -> Box<dyn Executor + 'a> {
        match path {
            ExecutionPath::Generic { overlay } => Box::new(InMemoryGenericExecutor {
                catalog: self,
                overlay: overlay.as_ref(),
            }),
            ExecutionPath::InventoryJoin(store_id) => Box::new(InMemoryJoinExecutor {
                catalog: self,
                store_id,
            }),
        }
    }

    async fn find_item(
        &self,
        tenant_id: Option<&TenantId>,
        id: &ItemId,
        scope: &StoreScope,
    ) -> Result<Option<ItemDetailRow>, QueryError> {
        let data = self.read()?;
        let Some(item) = data.items.get(id) else {
            return Ok(None);
        };
        if tenant_id.is_some_and(|t| *t != item.core.tenant_id) {
            return Ok(None);
        }

        let mut categories: Vec<CategoryRecord> = data
            .links_of(id)
            .map(|(c, is_primary)| CategoryRecord {
                id: c.id.clone(),
                name: c.name.clone(),
                parent_id: c.parent_id.clone(),
                is_primary,
            })
            .collect();
        // Primary first; the sort is stable so ids stay ascending within each group.
        categories.sort_by_key(|c| !c.is_primary);

        Ok(Some(ItemDetailRow {
            core: item.core.clone(),
            description: item.description.clone(),
            is_weighable: item.is_weighable,
            tracks_stock: item.tracks_stock,
            brand: data.brand_of(item).map(|b| BrandRecord {
                id: b.id.clone(),
                name: b.name.clone(),
                image_url: b.image_url.clone(),
            }),
            categories,
            inventory: scope
                .store_id()
                .and_then(|s| data.snapshot(&item.core, s))
                .cloned(),
        }))
    }
}
