//! Raw row shapes produced by executors.
//!
//! Executors either project brand/category names flat in the statement
//! (`Flat`) or hand back the relational graph with related records attached
//! (`Nested`). The result assembler accepts both.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use catalog_core::{BcgTag, BrandId, CategoryId, ItemId, StoreId, TenantId, Visibility};

/// Columns every row shape carries.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemCore {
    pub id: ItemId,
    pub tenant_id: TenantId,
    pub store_id: Option<StoreId>,
    pub title: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub bcg_tag: BcgTag,
    pub item_type: String,
    pub visibility: Visibility,
    pub is_featured: bool,
    pub sell_unit: String,
    pub tax_rate: Option<Decimal>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One store's stock state for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct InventorySnapshot {
    pub on_hand: Decimal,
    pub reserved: Decimal,
    pub reorder_point: Option<Decimal>,
    pub lot_code: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl InventorySnapshot {
    pub fn available(&self) -> Decimal {
        self.on_hand - self.reserved
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrandRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryLink {
    pub name: String,
    pub is_primary: bool,
}

/// Relational-graph shape: related records attached as collections.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedItemRow {
    pub core: ItemCore,
    pub brand: Option<BrandRef>,
    pub categories: Vec<CategoryLink>,
    /// At most one element: the snapshot of the overlaid store.
    pub stock_items: Vec<InventorySnapshot>,
}

/// Statement-projection shape: related names and snapshot columns inline.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatItemRow {
    pub core: ItemCore,
    pub brand_name: Option<String>,
    pub primary_category_name: Option<String>,
    pub on_hand: Option<Decimal>,
    pub reserved: Option<Decimal>,
    pub reorder_point: Option<Decimal>,
    pub lot_code: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemRow {
    Nested(NestedItemRow),
    Flat(FlatItemRow),
}

impl ItemRow {
    pub fn core(&self) -> &ItemCore {
        match self {
            ItemRow::Nested(row) => &row.core,
            ItemRow::Flat(row) => &row.core,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrandRecord {
    pub id: BrandId,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
    pub is_primary: bool,
}

/// Single-item lookup result.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDetailRow {
    pub core: ItemCore,
    pub description: Option<String>,
    pub is_weighable: bool,
    pub tracks_stock: bool,
    pub brand: Option<BrandRecord>,
    pub categories: Vec<CategoryRecord>,
    /// Present only when a concrete store was requested and it holds a snapshot.
    pub inventory: Option<InventorySnapshot>,
}
