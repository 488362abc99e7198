//! Result assembler: raw rows of either shape → canonical records.
//!
//! Pure and deterministic; no I/O.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use catalog_core::{BcgTag, Visibility};

use crate::row::{
    BrandRecord, CategoryRecord, FlatItemRow, InventorySnapshot, ItemCore, ItemDetailRow, ItemRow,
    NestedItemRow,
};

/// Tax rate applied when an item carries none.
pub fn default_tax_rate() -> Decimal {
    Decimal::from(18)
}

/// Canonical list record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub tenant_id: String,
    pub store_id: Option<String>,
    pub title: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub brand_name: Option<String>,
    pub primary_category_name: Option<String>,
    pub bcg_tag: BcgTag,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub stock: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub reorder_point: Option<Decimal>,
    pub lot_code: Option<String>,
    pub expires_at: Option<String>,
    pub item_type: String,
    pub visibility: Visibility,
    pub is_featured: bool,
    pub sell_unit: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_rate: Decimal,
    pub thumbnail_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandView {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub is_primary: bool,
}

/// Canonical single-item record: the list shape plus detail-only fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub description: Option<String>,
    pub is_weighable: bool,
    pub tracks_stock: bool,
    pub brand: Option<BrandView>,
    pub categories: Vec<CategoryView>,
}

/// ISO-8601 in UTC with millisecond precision.
pub fn iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Derived inventory fields; all absent when no snapshot row exists.
#[derive(Debug, Default)]
struct Overlay {
    stock: Option<Decimal>,
    reorder_point: Option<Decimal>,
    lot_code: Option<String>,
    expires_at: Option<String>,
}

impl Overlay {
    fn from_snapshot(snapshot: Option<&InventorySnapshot>) -> Self {
        let Some(s) = snapshot else {
            return Self::default();
        };
        Self {
            stock: Some(s.available()),
            reorder_point: s.reorder_point,
            lot_code: s.lot_code.clone(),
            expires_at: s.expires_at.as_ref().map(iso),
        }
    }

    fn from_flat(row: &FlatItemRow) -> Self {
        Self {
            // A left join that found no snapshot yields NULL quantities.
            stock: match (row.on_hand, row.reserved) {
                (Some(on_hand), Some(reserved)) => Some(on_hand - reserved),
                _ => None,
            },
            reorder_point: row.reorder_point,
            lot_code: row.lot_code.clone(),
            expires_at: row.expires_at.as_ref().map(iso),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResultAssembler {
    default_tax_rate: Decimal,
}

impl Default for ResultAssembler {
    fn default() -> Self {
        Self::new(default_tax_rate())
    }
}

impl ResultAssembler {
    pub fn new(default_tax_rate: Decimal) -> Self {
        Self { default_tax_rate }
    }

    pub fn default_tax_rate(&self) -> Decimal {
        self.default_tax_rate
    }

    pub fn assemble(&self, row: &ItemRow) -> CatalogItem {
        match row {
            ItemRow::Nested(row) => self.assemble_nested(row),
            ItemRow::Flat(row) => self.assemble_flat(row),
        }
    }

    pub fn assemble_all(&self, rows: &[ItemRow]) -> Vec<CatalogItem> {
        rows.iter().map(|r| self.assemble(r)).collect()
    }

    pub fn assemble_detail(&self, row: &ItemDetailRow) -> ItemDetail {
        let primary = row
            .categories
            .iter()
            .find(|c| c.is_primary)
            .map(|c| c.name.clone());
        let item = self.item(
            &row.core,
            row.brand.as_ref().map(|b| b.name.clone()),
            primary,
            Overlay::from_snapshot(row.inventory.as_ref()),
        );
        ItemDetail {
            item,
            description: row.description.clone(),
            is_weighable: row.is_weighable,
            tracks_stock: row.tracks_stock,
            brand: row.brand.as_ref().map(brand_view),
            categories: row.categories.iter().map(category_view).collect(),
        }
    }

    fn assemble_nested(&self, row: &NestedItemRow) -> CatalogItem {
        let primary = row
            .categories
            .iter()
            .find(|c| c.is_primary)
            .map(|c| c.name.clone());
        self.item(
            &row.core,
            row.brand.as_ref().map(|b| b.name.clone()),
            primary,
            Overlay::from_snapshot(row.stock_items.first()),
        )
    }

    fn assemble_flat(&self, row: &FlatItemRow) -> CatalogItem {
        self.item(
            &row.core,
            row.brand_name.clone(),
            row.primary_category_name.clone(),
            Overlay::from_flat(row),
        )
    }

    fn item(
        &self,
        core: &ItemCore,
        brand_name: Option<String>,
        primary_category_name: Option<String>,
        overlay: Overlay,
    ) -> CatalogItem {
        CatalogItem {
            id: core.id.to_string(),
            tenant_id: core.tenant_id.to_string(),
            store_id: core.store_id.as_ref().map(ToString::to_string),
            title: core.title.clone(),
            sku: core.sku.clone(),
            barcode: core.barcode.clone(),
            brand_name,
            primary_category_name,
            bcg_tag: core.bcg_tag,
            stock: overlay.stock,
            reorder_point: overlay.reorder_point,
            lot_code: overlay.lot_code,
            expires_at: overlay.expires_at,
            item_type: core.item_type.clone(),
            visibility: core.visibility,
            is_featured: core.is_featured,
            sell_unit: core.sell_unit.clone(),
            tax_rate: core.tax_rate.unwrap_or(self.default_tax_rate),
            thumbnail_url: core.thumbnail_url.clone(),
            created_at: iso(&core.created_at),
            updated_at: iso(&core.updated_at),
        }
    }
}

fn brand_view(brand: &BrandRecord) -> BrandView {
    BrandView {
        id: brand.id.to_string(),
        name: brand.name.clone(),
        image_url: brand.image_url.clone(),
    }
}

fn category_view(category: &CategoryRecord) -> CategoryView {
    CategoryView {
        id: category.id.to_string(),
        name: category.name.clone(),
        parent_id: category.parent_id.as_ref().map(ToString::to_string),
        is_primary: category.is_primary,
    }
}
