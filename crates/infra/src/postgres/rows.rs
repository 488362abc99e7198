// SQLx row types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::postgres::PgRow;

use catalog_core::{BrandId, CategoryId, DomainError, ItemId, StoreId, TenantId};
use catalog_query::row::{
    BrandRecord, CategoryRecord, FlatItemRow, InventorySnapshot, ItemCore, ItemRow,
};

fn decode_err(column: &str, err: DomainError) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    }
}

fn parsed<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = DomainError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e| decode_err(column, e))
}

fn parsed_opt<T>(row: &PgRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: FromStr<Err = DomainError>,
{
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|v| v.parse().map_err(|e| decode_err(column, e)))
        .transpose()
}

pub(crate) fn item_core(row: &PgRow) -> Result<ItemCore, sqlx::Error> {
    Ok(ItemCore {
        id: parsed::<ItemId>(row, "id")?,
        tenant_id: parsed::<TenantId>(row, "tenant_id")?,
        store_id: parsed_opt::<StoreId>(row, "store_id")?,
        title: row.try_get("title")?,
        sku: row.try_get("sku")?,
        barcode: row.try_get("barcode")?,
        bcg_tag: parsed(row, "bcg_tag")?,
        item_type: row.try_get("item_type")?,
        visibility: parsed(row, "visibility")?,
        is_featured: row.try_get("is_featured")?,
        sell_unit: row.try_get("sell_unit")?,
        tax_rate: row.try_get("tax_rate")?,
        thumbnail_url: row.try_get("thumbnail_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Row produced by either page statement.
pub(crate) fn flat_item(row: &PgRow) -> Result<ItemRow, sqlx::Error> {
    Ok(ItemRow::Flat(FlatItemRow {
        core: item_core(row)?,
        brand_name: row.try_get("brand_name")?,
        primary_category_name: row.try_get("primary_category_name")?,
        on_hand: row.try_get("on_hand")?,
        reserved: row.try_get("reserved")?,
        reorder_point: row.try_get("reorder_point")?,
        lot_code: row.try_get("lot_code")?,
        expires_at: row.try_get("expires_at")?,
    }))
}

/// Brand columns of the detail statement; `None` when the item has no brand.
pub(crate) fn brand(row: &PgRow) -> Result<Option<BrandRecord>, sqlx::Error> {
    let Some(id) = parsed_opt::<BrandId>(row, "brand_id")? else {
        return Ok(None);
    };
    Ok(Some(BrandRecord {
        id,
        name: row.try_get("brand_name")?,
        image_url: row.try_get("brand_image_url")?,
    }))
}

pub(crate) fn category(row: &PgRow) -> Result<CategoryRecord, sqlx::Error> {
    Ok(CategoryRecord {
        id: parsed::<CategoryId>(row, "id")?,
        name: row.try_get("name")?,
        parent_id: parsed_opt::<CategoryId>(row, "parent_id")?,
        is_primary: row.try_get("is_primary")?,
    })
}

pub(crate) fn snapshot(row: &PgRow) -> Result<InventorySnapshot, sqlx::Error> {
    let on_hand: Decimal = row.try_get("on_hand")?;
    let reserved: Decimal = row.try_get("reserved")?;
    let expires_at: Option<DateTime<Utc>> = row.try_get("expires_at")?;
    Ok(InventorySnapshot {
        on_hand,
        reserved,
        reorder_point: row.try_get("reorder_point")?,
        lot_code: row.try_get("lot_code")?,
        expires_at,
    })
}
