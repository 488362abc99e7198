//! Filter compiler: raw request parameters → validated, canonical query.
//!
//! Compilation is synchronous and total: every rejection happens here, before
//! any storage round trip. The output is a typed predicate (one field per
//! filter dimension) that storage backends render without further checks.

use serde::Deserialize;

use catalog_core::{BcgTag, BrandId, CategoryId, TenantId, Visibility};

use crate::cursor::{self, CursorPayload};
use crate::error::QueryError;
use crate::scope::StoreScope;
use crate::sort::{SortDir, SortField, SortSpec};

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 250;
pub const DEFAULT_PAGE: u64 = 1;

const MAX_TEXT_LEN: usize = 80;
const MAX_SKU_LEN: usize = 80;
const MAX_BARCODE_LEN: usize = 32;

/// Raw catalog listing parameters, exactly as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQueryParams {
    pub q: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub brand_id: Option<String>,
    pub category_id: Option<String>,
    pub bcg_tag: Option<String>,
    pub visibility: Option<String>,
    pub tenant_id: Option<String>,
    pub store_id: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
    pub cursor: Option<String>,
}

/// Canonical item predicate.
///
/// All present dimensions are AND-combined. Catalog listings are always
/// restricted to global catalog entries (`store_id IS NULL` on the item).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub tenant_id: Option<TenantId>,
    /// Case-insensitive substring over title, sku, barcode and id.
    pub text: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub brand_id: Option<BrandId>,
    pub category_id: Option<CategoryId>,
    pub bcg_tag: Option<BcgTag>,
    pub visibility: Option<Visibility>,
}

impl ItemFilter {
    /// The free-text needle, lowercased for case-insensitive matching.
    pub fn text_needle(&self) -> Option<String> {
        self.text.as_ref().map(|t| t.to_lowercase())
    }
}

/// Output of the filter compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub filter: ItemFilter,
    pub scope: StoreScope,
    pub sort: SortSpec,
    pub page: u64,
    pub limit: u64,
    /// `true` when the caller sent an explicit `page` parameter.
    pub page_requested: bool,
    pub cursor: Option<CursorPayload>,
}

impl CompiledQuery {
    /// Row offset of the requested page.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

/// Clamp a requested limit into `[1, MAX_LIMIT]`.
pub fn clamp_limit(limit: Option<i64>) -> u64 {
    match limit {
        None => DEFAULT_LIMIT,
        Some(l) => l.clamp(1, MAX_LIMIT as i64) as u64,
    }
}

/// Clamp a requested page to `>= 1`.
pub fn clamp_page(page: Option<i64>) -> u64 {
    match page {
        None => DEFAULT_PAGE,
        Some(p) => p.max(1) as u64,
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn bounded(name: &str, value: Option<&String>, max: usize) -> Result<Option<String>, QueryError> {
    match non_blank(value) {
        None => Ok(None),
        Some(v) if v.chars().count() > max => Err(QueryError::validation(format!(
            "{name} must be at most {max} characters"
        ))),
        Some(v) => Ok(Some(v.to_string())),
    }
}

fn parsed<T>(value: Option<&String>) -> Result<Option<T>, QueryError>
where
    T: core::str::FromStr,
    QueryError: From<T::Err>,
{
    non_blank(value).map(|v| v.parse::<T>()).transpose().map_err(QueryError::from)
}

/// Compile raw parameters.
///
/// Fails with [`QueryError::Validation`] when an inventory-derived sort is
/// requested without a concrete store, when a value is malformed, or when the
/// requested page lies beyond any addressable offset; fails with
/// [`QueryError::CursorDecode`] when the cursor cannot be decoded.
pub fn compile(params: &CatalogQueryParams) -> Result<CompiledQuery, QueryError> {
    let scope = StoreScope::resolve(params.store_id.as_deref())?;

    let sort_field = parsed::<SortField>(params.sort_by.as_ref())?.unwrap_or_default();
    let sort_dir = parsed::<SortDir>(params.sort_dir.as_ref())?.unwrap_or_default();
    let sort = SortSpec::new(sort_field, sort_dir);

    if sort.is_inventory_derived() && !scope.is_concrete_store() {
        return Err(QueryError::validation(format!(
            "sorting by {sort_field} requires a concrete storeId (got {scope})"
        )));
    }

    let sku = bounded("sku", params.sku.as_ref(), MAX_SKU_LEN)?;
    let barcode = bounded("barcode", params.barcode.as_ref(), MAX_BARCODE_LEN)?;
    let text = bounded("q", params.q.as_ref(), MAX_TEXT_LEN)?;
    // An exact identifier beats a fuzzy search.
    let text = if sku.is_some() || barcode.is_some() { None } else { text };

    let filter = ItemFilter {
        tenant_id: parsed::<TenantId>(params.tenant_id.as_ref())?,
        text,
        sku,
        barcode,
        brand_id: parsed::<BrandId>(params.brand_id.as_ref())?,
        category_id: parsed::<CategoryId>(params.category_id.as_ref())?,
        bcg_tag: parsed::<BcgTag>(params.bcg_tag.as_ref())?,
        visibility: parsed::<Visibility>(params.visibility.as_ref())?,
    };

    let limit = clamp_limit(params.limit);
    let page = clamp_page(params.page);
    if (page - 1).checked_mul(limit).is_none_or(|offset| offset > i64::MAX as u64) {
        return Err(QueryError::validation(format!(
            "page {page} is out of range for limit {limit}"
        )));
    }

    let cursor = non_blank(params.cursor.as_ref()).map(cursor::decode).transpose()?;

    Ok(CompiledQuery {
        filter,
        scope,
        sort,
        page,
        limit,
        page_requested: params.page.is_some(),
        cursor,
    })
}
