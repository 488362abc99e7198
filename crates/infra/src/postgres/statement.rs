//! SQL statement builders shared by both executors.
//!
//! Count and page statements are assembled from the same `FROM` and `WHERE`
//! fragments, so the two can never filter differently. Every request value is
//! attached with `push_bind`; the SQL text only ever contains fixed fragments.

use sqlx::{Postgres, QueryBuilder};

use catalog_core::StoreId;
use catalog_query::{
    CursorPayload, ItemFilter, PageWindow, SortColumn, SortDir, SortKey, SortSpec,
};

/// How the inventory snapshot table participates in a statement.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Source<'a> {
    /// Items only; snapshot columns project as NULL.
    Items,
    /// Optional one-row snapshot of the given store (`LEFT JOIN`).
    Overlay(&'a StoreId),
    /// Only items holding a snapshot in the given store (`JOIN`).
    Joined(&'a StoreId),
}

impl Source<'_> {
    fn has_snapshot(&self) -> bool {
        !matches!(self, Source::Items)
    }
}

const ITEM_COLUMNS: &str = "i.id, i.tenant_id, i.store_id, i.title, i.sku, i.barcode, \
    i.bcg_tag, i.item_type, i.visibility, i.is_featured, i.sell_unit, i.tax_rate, \
    i.thumbnail_url, i.created_at, i.updated_at";

const RELATED_NAMES: &str = "(SELECT b.name FROM brands b WHERE b.id = i.brand_id) AS brand_name, \
    (SELECT c.name FROM item_categories ic JOIN categories c ON c.id = ic.category_id \
    WHERE ic.item_id = i.id AND ic.is_primary ORDER BY c.id COLLATE \"C\" LIMIT 1) \
    AS primary_category_name";

const SNAPSHOT_COLUMNS: &str = "s.on_hand, s.reserved, s.reorder_point, \
    s.active_lot_code AS lot_code, s.active_expires_at AS expires_at";

const SNAPSHOT_JOIN_ON: &str =
    " ON s.tenant_id = i.tenant_id AND s.item_id = i.id AND s.store_id = ";

const NO_SNAPSHOT_COLUMNS: &str = "NULL::numeric AS on_hand, NULL::numeric AS reserved, \
    NULL::numeric AS reorder_point, NULL::text AS lot_code, NULL::timestamptz AS expires_at";

/// `SELECT COUNT(*)` over the filtered source.
pub(crate) fn count_statement(
    source: Source<'_>,
    filter: &ItemFilter,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) AS total");
    push_from_where(&mut qb, source, filter);
    qb
}

/// Page of rows over the filtered source in `sort.keys()` order.
pub(crate) fn page_statement(
    source: Source<'_>,
    filter: &ItemFilter,
    sort: &SortSpec,
    window: &PageWindow,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(ITEM_COLUMNS);
    qb.push(", ");
    qb.push(RELATED_NAMES);
    qb.push(", ");
    qb.push(if source.has_snapshot() {
        SNAPSHOT_COLUMNS
    } else {
        NO_SNAPSHOT_COLUMNS
    });

    push_from_where(&mut qb, source, filter);
    if let Some(after) = &window.after {
        push_seek(&mut qb, after);
    }
    push_order_by(&mut qb, &sort.keys());

    qb.push(" LIMIT ");
    qb.push_bind(to_i64(window.take));
    qb.push(" OFFSET ");
    qb.push_bind(to_i64(window.offset));
    qb
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn push_from_where(
    qb: &mut QueryBuilder<'static, Postgres>,
    source: Source<'_>,
    filter: &ItemFilter,
) {
    qb.push(" FROM catalog_items i");
    match source {
        Source::Items => {}
        Source::Overlay(store) => {
            qb.push(" LEFT JOIN store_inventory s");
            qb.push(SNAPSHOT_JOIN_ON);
            qb.push_bind(store.to_string());
        }
        Source::Joined(store) => {
            qb.push(" JOIN store_inventory s");
            qb.push(SNAPSHOT_JOIN_ON);
            qb.push_bind(store.to_string());
        }
    }
    push_predicate(qb, filter);
}

/// `WHERE` clause for the compiled filter. Listings only ever see global items.
pub(crate) fn push_predicate(qb: &mut QueryBuilder<'static, Postgres>, filter: &ItemFilter) {
    qb.push(" WHERE i.store_id IS NULL");

    if let Some(tenant) = &filter.tenant_id {
        qb.push(" AND i.tenant_id = ");
        qb.push_bind(tenant.to_string());
    }
    if let Some(text) = &filter.text {
        let pattern = format!("%{}%", escape_like(text));
        qb.push(" AND (");
        for (n, column) in ["i.title", "i.sku", "i.barcode", "i.id"].iter().enumerate() {
            if n > 0 {
                qb.push(" OR ");
            }
            qb.push(*column);
            qb.push(" ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" ESCAPE '\\'");
        }
        qb.push(")");
    }
    if let Some(sku) = &filter.sku {
        qb.push(" AND i.sku = ");
        qb.push_bind(sku.clone());
    }
    if let Some(barcode) = &filter.barcode {
        qb.push(" AND i.barcode = ");
        qb.push_bind(barcode.clone());
    }
    if let Some(brand) = &filter.brand_id {
        qb.push(" AND i.brand_id = ");
        qb.push_bind(brand.to_string());
    }
    if let Some(category) = &filter.category_id {
        qb.push(" AND EXISTS (SELECT 1 FROM item_categories fc");
        qb.push(" WHERE fc.item_id = i.id AND fc.category_id = ");
        qb.push_bind(category.to_string());
        qb.push(")");
    }
    if let Some(tag) = filter.bcg_tag {
        qb.push(" AND i.bcg_tag = ");
        qb.push_bind(tag.as_str());
    }
    if let Some(visibility) = filter.visibility {
        qb.push(" AND i.visibility = ");
        qb.push_bind(visibility.as_str());
    }
}

/// Rows strictly after the cursor in `(created_at DESC, id DESC)` order.
fn push_seek(qb: &mut QueryBuilder<'static, Postgres>, after: &CursorPayload) {
    qb.push(" AND (i.created_at < ");
    qb.push_bind(after.sort_timestamp);
    qb.push(" OR (i.created_at = ");
    qb.push_bind(after.sort_timestamp);
    qb.push(" AND i.id COLLATE \"C\" < ");
    qb.push_bind(after.id.to_string());
    qb.push("))");
}

fn push_order_by(qb: &mut QueryBuilder<'static, Postgres>, keys: &[SortKey]) {
    qb.push(" ORDER BY ");
    for (n, key) in keys.iter().enumerate() {
        if n > 0 {
            qb.push(", ");
        }
        qb.push(column_expr(key.column));
        qb.push(match key.dir {
            SortDir::Asc => " ASC",
            SortDir::Desc => " DESC",
        });
        if key.nulls_last {
            qb.push(" NULLS LAST");
        }
    }
}

/// Text columns order bytewise so results match the in-memory backend and
/// the cursor comparison.
fn column_expr(column: SortColumn) -> &'static str {
    match column {
        SortColumn::CreatedAt => "i.created_at",
        SortColumn::UpdatedAt => "i.updated_at",
        SortColumn::Title => "i.title COLLATE \"C\"",
        SortColumn::Sku => "i.sku COLLATE \"C\"",
        SortColumn::Barcode => "i.barcode COLLATE \"C\"",
        SortColumn::Visibility => "i.visibility COLLATE \"C\"",
        SortColumn::IsFeatured => "i.is_featured",
        SortColumn::AvailableStock => "(s.on_hand - s.reserved)",
        SortColumn::ReorderPoint => "s.reorder_point",
        SortColumn::LotExpiresAt => "s.active_expires_at",
        SortColumn::Id => "i.id COLLATE \"C\"",
    }
}

/// Escape `LIKE` metacharacters so user text matches literally.
pub(crate) fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
