use std::sync::Arc;

use sqlx::{PgPool, Row};
use tracing::{Span, instrument};

use catalog_core::{ItemId, TenantId};
use catalog_query::row::ItemDetailRow;
use catalog_query::{QueryError, StoreScope};

use super::map_sqlx_error;
use super::rows;

/// Item by id with brand, categories, and (for a concrete store) the
/// inventory snapshot. Each relation is a separate round trip.
#[instrument(skip(pool), fields(item_id = %id, found = tracing::field::Empty), err(level = "warn"))]
pub(crate) async fn find_item(
    pool: &Arc<PgPool>,
    tenant_id: Option<&TenantId>,
    id: &ItemId,
    scope: &StoreScope,
) -> Result<Option<ItemDetailRow>, QueryError> {
    let row = sqlx::query(
        r#"
        SELECT
            i.id, i.tenant_id, i.store_id, i.title, i.sku, i.barcode, i.bcg_tag,
            i.item_type, i.visibility, i.is_featured, i.sell_unit, i.tax_rate,
            i.thumbnail_url, i.created_at, i.updated_at,
            i.description, i.is_weighable, i.tracks_stock,
            b.id AS brand_id, b.name AS brand_name, b.image_url AS brand_image_url
        FROM catalog_items i
        LEFT JOIN brands b ON b.id = i.brand_id
        WHERE i.id = $1
            AND ($2::text IS NULL OR i.tenant_id = $2)
        "#,
    )
    .bind(id.as_str())
    .bind(tenant_id.map(TenantId::as_str))
    .fetch_optional(&**pool)
    .await
    .map_err(|e| map_sqlx_error("find_item", e))?;

    let Some(row) = row else {
        Span::current().record("found", false);
        return Ok(None);
    };

    let core = rows::item_core(&row).map_err(|e| map_sqlx_error("decode_item", e))?;
    let brand = rows::brand(&row).map_err(|e| map_sqlx_error("decode_item", e))?;
    let description: Option<String> = row
        .try_get("description")
        .map_err(|e| map_sqlx_error("decode_item", e))?;
    let is_weighable: bool = row
        .try_get("is_weighable")
        .map_err(|e| map_sqlx_error("decode_item", e))?;
    let tracks_stock: bool = row
        .try_get("tracks_stock")
        .map_err(|e| map_sqlx_error("decode_item", e))?;

    let categories = sqlx::query(
        r#"
        SELECT c.id, c.name, c.parent_id, ic.is_primary
        FROM item_categories ic
        JOIN categories c ON c.id = ic.category_id
        WHERE ic.item_id = $1
        ORDER BY ic.is_primary DESC, c.id COLLATE "C" ASC
        "#,
    )
    .bind(id.as_str())
    .fetch_all(&**pool)
    .await
    .map_err(|e| map_sqlx_error("find_item_categories", e))?
    .iter()
    .map(rows::category)
    .collect::<Result<Vec<_>, _>>()
    .map_err(|e| map_sqlx_error("decode_category", e))?;

    let inventory = match scope.store_id() {
        Some(store_id) => sqlx::query(
            r#"
            SELECT
                on_hand, reserved, reorder_point,
                active_lot_code AS lot_code, active_expires_at AS expires_at
            FROM store_inventory
            WHERE tenant_id = $1 AND store_id = $2 AND item_id = $3
            "#,
        )
        .bind(core.tenant_id.as_str())
        .bind(store_id.as_str())
        .bind(id.as_str())
        .fetch_optional(&**pool)
        .await
        .map_err(|e| map_sqlx_error("find_item_inventory", e))?
        .as_ref()
        .map(rows::snapshot)
        .transpose()
        .map_err(|e| map_sqlx_error("decode_inventory", e))?,
        None => None,
    };

    Span::current().record("found", true);
    Ok(Some(ItemDetailRow {
        core,
        description,
        is_weighable,
        tracks_stock,
        brand,
        categories,
        inventory,
    }))
}
