use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};

use catalog_query::CatalogQueryParams;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `GET /catalog/items`: offset listing, or seek when only a cursor is sent.
pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<CatalogQueryParams>, QueryRejection>,
) -> axum::response::Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };
    match services.list(&params).await {
        Ok(page) => (StatusCode::OK, Json(dto::Envelope::new(page))).into_response(),
        Err(e) => errors::query_error_to_response(e),
    }
}

/// `GET /catalog/items/feed`: newest-first, cursor-paginated.
pub async fn feed_items(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<CatalogQueryParams>, QueryRejection>,
) -> axum::response::Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };
    match services.feed(&params).await {
        Ok(page) => (StatusCode::OK, Json(dto::Envelope::new(page))).into_response(),
        Err(e) => errors::query_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    query: Result<Query<dto::ItemLookupQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };
    match services
        .get_item(query.tenant_id.as_deref(), &id, query.store_id.as_deref())
        .await
    {
        Ok(item) => (StatusCode::OK, Json(dto::Envelope::new(item))).into_response(),
        Err(e) => errors::query_error_to_response(e),
    }
}
