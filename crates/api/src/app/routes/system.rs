use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::{SecondsFormat, Utc};

use crate::app::dto::{DbStatus, HealthResponse};
use crate::app::services::{AppServices, DbHealth};

pub const SERVICE_NAME: &str = "catalog-api";

/// Liveness plus a `SELECT 1` probe on the persistent backend. A failed
/// probe answers 503 with `status: "degraded"`.
pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    let db = services.db_health().await;
    let (status, code) = match db {
        DbHealth::Down { .. } => ("degraded", StatusCode::SERVICE_UNAVAILABLE),
        DbHealth::InMemory | DbHealth::Up { .. } => ("ok", StatusCode::OK),
    };
    if let DbHealth::Down { error } = &db {
        tracing::warn!(%error, "database health probe failed");
    }

    let body = HealthResponse {
        status,
        service: SERVICE_NAME,
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        db: DbStatus::from(db),
    };
    (code, Json(body))
}
