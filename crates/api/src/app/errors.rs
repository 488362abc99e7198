use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use catalog_query::QueryError;

pub fn query_error_to_response(err: QueryError) -> axum::response::Response {
    match err {
        QueryError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        QueryError::CursorDecode(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_cursor", msg),
        QueryError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        QueryError::StorageUnavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", msg)
        }
    }
}

/// A query string that does not deserialize (e.g. `limit=abc`).
pub fn query_rejection_to_response(rejection: QueryRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
