use serde::{Deserialize, Serialize};

use crate::app::services::DbHealth;

// -------------------------
// Request DTOs
// -------------------------

/// Query string of `GET /catalog/items/:id`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemLookupQuery {
    pub tenant_id: Option<String>,
    pub store_id: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

/// Every successful body is wrapped as `{ "data": ... }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub time: String,
    pub db: DbStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStatus {
    pub status: &'static str,
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<DbHealth> for DbStatus {
    fn from(health: DbHealth) -> Self {
        match health {
            DbHealth::InMemory => DbStatus {
                status: "in_memory",
                latency_ms: None,
                error: None,
            },
            DbHealth::Up { latency_ms } => DbStatus {
                status: "up",
                latency_ms: Some(latency_ms),
                error: None,
            },
            DbHealth::Down { error } => DbStatus {
                status: "down",
                latency_ms: None,
                error: Some(error),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_database_reports_error() {
        let status = DbStatus::from(DbHealth::Down {
            error: "connection refused".into(),
        });
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "down");
        assert_eq!(json["error"], "connection refused");
        assert!(json["latencyMs"].is_null());
    }

    #[test]
    fn error_is_omitted_when_healthy() {
        let json = serde_json::to_value(DbStatus::from(DbHealth::Up { latency_ms: 3 })).unwrap();
        assert_eq!(json["latencyMs"], 3);
        assert!(json.get("error").is_none());
    }
}
