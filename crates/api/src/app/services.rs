use std::sync::Arc;

use catalog_infra::{CatalogConfig, InMemoryCatalog, PostgresCatalog};
use catalog_query::{
    CatalogPage, CatalogQueryEngine, CatalogQueryParams, ItemDetail, QueryError, ResultAssembler,
};

/// Storage probe outcome reported by `/health`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbHealth {
    /// The in-memory backend has no database to probe.
    InMemory,
    Up { latency_ms: u64 },
    Down { error: String },
}

#[derive(Clone)]
pub enum AppServices {
    InMemory {
        engine: CatalogQueryEngine<Arc<InMemoryCatalog>>,
        catalog: Arc<InMemoryCatalog>,
    },
    Persistent {
        engine: CatalogQueryEngine<PostgresCatalog>,
    },
}

impl AppServices {
    /// In-memory wiring (dev/test). The caller keeps `catalog` to seed it.
    pub fn in_memory(catalog: Arc<InMemoryCatalog>, assembler: ResultAssembler) -> Self {
        Self::InMemory {
            engine: CatalogQueryEngine::new(catalog.clone(), assembler),
            catalog,
        }
    }

    pub fn persistent(catalog: PostgresCatalog, assembler: ResultAssembler) -> Self {
        Self::Persistent {
            engine: CatalogQueryEngine::new(catalog, assembler),
        }
    }

    pub fn in_memory_catalog(&self) -> Option<&Arc<InMemoryCatalog>> {
        match self {
            AppServices::InMemory { catalog, .. } => Some(catalog),
            AppServices::Persistent { .. } => None,
        }
    }

    pub async fn list(&self, params: &CatalogQueryParams) -> Result<CatalogPage, QueryError> {
        match self {
            AppServices::InMemory { engine, .. } => engine.list(params).await,
            AppServices::Persistent { engine } => engine.list(params).await,
        }
    }

    pub async fn feed(&self, params: &CatalogQueryParams) -> Result<CatalogPage, QueryError> {
        match self {
            AppServices::InMemory { engine, .. } => engine.feed(params).await,
            AppServices::Persistent { engine } => engine.feed(params).await,
        }
    }

    pub async fn get_item(
        &self,
        tenant_id: Option<&str>,
        item_id: &str,
        store_id: Option<&str>,
    ) -> Result<ItemDetail, QueryError> {
        match self {
            AppServices::InMemory { engine, .. } => {
                engine.get_item(tenant_id, item_id, store_id).await
            }
            AppServices::Persistent { engine } => {
                engine.get_item(tenant_id, item_id, store_id).await
            }
        }
    }

    pub async fn db_health(&self) -> DbHealth {
        match self {
            AppServices::InMemory { .. } => DbHealth::InMemory,
            AppServices::Persistent { engine } => match engine.backend().ping().await {
                Ok(latency) => DbHealth::Up {
                    latency_ms: u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                },
                Err(e) => DbHealth::Down {
                    error: e.to_string(),
                },
            },
        }
    }
}

/// Choose the backend from `USE_PERSISTENT_STORES` and wire the engine.
pub async fn build_services(config: &CatalogConfig) -> Result<AppServices, QueryError> {
    let assembler = ResultAssembler::new(config.default_tax_rate);

    let Some(database) = config.database.as_ref() else {
        tracing::info!("using in-memory catalog backend");
        return Ok(AppServices::in_memory(
            Arc::new(InMemoryCatalog::new()),
            assembler,
        ));
    };

    let catalog = PostgresCatalog::connect(database).await?;
    if database.run_migrations {
        catalog.run_migrations().await?;
    }
    tracing::info!("using postgres catalog backend");
    Ok(AppServices::persistent(catalog, assembler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_backend_when_not_persistent() {
        let config = CatalogConfig::default();
        let services = build_services(&config).await.unwrap();
        assert!(services.in_memory_catalog().is_some());
        assert_eq!(services.db_health().await, DbHealth::InMemory);
    }
}
