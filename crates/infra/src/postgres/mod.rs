//! Postgres-backed catalog storage.
//!
//! ## Error Mapping
//!
//! Every SQLx error is surfaced as `QueryError::StorageUnavailable` carrying the
//! operation name. Nothing is retried; a failed round trip fails the request.
//!
//! | SQLx Error | Message prefix |
//! |------------|----------------|
//! | Database | `database error in <op>` |
//! | PoolTimedOut | `connection pool timed out in <op>` |
//! | PoolClosed | `connection pool closed in <op>` |
//! | ColumnDecode / Decode | `failed to decode row in <op>` |
//! | Other | `sqlx error in <op>` |
//!
//! ## Thread Safety
//!
//! `PostgresCatalog` is `Send + Sync` and cheap to clone. Each statement
//! acquires a pooled connection for its own duration only; count and page
//! statements never share a connection or a transaction.

use std::sync::Arc;
use std::time::Instant;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, instrument};

use catalog_core::{ItemId, TenantId};
use catalog_query::row::ItemDetailRow;
use catalog_query::{CatalogBackend, ExecutionPath, Executor, QueryError, StoreScope};

use crate::config::DatabaseConfig;

mod generic;
mod inventory_join;
mod lookup;
mod rows;
mod statement;

pub use generic::GenericExecutor;
pub use inventory_join::InventoryJoinExecutor;

/// Embedded schema migrations (`crates/infra/migrations`).
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Clone)]
pub struct PostgresCatalog {
    pool: Arc<PgPool>,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool sized by `config`. The first connection is established
    /// eagerly so a bad URL fails at startup.
    #[instrument(skip_all, fields(max_connections = config.max_connections), err)]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, QueryError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        info!("connected to catalog database");
        Ok(Self::new(pool))
    }

    #[instrument(skip(self), err)]
    pub async fn run_migrations(&self) -> Result<(), QueryError> {
        MIGRATOR
            .run(&*self.pool)
            .await
            .map_err(|e| QueryError::storage(format!("migration failed: {e}")))?;
        info!("catalog migrations applied");
        Ok(())
    }

    /// Round-trip latency of `SELECT 1`.
    pub async fn ping(&self) -> Result<std::time::Duration, QueryError> {
        let started = Instant::now();
        sqlx::query("SELECT 1")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(started.elapsed())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl CatalogBackend for PostgresCatalog {
    fn executor<'a>(&'a self, path: &'a ExecutionPath) -> Box<dyn Executor + 'a> {
        match path {
            ExecutionPath::Generic { overlay } => {
                Box::new(GenericExecutor::new(&self.pool, overlay.as_ref()))
            }
            ExecutionPath::InventoryJoin(store_id) => {
                Box::new(InventoryJoinExecutor::new(&self.pool, store_id))
            }
        }
    }

    async fn find_item(
        &self,
        tenant_id: Option<&TenantId>,
        id: &ItemId,
        scope: &StoreScope,
    ) -> Result<Option<ItemDetailRow>, QueryError> {
        lookup::find_item(&self.pool, tenant_id, id, scope).await
    }
}

/// Map SQLx errors to QueryError.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> QueryError {
    let msg = match &err {
        sqlx::Error::Database(db_err) => {
            format!("database error in {}: {}", operation, db_err.message())
        }
        sqlx::Error::PoolTimedOut => format!("connection pool timed out in {operation}"),
        sqlx::Error::PoolClosed => format!("connection pool closed in {operation}"),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            format!("failed to decode row in {operation}: {err}")
        }
        _ => format!("sqlx error in {operation}: {err}"),
    };
    QueryError::storage(msg)
}
