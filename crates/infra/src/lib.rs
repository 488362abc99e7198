//! Infrastructure layer: catalog storage adapters and configuration.

pub mod config;
pub mod in_memory;
pub mod postgres;


pub use config::{CatalogConfig, ConfigError, DatabaseConfig};
pub use in_memory::{BrandEntry, CategoryEntry, InMemoryCatalog, ItemRecord};
pub use postgres::PostgresCatalog;
