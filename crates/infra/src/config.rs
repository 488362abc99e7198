//! Configuration loading and representation.
//!
//! Everything is read from the environment once at startup. Tests construct a
//! config from an explicit lookup function instead of mutating process env.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use catalog_observability::LogFormat;

pub const USE_PERSISTENT_STORES: &str = "USE_PERSISTENT_STORES";
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const DB_MAX_CONNECTIONS: &str = "CATALOG_DB_MAX_CONNECTIONS";
pub const DB_ACQUIRE_TIMEOUT_SECS: &str = "CATALOG_DB_ACQUIRE_TIMEOUT_SECS";
pub const RUN_MIGRATIONS: &str = "CATALOG_RUN_MIGRATIONS";
pub const DEFAULT_TAX_RATE: &str = "CATALOG_DEFAULT_TAX_RATE";
pub const BIND_ADDR: &str = "CATALOG_BIND_ADDR";
pub const LOG_FORMAT: &str = "CATALOG_LOG_FORMAT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is required when USE_PERSISTENT_STORES=true")]
    Missing { var: &'static str },

    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection settings for the Postgres backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// `Some` selects the Postgres backend; `None` the in-memory one.
    pub database: Option<DatabaseConfig>,
    pub default_tax_rate: Decimal,
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &'static str| lookup(var).filter(|v| !v.trim().is_empty());

        let persistent = parse_or(get(USE_PERSISTENT_STORES), USE_PERSISTENT_STORES, false)?;
        let database = if persistent {
            let url = get(DATABASE_URL).ok_or(ConfigError::Missing { var: DATABASE_URL })?;
            let max_connections: u32 = parse_or(get(DB_MAX_CONNECTIONS), DB_MAX_CONNECTIONS, 10)?;
            if max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: DB_MAX_CONNECTIONS,
                    value: "0".into(),
                    reason: "pool needs at least one connection".into(),
                });
            }
            let timeout_secs: u64 =
                parse_or(get(DB_ACQUIRE_TIMEOUT_SECS), DB_ACQUIRE_TIMEOUT_SECS, 5)?;
            Some(DatabaseConfig {
                url,
                max_connections,
                acquire_timeout: Duration::from_secs(timeout_secs),
                run_migrations: parse_or(get(RUN_MIGRATIONS), RUN_MIGRATIONS, false)?,
            })
        } else {
            None
        };

        Ok(Self {
            database,
            default_tax_rate: parse_or(get(DEFAULT_TAX_RATE), DEFAULT_TAX_RATE, Decimal::from(18))?,
            bind_addr: parse_or(
                get(BIND_ADDR),
                BIND_ADDR,
                SocketAddr::from(([0, 0, 0, 0], 8080)),
            )?,
            log_format: parse_or(get(LOG_FORMAT), LOG_FORMAT, LogFormat::Json)?,
        })
    }

    pub fn use_persistent_stores(&self) -> bool {
        self.database.is_some()
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database: None,
            default_tax_rate: Decimal::from(18),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_format: LogFormat::Json,
        }
    }
}

fn parse_or<T>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<CatalogConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CatalogConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_to_in_memory() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, CatalogConfig::default());
        assert!(!cfg.use_persistent_stores());
    }

    #[test]
    fn persistent_requires_database_url() {
        assert_eq!(
            config(&[(USE_PERSISTENT_STORES, "true")]),
            Err(ConfigError::Missing { var: DATABASE_URL })
        );
    }

    #[test]
    fn persistent_settings() {
        let cfg = config(&[
            (USE_PERSISTENT_STORES, "true"),
            (DATABASE_URL, "postgres://localhost/catalog"),
            (DB_MAX_CONNECTIONS, "4"),
            (DB_ACQUIRE_TIMEOUT_SECS, "2"),
            (RUN_MIGRATIONS, "true"),
        ])
        .unwrap();
        let db = cfg.database.unwrap();
        assert_eq!(db.max_connections, 4);
        assert_eq!(db.acquire_timeout, Duration::from_secs(2));
        assert!(db.run_migrations);
    }

    #[test]
    fn unparseable_values_name_the_variable() {
        let err = config(&[(DEFAULT_TAX_RATE, "eighteen")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: DEFAULT_TAX_RATE, .. }));

        let err = config(&[(BIND_ADDR, "nowhere")]).unwrap_err();
        assert!(err.to_string().contains(BIND_ADDR));
    }

    #[test]
    fn log_format_is_validated() {
        let err = config(&[(LOG_FORMAT, "xml")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: LOG_FORMAT, .. }));

        let cfg = config(&[(LOG_FORMAT, "Pretty")]).unwrap();
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert_eq!(config(&[]).unwrap().log_format, LogFormat::Json);
    }

    #[test]
    fn tax_rate_accepts_decimals() {
        let cfg = config(&[(DEFAULT_TAX_RATE, "12.5")]).unwrap();
        assert_eq!(cfg.default_tax_rate, Decimal::new(125, 1));
    }
}
