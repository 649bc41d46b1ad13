use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_DATABASE_PATH: &str = "accounts.db";
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// SQLite file backing the persistent store
    pub database_path: PathBuf,
    /// Bind address of the HTTP server
    pub server_addr: String,
    /// Default `tracing` filter; `RUST_LOG` overrides it
    pub log_filter: String,
}

impl AppConfig {
    /// Load `.env` (if any) and read `ACCOUNT_DB_PATH`, `ACCOUNT_SERVER_ADDR`, `ACCOUNT_LOG`.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            database_path: non_empty("ACCOUNT_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            server_addr: non_empty("ACCOUNT_SERVER_ADDR").unwrap_or(defaults.server_addr),
            log_filter: non_empty("ACCOUNT_LOG").unwrap_or(defaults.log_filter),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
