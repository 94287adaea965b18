//! Process configuration read from environment variables.
//!
//! | variable | default |
//! |----------|---------|
//! | `CRAFTER_BIND_ADDR` | `0.0.0.0:8080` |
//! | `CRAFTER_STORE` | `sqlite` (`sqlite` or `memory`) |
//! | `DATABASE_URL` | `sqlite://data/crafter.db?mode=rwc` |
//! | `CORS_ALLOWED_ORIGINS` | `*` (comma-separated list otherwise) |
//! | `CRAFTER_LOG_FORMAT` | `json` (`json` or `pretty`) |
//!
//! Unparseable values fall back to the default. Tracing is not installed yet
//! when the configuration is read, so the fallbacks are collected and logged
//! by `main` afterwards.

use std::net::SocketAddr;

use crafter_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/crafter.db?mode=rwc";

/// Which `CraftingStore` implementation backs the service.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum StoreKind {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreKind,
    pub database_url: String,
    pub cors_allowed_origins: String,
    pub log_format: LogFormat,
    /// Human-readable notes about values that were ignored.
    pub fallbacks: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            store: StoreKind::Sqlite,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            cors_allowed_origins: "*".to_string(),
            log_format: LogFormat::Json,
            fallbacks: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("CRAFTER_BIND_ADDR") {
            match raw.trim().parse() {
                Ok(addr) => config.bind_addr = addr,
                Err(_) => config.fallbacks.push(format!(
                    "CRAFTER_BIND_ADDR={raw:?} is not a socket address; using {DEFAULT_BIND_ADDR}"
                )),
            }
        }

        if let Some(raw) = lookup("CRAFTER_STORE") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "sqlite" => config.store = StoreKind::Sqlite,
                "memory" => config.store = StoreKind::Memory,
                _ => config.fallbacks.push(format!(
                    "CRAFTER_STORE={raw:?} is not \"sqlite\" or \"memory\"; using sqlite"
                )),
            }
        }

        if let Some(raw) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            config.database_url = raw.trim().to_string();
        }

        if let Some(raw) = lookup("CORS_ALLOWED_ORIGINS") {
            config.cors_allowed_origins = raw;
        }

        if let Some(raw) = lookup("CRAFTER_LOG_FORMAT") {
            match raw.parse() {
                Ok(format) => config.log_format = format,
                Err(e) => config.fallbacks.push(format!("{e}; using json")),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn every_variable_is_read() {
        let config = config_from(&[
            ("CRAFTER_BIND_ADDR", "127.0.0.1:9000"),
            ("CRAFTER_STORE", "Memory"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("CORS_ALLOWED_ORIGINS", "https://app.example.com"),
            ("CRAFTER_LOG_FORMAT", "pretty"),
        ]);

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.cors_allowed_origins, "https://app.example.com");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.fallbacks.is_empty());
    }

    #[test]
    fn invalid_values_fall_back_and_are_reported() {
        let config = config_from(&[
            ("CRAFTER_BIND_ADDR", "not-an-addr"),
            ("CRAFTER_STORE", "postgres"),
            ("CRAFTER_LOG_FORMAT", "xml"),
        ]);

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.fallbacks.len(), 3);
    }
}
