use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

use crate::domain::order::DEFAULT_PAGE_SIZE;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Read once at start-up and handed to constructors. Nothing below main
// looks at the environment.
//
// ============================================================================

pub const DEFAULT_TABLE_NAME: &str = "orders_table";
pub const DEFAULT_KEYSPACE: &str = "orders_ks";
pub const DEFAULT_ENDPOINT: &str = "127.0.0.1:9042";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Scylla,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub table_name: String,
    pub keyspace: String,
    /// Contact point override; `None` means [`DEFAULT_ENDPOINT`].
    pub endpoint_override: Option<String>,
    pub backend: StoreBackend,
    pub page_size: usize,
    pub request_timeout: Duration,
    pub metrics_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            keyspace: DEFAULT_KEYSPACE.to_string(),
            endpoint_override: None,
            backend: StoreBackend::Scylla,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_millis(5000),
            metrics_port: 9090,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset and empty values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let table_name = get("TABLE_NAME").unwrap_or(defaults.table_name);
        validate_identifier("TABLE_NAME", &table_name)?;

        let keyspace = get("KEYSPACE").unwrap_or(defaults.keyspace);
        validate_identifier("KEYSPACE", &keyspace)?;

        let backend = match get("STORE_BACKEND").as_deref() {
            None | Some("scylla") => StoreBackend::Scylla,
            Some("memory") => StoreBackend::Memory,
            Some(other) => bail!("STORE_BACKEND must be 'scylla' or 'memory', got '{}'", other),
        };

        let page_size = match get("PAGE_SIZE") {
            Some(raw) => raw
                .parse::<usize>()
                .context("PAGE_SIZE must be a positive integer")?,
            None => defaults.page_size,
        };
        if page_size == 0 {
            return Err(anyhow!("PAGE_SIZE must be at least 1"));
        }

        let request_timeout = match get("STORE_REQUEST_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(
                raw.parse::<u64>()
                    .context("STORE_REQUEST_TIMEOUT_MS must be an integer")?,
            ),
            None => defaults.request_timeout,
        };

        let metrics_port = match get("METRICS_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .context("METRICS_PORT must be a valid u16 integer")?,
            None => defaults.metrics_port,
        };

        Ok(Self {
            table_name,
            keyspace,
            endpoint_override: get("ENDPOINT_OVERRIDE"),
            backend,
            page_size,
            request_timeout,
            metrics_port,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint_override.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }
}

/// Table and keyspace names are spliced into CQL, so only plain identifiers pass.
fn validate_identifier(name: &str, value: &str) -> Result<()> {
    let valid = value.len() <= 48
        && value.starts_with(|c: char| c.is_ascii_alphabetic())
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid {
        bail!("{} must be a plain CQL identifier, got '{}'", name, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.table_name, "orders_table");
        assert_eq!(config.keyspace, "orders_ks");
        assert_eq!(config.endpoint(), "127.0.0.1:9042");
        assert_eq!(config.backend, StoreBackend::Scylla);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TABLE_NAME", "orders_test"),
            ("ENDPOINT_OVERRIDE", "scylla:9042"),
            ("STORE_BACKEND", "memory"),
            ("PAGE_SIZE", "3"),
            ("STORE_REQUEST_TIMEOUT_MS", "250"),
            ("METRICS_PORT", "9191"),
        ])
        .unwrap();

        assert_eq!(config.table_name, "orders_test");
        assert_eq!(config.endpoint(), "scylla:9042");
        assert_eq!(config.backend, StoreBackend::Memory);
        assert_eq!(config.page_size, 3);
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.metrics_port, 9191);
    }

    #[test]
    fn test_empty_endpoint_override_is_ignored() {
        let config = config_from(&[("ENDPOINT_OVERRIDE", "")]).unwrap();
        assert!(config.endpoint_override.is_none());
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        assert!(config_from(&[("TABLE_NAME", "orders; DROP TABLE x")]).is_err());
        assert!(config_from(&[("KEYSPACE", "1abc")]).is_err());
    }

    #[test]
    fn test_rejects_bad_numbers() {
        assert!(config_from(&[("PAGE_SIZE", "0")]).is_err());
        assert!(config_from(&[("PAGE_SIZE", "ten")]).is_err());
        assert!(config_from(&[("METRICS_PORT", "70000")]).is_err());
        assert!(config_from(&[("STORE_BACKEND", "dynamo")]).is_err());
    }
}
