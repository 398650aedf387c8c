use anyhow::{bail, Context, Result};

/// Environment variables checked, in order, for the database connection string.
const DATABASE_URL_VARS: &[&str] = &["DATABASE_URL", "POSTGRES_URL"];

/// Which persistence backend the service runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => bail!("STORE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    /// Always `Some` for the Postgres backend.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    /// Memory backend only: seeds an admin user reachable with this bearer token.
    pub dev_admin_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so parsing can be tested
    /// without touching the process environment.
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_backend = match lookup("STORE_BACKEND") {
            Some(raw) if !raw.trim().is_empty() => StoreBackend::parse(&raw)?,
            _ => StoreBackend::Postgres,
        };

        let database_url = first_non_empty(&lookup, DATABASE_URL_VARS);
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            bail!(
                "Required environment variable '{}' is not set",
                DATABASE_URL_VARS.join("' or '")
            );
        }

        Ok(Config {
            store_backend,
            database_url,
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".to_string())
                .parse::<u32>()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            dev_admin_token: lookup("DEV_ADMIN_TOKEN").filter(|t| !t.trim().is_empty()),
        })
    }
}

fn first_non_empty<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_database_url_takes_precedence() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://primary"),
            ("POSTGRES_URL", "postgres://fallback"),
        ]))
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://primary"));
        assert_eq!(config.store_backend, StoreBackend::Postgres);
    }

    #[test]
    fn test_empty_database_url_falls_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", ""),
            ("POSTGRES_URL", "postgres://fallback"),
        ]))
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://fallback"));
    }

    #[test]
    fn test_postgres_backend_requires_url() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_memory_backend_needs_no_url() {
        let config = Config::from_lookup(lookup_from(&[("STORE_BACKEND", "memory")])).unwrap();
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db")])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("PORT", "not-a-port"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("STORE_BACKEND", "mongo")]));
        assert!(result.is_err());
    }
}
