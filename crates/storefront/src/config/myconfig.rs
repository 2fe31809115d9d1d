use anyhow::{Context, Result, anyhow};
use std::{str::FromStr, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!(
                "STORE_BACKEND must be 'postgres' or 'memory', got '{other}'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CheckoutConfig {
    pub max_reserve_attempts: u32,
    pub retry_base_delay: Duration,
    pub lock_timeout: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            max_reserve_attempts: 5,
            retry_base_delay: Duration::from_millis(10),
            lock_timeout: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub port: u16,
    pub run_migrations: bool,
    pub seed_database: bool,
    pub db_max_conn: u32,
    pub db_min_conn: u32,
    pub checkout: CheckoutConfig,
    pub mask_forbidden_orders: bool,
    pub dev_mode: bool,
    pub enable_file_log: bool,
    pub otel_endpoint: Option<String>,
}

fn flag(key: &str, raw: Option<String>, default: bool) -> Result<bool> {
    match raw.as_deref() {
        None => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(anyhow!("{key} must be 'true' or 'false', got '{other}'")),
    }
}

fn number<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{value}'")),
    }
}

impl Config {
    pub fn init() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, `std::env` in production.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let store_backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse::<StoreBackend>()?,
            None => StoreBackend::Postgres,
        };

        let database_url = lookup("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("Missing environment variable: DATABASE_URL"));
        }

        let jwt_secret =
            lookup("JWT_SECRET").context("Missing environment variable: JWT_SECRET")?;

        let port = number("PORT", lookup("PORT"), 8080u16)?;
        let run_migrations = flag("RUN_MIGRATIONS", lookup("RUN_MIGRATIONS"), true)?;
        let seed_database = flag("SEED_DATABASE", lookup("SEED_DATABASE"), false)?;
        let db_max_conn = number("DB_MAX_CONNECTION", lookup("DB_MAX_CONNECTION"), 5u32)?;
        let db_min_conn = number("DB_MIN_CONNECTION", lookup("DB_MIN_CONNECTION"), 1u32)?;

        let defaults = CheckoutConfig::default();
        let max_reserve_attempts = number(
            "CHECKOUT_MAX_RESERVE_ATTEMPTS",
            lookup("CHECKOUT_MAX_RESERVE_ATTEMPTS"),
            defaults.max_reserve_attempts,
        )?;
        if max_reserve_attempts == 0 {
            return Err(anyhow!("CHECKOUT_MAX_RESERVE_ATTEMPTS must be at least 1"));
        }
        let retry_base_delay_ms = number(
            "CHECKOUT_RETRY_BASE_DELAY_MS",
            lookup("CHECKOUT_RETRY_BASE_DELAY_MS"),
            defaults.retry_base_delay.as_millis() as u64,
        )?;
        let lock_timeout_ms = number(
            "CHECKOUT_LOCK_TIMEOUT_MS",
            lookup("CHECKOUT_LOCK_TIMEOUT_MS"),
            defaults.lock_timeout.as_millis() as u64,
        )?;

        let mask_forbidden_orders =
            flag("MASK_FORBIDDEN_ORDERS", lookup("MASK_FORBIDDEN_ORDERS"), false)?;
        let dev_mode = flag("DEV_MODE", lookup("DEV_MODE"), false)?;
        let enable_file_log = flag("ENABLE_FILE_LOG", lookup("ENABLE_FILE_LOG"), false)?;
        let otel_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.trim().is_empty());

        Ok(Self {
            store_backend,
            database_url,
            jwt_secret,
            port,
            run_migrations,
            seed_database,
            db_max_conn,
            db_min_conn,
            checkout: CheckoutConfig {
                max_reserve_attempts,
                retry_base_delay: Duration::from_millis(retry_base_delay_ms),
                lock_timeout: Duration::from_millis(lock_timeout_ms),
            },
            mask_forbidden_orders,
            dev_mode,
            enable_file_log,
            otel_endpoint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn memory_backend_needs_only_a_secret() {
        let config = Config::from_lookup(lookup(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.port, 8080);
        assert!(config.run_migrations);
        assert!(!config.seed_database);
        assert!(!config.mask_forbidden_orders);
        assert_eq!(config.checkout.max_reserve_attempts, 5);
        assert_eq!(config.checkout.lock_timeout, Duration::from_millis(2000));
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap_err();

        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn malformed_values_are_reported() {
        let bad_flag = Config::from_lookup(lookup(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", "s3cret"),
            ("RUN_MIGRATIONS", "maybe"),
        ]));
        assert!(bad_flag.is_err());

        let bad_backend = Config::from_lookup(lookup(&[
            ("STORE_BACKEND", "redis"),
            ("JWT_SECRET", "s3cret"),
        ]));
        assert!(bad_backend.is_err());

        let zero_attempts = Config::from_lookup(lookup(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", "s3cret"),
            ("CHECKOUT_MAX_RESERVE_ATTEMPTS", "0"),
        ]));
        assert!(zero_attempts.is_err());
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("JWT_SECRET", "s3cret"),
            ("PORT", "9000"),
            ("MASK_FORBIDDEN_ORDERS", "true"),
            ("CHECKOUT_LOCK_TIMEOUT_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.port, 9000);
        assert!(config.mask_forbidden_orders);
        assert_eq!(config.checkout.lock_timeout, Duration::from_millis(250));
    }
}
