// region:    --- Imports
use crate::cart::ShippingPolicy;
use std::net::SocketAddr;
use std::time::Duration;

// endregion: --- Imports

// region:    --- Config
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Service settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Postgres connection string. Without it records live in memory.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Kafka bootstrap servers. Without them events are only logged.
    pub kafka_brokers: Option<String>,
    pub kafka_topic: String,
    pub api_secret: String,
    pub admin_username: String,
    pub admin_password: String,
    pub session_ttl: Duration,
    pub shipping: ShippingPolicy,
    pub scheduler_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: None,
            database_max_connections: 5,
            kafka_brokers: None,
            kafka_topic: "market-events".to_string(),
            api_secret: "insecure-development-secret".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
            session_ttl: Duration::from_secs(3600),
            shipping: ShippingPolicy::default(),
            scheduler_interval: Duration::from_millis(1000),
        }
    }
}

impl Config {
    /// Read settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for unset names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Ok(Self {
            bind_addr: parse_or(&get, "BIND_ADDR", defaults.bind_addr)?,
            database_url: get("DATABASE_URL"),
            database_max_connections: parse_or(
                &get,
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,
            kafka_brokers: get("KAFKA_BROKERS"),
            kafka_topic: get("KAFKA_TOPIC").unwrap_or(defaults.kafka_topic),
            api_secret: get("API_SECRET").unwrap_or(defaults.api_secret),
            admin_username: get("ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            admin_password: get("ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
            session_ttl: Duration::from_secs(parse_or(
                &get,
                "SESSION_TTL_SECS",
                defaults.session_ttl.as_secs(),
            )?),
            shipping: ShippingPolicy {
                flat_fee: parse_or(&get, "SHIPPING_FEE", defaults.shipping.flat_fee)?,
                free_above: parse_or(
                    &get,
                    "FREE_SHIPPING_THRESHOLD",
                    defaults.shipping.free_above,
                )?,
            },
            scheduler_interval: Duration::from_millis(parse_or(
                &get,
                "SCHEDULER_INTERVAL_MS",
                defaults.scheduler_interval.as_millis() as u64,
            )?),
        })
    }

    /// Whether the credentials are still the built-in development ones.
    pub fn uses_default_credentials(&self) -> bool {
        let defaults = Self::default();
        self.api_secret == defaults.api_secret || self.admin_password == defaults.admin_password
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

// endregion: --- Config

// endregion: --- Tests
