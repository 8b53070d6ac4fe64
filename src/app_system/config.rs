use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err("expected `compact` or `json`".to_string()),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid value for {key}: {value:?} ({reason})")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub store_shards: usize,
    pub store_buffer: usize,
    pub subscriber_buffer: usize,
    pub snapshot_path: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            store_shards: 8,
            store_buffer: 32,
            subscriber_buffer: 256,
            snapshot_path: None,
            log_format: LogFormat::Compact,
        }
    }
}

impl AppConfig {
    /// Read `INVENTORY_*` variables, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let listen_addr = match lookup("INVENTORY_LISTEN_ADDR") {
            Some(value) => parse("INVENTORY_LISTEN_ADDR", value)?,
            None => defaults.listen_addr,
        };
        let store_shards = count(&lookup, "INVENTORY_STORE_SHARDS", defaults.store_shards)?;
        let store_buffer = count(&lookup, "INVENTORY_STORE_BUFFER", defaults.store_buffer)?;
        let subscriber_buffer =
            count(&lookup, "INVENTORY_SUBSCRIBER_BUFFER", defaults.subscriber_buffer)?;
        let snapshot_path = lookup("INVENTORY_SNAPSHOT_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        let log_format = match lookup("INVENTORY_LOG_FORMAT") {
            Some(value) => parse("INVENTORY_LOG_FORMAT", value)?,
            None => defaults.log_format,
        };

        Ok(Self {
            listen_addr,
            store_shards,
            store_buffer,
            subscriber_buffer,
            snapshot_path,
            log_format,
        })
    }
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError {
        key,
        reason: e.to_string(),
        value,
    })
}

fn count(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: usize,
) -> Result<usize, ConfigError> {
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    let parsed: usize = parse(key, value.clone())?;
    if parsed == 0 {
        return Err(ConfigError {
            key,
            value,
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(parsed)
}
