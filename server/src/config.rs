use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

use saffron_core::search::{DEFAULT_PER_PAGE, MAX_PER_PAGE};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub default_per_page: i64,
    /// Serve category lookups from an in-memory index
    pub category_cache: bool,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let default_per_page: i64 = try_load(&lookup, "DEFAULT_PER_PAGE", DEFAULT_PER_PAGE)?;
        if !(1..=MAX_PER_PAGE).contains(&default_per_page) {
            return Err(ConfigError::Invalid {
                key: "DEFAULT_PER_PAGE",
                value: default_per_page.to_string(),
                reason: format!("must be between 1 and {}", MAX_PER_PAGE),
            });
        }

        let category_cache = match lookup("CATEGORY_CACHE") {
            None => true,
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "CATEGORY_CACHE",
                value: raw.clone(),
                reason: "expected 1, 0, true or false".to_string(),
            })?,
        };

        Ok(Self {
            database_url,
            bind_addr: try_load(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            default_per_page,
            category_cache,
        })
    }
}

fn try_load<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
