use std::time::Duration;

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:3000,http://localhost:3001,http://172.27.128.1:3000";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
const DEFAULT_YAHOO_QUERY_URL: &str = "https://query2.finance.yahoo.com";
const DEFAULT_YAHOO_COOKIE_URL: &str = "https://fc.yahoo.com";
const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { name: &'static str, value: String },
    #[error("CORS_ORIGINS must list at least one origin")]
    NoCorsOrigins,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub cors_origins: Vec<String>,
    pub upstream_timeout: Duration,
    pub yahoo_query_url: String,
    pub yahoo_cookie_url: String,
    pub log_filter: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    /// Call `dotenv()` beforehand to pick up a `.env` file.
    pub fn init() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let cors_origins: Vec<String> = var("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
        if cors_origins.is_empty() {
            return Err(ConfigError::NoCorsOrigins);
        }

        let timeout = var(
            "UPSTREAM_TIMEOUT_SECS",
            &DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string(),
        );
        let upstream_timeout = match timeout.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                return Err(ConfigError::InvalidTimeout {
                    name: "UPSTREAM_TIMEOUT_SECS",
                    value: timeout,
                })
            }
        };

        Ok(Config {
            bind_addr: var("BIND_ADDR", DEFAULT_BIND_ADDR),
            cors_origins,
            upstream_timeout,
            yahoo_query_url: var("YAHOO_QUERY_URL", DEFAULT_YAHOO_QUERY_URL)
                .trim_end_matches('/')
                .to_string(),
            yahoo_cookie_url: var("YAHOO_COOKIE_URL", DEFAULT_YAHOO_COOKIE_URL),
            log_filter: var("RUST_LOG", DEFAULT_LOG_FILTER),
        })
    }
}
