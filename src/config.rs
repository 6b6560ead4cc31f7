use std::env;
use std::time::Duration;

use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8100";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PRISM_BASE_URL '{value}': {source}")]
    InvalidBaseUrl {
        value: String,
        source: url::ParseError,
    },

    #[error("PRISM_BASE_URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("Invalid {name} '{value}': expected a positive integer")]
    InvalidNumber { name: &'static str, value: String },
}

/// Runtime settings.
///
/// - `PRISM_BASE_URL`: Prism API root (default `http://localhost:8100`)
/// - `PRISM_TIMEOUT_SECS`: per-request timeout (default 30)
/// - `LECTIO_DEBOUNCE_MS`: quiet period before a typed query is searched (default 500)
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: Url,
    pub request_timeout: Duration,
    pub debounce: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = parse_base_url(get("PRISM_BASE_URL").as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        let timeout_secs = parse_positive("PRISM_TIMEOUT_SECS", get("PRISM_TIMEOUT_SECS"))?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let debounce_ms = parse_positive("LECTIO_DEBOUNCE_MS", get("LECTIO_DEBOUNCE_MS"))?
            .unwrap_or(DEFAULT_DEBOUNCE_MS);

        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            debounce: Duration::from_millis(debounce_ms),
        })
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(raw)?;
        Ok(self)
    }
}

pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidBaseUrl {
        value: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::UnsupportedScheme(raw.to_string())),
    }
}

fn parse_positive(name: &'static str, value: Option<String>) -> Result<Option<u64>, ConfigError> {
    value
        .map(|v| {
            v.parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidNumber { name, value: v })
        })
        .transpose()
}
