use crate::utils::serde_duration;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised while validating provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("provider name cannot be empty")]
    EmptyName,
    #[error("provider {0} must set a non-zero timeout")]
    ZeroTimeout(String),
    #[error("provider {0} must set a non-zero interval")]
    ZeroInterval(String),
    #[error("provider {0} must allow at least one query per interval")]
    ZeroMaxQueries(String),
    #[error("provider {0} has no endpoints configured")]
    NoEndpoints(String),
    #[error("invalid endpoint url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("authentication for endpoint {0:?} requires both a header and a key")]
    InvalidAuthentication(String),
}

/// API key authentication sent as a request header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authentication {
    pub api_key_header: String,
    pub api_key: String,
}

/// One RPC node the provider may talk to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,
}

impl Endpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), authentication: None }
    }

    pub fn with_authentication(mut self, header: impl Into<String>, key: impl Into<String>) -> Self {
        self.authentication =
            Some(Authentication { api_key_header: header.into(), api_key: key.into() });
        self
    }

    pub fn parsed_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.url)
            .map_err(|err| ConfigError::InvalidUrl { url: self.url.clone(), reason: err.to_string() })
    }

    pub fn validate_basic(&self) -> Result<(), ConfigError> {
        self.parsed_url()?;
        if let Some(auth) = &self.authentication {
            if auth.api_key_header.is_empty() || auth.api_key.is_empty() {
                return Err(ConfigError::InvalidAuthentication(self.url.clone()))
            }
        }
        Ok(())
    }
}

/// Configuration of a single price provider.
///
/// ```
/// use chainfeed_core::config::ProviderConfig;
///
/// let config: ProviderConfig = serde_json::from_str(r#"{
///     "name": "vault_api",
///     "enabled": true,
///     "timeout": "500ms",
///     "interval": "1s",
///     "max_queries": 1,
///     "endpoints": [{ "url": "https://api.mainnet-beta.solana.com" }]
/// }"#).unwrap();
/// config.validate_basic().unwrap();
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub enabled: bool,
    /// Upper bound for a single request to the provider
    #[serde(with = "serde_duration")]
    pub timeout: Duration,
    /// How often the provider is polled by its scheduler
    #[serde(with = "serde_duration")]
    pub interval: Duration,
    pub max_queries: usize,
    pub endpoints: Vec<Endpoint>,
}

impl ProviderConfig {
    pub fn validate_basic(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyName)
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout(self.name.clone()))
        }
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval(self.name.clone()))
        }
        if self.max_queries == 0 {
            return Err(ConfigError::ZeroMaxQueries(self.name.clone()))
        }
        if self.endpoints.is_empty() {
            return Err(ConfigError::NoEndpoints(self.name.clone()))
        }
        self.endpoints.iter().try_for_each(Endpoint::validate_basic)
    }
}
