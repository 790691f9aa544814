//! Client configuration.
//!
//! Use the builder methods to customize a [`ClientConfig`], or read it from
//! the environment with [`ClientConfig::from_env`].
//!
//! ```ignore
//! use community_client::{ClientConfig, ReconnectPolicy};
//!
//! let config = ClientConfig::new("https://community.example.com/")
//!     .with_reconnect_policy(ReconnectPolicy::Immediate);
//! ```

use std::time::Duration;

use crate::error::ConfigError;
use crate::listener::ReconnectPolicy;

/// Environment variable holding the service endpoint.
pub const ENDPOINT_ENV: &str = "COMMUNITY_ENDPOINT";
/// Initial reconnect delay in milliseconds; enables backoff together with [`RECONNECT_MAX_ENV`].
pub const RECONNECT_INITIAL_ENV: &str = "COMMUNITY_RECONNECT_INITIAL_MS";
/// Maximum reconnect delay in milliseconds.
pub const RECONNECT_MAX_ENV: &str = "COMMUNITY_RECONNECT_MAX_MS";

/// Configuration shared by every listener a client creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the community service, e.g. `https://community.example.com/`
    pub endpoint: String,
    /// Delay policy between sessions (default: reconnect immediately)
    pub reconnect: ReconnectPolicy,
    /// Optional `User-Agent` for stream requests
    pub user_agent: Option<String>,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            reconnect: ReconnectPolicy::default(),
            user_agent: None,
        }
    }

    /// Set the reconnect policy.
    pub fn with_reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the config from environment variables.
    ///
    /// `COMMUNITY_ENDPOINT` is required. Setting both
    /// `COMMUNITY_RECONNECT_INITIAL_MS` and `COMMUNITY_RECONNECT_MAX_MS`
    /// selects exponential backoff instead of immediate reconnects.
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = std::env::var(ENDPOINT_ENV).map_err(|_| ConfigError::MissingEndpoint)?;
        let config = Self::new(endpoint);

        let initial = read_millis(RECONNECT_INITIAL_ENV)?;
        let max = read_millis(RECONNECT_MAX_ENV)?;
        let config = match (initial, max) {
            (Some(initial), Some(max)) => {
                config.with_reconnect_policy(ReconnectPolicy::Backoff { initial, max })
            }
            _ => config,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the endpoint and return it parsed.
    pub fn validate(&self) -> Result<reqwest::Url, ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }

        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };
        let url = reqwest::Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(format!("unsupported scheme '{}'", other))),
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }
        Ok(url)
    }

    /// Change-stream URL for `resource`.
    pub fn change_stream_url(&self, resource: &str) -> Result<String, ConfigError> {
        validate_resource(resource)?;
        self.validate()?;
        Ok(format!(
            "{}/api/{}/change-stream?_format=event-stream",
            self.endpoint.trim().trim_end_matches('/'),
            resource
        ))
    }
}

/// Resource names are used verbatim as a path segment.
fn validate_resource(resource: &str) -> Result<(), ConfigError> {
    let valid = !resource.is_empty()
        && resource
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidResource(resource.to_string()))
    }
}

fn read_millis(name: &str) -> Result<Option<Duration>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| ConfigError::InvalidEnvValue {
                name: name.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
