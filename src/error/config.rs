//! Creation-time errors.

use thiserror::Error;

/// Rejected configuration. Returned before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No endpoint was supplied
    #[error("Expected a service endpoint but none was provided")]
    MissingEndpoint,

    /// The endpoint is not an absolute http(s) URL
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// The resource name cannot be used as a path segment
    #[error("Invalid resource name '{0}'")]
    InvalidResource(String),

    /// A listener needs at least one subscriber
    #[error("A change-stream listener needs at least one subscriber")]
    NoSubscribers,

    /// An environment variable held an unusable value
    #[error("Invalid value for {name}: {value}")]
    InvalidEnvValue { name: String, value: String },
}

/// Errors from a running listener's handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The listener was shut down before the stream was ever established
    #[error("Listener stopped before the change stream was established")]
    Stopped,
}
