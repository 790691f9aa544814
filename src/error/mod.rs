//! Error types for the change-stream client.
//!
//! Errors fall into two groups with very different handling:
//!
//! | Type | When | Handling |
//! |------|------|----------|
//! | [`ConfigError`] | Client or listener creation | Returned synchronously, nothing is started |
//! | [`StreamError`] | Anything after a listener is running | Delivered to subscribers, never fatal |
//! | [`ListenerError`] | Waiting on a listener handle | Returned from [`crate::ChangeStreamListener::ready`] |
//!
//! Transport failures (`HttpError`) live next to the [`crate::traits::HttpClient`]
//! trait and are wrapped into [`StreamError::Transport`] when they reach subscribers.

mod config;
mod stream;

pub use config::{ConfigError, ListenerError};
pub use stream::StreamError;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::traits::HttpError;

    #[test]
    fn test_config_error_converts_into_listener_error() {
        let err: ListenerError = ConfigError::NoSubscribers.into();
        assert!(matches!(err, ListenerError::Config(ConfigError::NoSubscribers)));
        assert!(err.to_string().contains("subscriber"));
    }

    #[test]
    fn test_only_transport_errors_are_transport() {
        let transport = StreamError::Transport(HttpError::ConnectionFailed("reset".to_string()));
        let protocol = StreamError::protocol("garbage");
        let decode = StreamError::Decode {
            event_label: "PostCreated".to_string(),
            message: "expected value".to_string(),
        };

        assert!(transport.is_transport());
        assert!(!protocol.is_transport());
        assert!(!decode.is_transport());
    }
}
