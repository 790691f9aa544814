//! HTTP client trait abstraction.
//!
//! Change-stream sessions only ever need one operation: open a GET request
//! and read the body incrementally. Keeping it behind a trait lets the
//! listener run against reqwest in production and a scripted client in tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// Incrementally received response body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// HTTP client errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// Connection failed
    ConnectionFailed(String),
    /// Request timeout
    Timeout(String),
    /// Server returned an error status
    ServerError { status: u16, message: String },
    /// Body read failed mid-stream
    Io(String),
    /// Invalid URL
    InvalidUrl(String),
    /// Other error
    Other(String),
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            HttpError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            HttpError::ServerError { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            HttpError::Io(msg) => write!(f, "IO error: {}", msg),
            HttpError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            HttpError::Other(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// Trait for streaming HTTP requests.
///
/// Implementations should reuse connections across calls; a listener
/// reconnecting forever opens a new request every time a session ends.
///
/// # Example
///
/// ```ignore
/// use community_client::traits::{HttpClient, Headers};
/// use futures_util::StreamExt;
///
/// async fn dump<C: HttpClient>(client: &C, url: &str) {
///     let mut body = client.get_stream(url, &Headers::new()).await.unwrap();
///     while let Some(Ok(chunk)) = body.next().await {
///         println!("{} bytes", chunk.len());
///     }
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a GET request and return the body as a stream.
    ///
    /// A non-2xx status must be reported as [`HttpError::ServerError`]
    /// rather than as a stream.
    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        assert_eq!(
            HttpError::ConnectionFailed("refused".to_string()).to_string(),
            "Connection failed: refused"
        );
        assert_eq!(
            HttpError::ServerError {
                status: 503,
                message: "unavailable".to_string()
            }
            .to_string(),
            "Server error (503): unavailable"
        );
        assert_eq!(HttpError::Io("reset".to_string()).to_string(), "IO error: reset");
    }
}
