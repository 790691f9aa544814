//! Reqwest-based HTTP client adapter.
//!
//! This module provides the production [`HttpClient`] implementation. A
//! single `reqwest::Client` keeps a connection pool, so one instance should
//! be shared by every listener in the process.

use async_trait::async_trait;
use futures_util::StreamExt;
use std::time::Duration;
use tracing::warn;

use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

/// How long an idle pooled connection is kept for reuse.
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// TCP keep-alive interval for long-lived stream connections.
const TCP_KEEPALIVE: Duration = Duration::from_secs(60);

/// Upper bound on reading the body of a non-2xx response.
const ERROR_BODY_TIMEOUT: Duration = Duration::from_secs(2);

/// HTTP client implementation using reqwest.
///
/// # Example
///
/// ```ignore
/// use community_client::adapters::ReqwestHttpClient;
/// use community_client::traits::{Headers, HttpClient};
///
/// let client = ReqwestHttpClient::new();
/// let body = client.get_stream("https://example.com/stream", &Headers::new()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Create a client with keep-alive and pooling tuned for long-lived streams.
    pub fn new() -> Self {
        Self::with_user_agent(None)
    }

    /// Same as [`new`](Self::new), sending the given `User-Agent`.
    pub fn with_user_agent(user_agent: Option<&str>) -> Self {
        let mut builder = reqwest::Client::builder()
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .tcp_keepalive(TCP_KEEPALIVE);
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent.to_string());
        }

        let client = match builder.build() {
            Ok(client) => client,
            Err(e) => {
                warn!("Failed to build tuned HTTP client, using defaults: {}", e);
                reqwest::Client::new()
            }
        };
        Self { client }
    }

    /// Convert reqwest error to HttpError.
    fn convert_error(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::ConnectionFailed(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidUrl(err.to_string())
        } else {
            HttpError::Other(err.to_string())
        }
    }

    /// Read the body of a failed response without waiting on a body that never ends.
    async fn error_message(response: reqwest::Response) -> String {
        match tokio::time::timeout(ERROR_BODY_TIMEOUT, response.text()).await {
            Ok(Ok(text)) => text,
            Ok(Err(_)) => "Unknown error".to_string(),
            Err(_) => "error body not received in time".to_string(),
        }
    }

    /// Apply headers to a request builder.
    fn apply_headers(
        builder: reqwest::RequestBuilder,
        headers: &Headers,
    ) -> reqwest::RequestBuilder {
        let mut builder = builder;
        for (key, value) in headers {
            builder = builder.header(key, value);
        }
        builder
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError> {
        let builder = Self::apply_headers(self.client.get(url), headers);

        let response = builder.send().await.map_err(Self::convert_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = Self::error_message(response).await;
            return Err(HttpError::ServerError { status, message });
        }

        let stream = response.bytes_stream().map(|result| {
            result.map_err(|e| {
                if e.is_timeout() {
                    HttpError::Timeout(e.to_string())
                } else {
                    HttpError::Io(e.to_string())
                }
            })
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_user_agent_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "community-client-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string(":ok\n"))
            .expect(1)
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::with_user_agent(Some("community-client-test"));
        let result = client.get_stream(&server.uri(), &Headers::new()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_non_success_status_is_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new();
        let result = client.get_stream(&server.uri(), &Headers::new()).await;
        assert!(matches!(
            result,
            Err(HttpError::ServerError { status: 503, ref message }) if message.as_str() == "maintenance"
        ));
    }

    #[tokio::test]
    async fn test_stalled_error_body_does_not_block() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;
            // Promise a body that never arrives
            socket
                .write_all(b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 100\r\n\r\npartial")
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let client = ReqwestHttpClient::new();
        let url = format!("http://{}/stream", addr);
        let result = tokio::time::timeout(
            ERROR_BODY_TIMEOUT + Duration::from_secs(3),
            client.get_stream(&url, &Headers::new()),
        )
        .await
        .expect("error body read should be bounded");

        assert!(matches!(result, Err(HttpError::ServerError { status: 503, .. })));
        server.abort();
    }

    #[test]
    fn test_apply_headers() {
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());

        let client = reqwest::Client::new();
        let builder = client.get("https://example.com");
        let request = ReqwestHttpClient::apply_headers(builder, &headers)
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get("accept").unwrap(),
            "text/event-stream"
        );
    }

    #[tokio::test]
    async fn test_get_stream_invalid_url() {
        let client = ReqwestHttpClient::new();
        let result = client.get_stream("not-a-valid-url", &Headers::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_stream_connection_refused() {
        let client = ReqwestHttpClient::new();
        // Use a port that's unlikely to be in use
        let result = client
            .get_stream("http://127.0.0.1:59999/stream", &Headers::new())
            .await;
        assert!(matches!(
            result,
            Err(HttpError::ConnectionFailed(_)) | Err(HttpError::Other(_))
        ));
    }
}
