//! Mock HTTP client for testing.
//!
//! Each `get_stream` call consumes the next scripted [`MockSession`]. Once the
//! script runs out the client hands back a stream that never yields, which
//! parks a reconnecting listener instead of letting it spin.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
}

/// Scripted outcome of one streaming request.
#[derive(Debug, Clone)]
pub enum MockSession {
    /// Yield the chunks, then end normally
    Stream(Vec<Bytes>),
    /// Yield the chunks, then fail mid-stream
    StreamThenError(Vec<Bytes>, HttpError),
    /// Yield the chunks, then stay open forever
    Hold(Vec<Bytes>),
    /// Fail before any body is received
    ConnectError(HttpError),
}

impl MockSession {
    /// Session of newline-terminated lines that ends normally.
    pub fn lines(lines: &[&str]) -> Self {
        MockSession::Stream(Self::line_chunks(lines))
    }

    /// Session of newline-terminated lines that stays open.
    pub fn held_lines(lines: &[&str]) -> Self {
        MockSession::Hold(Self::line_chunks(lines))
    }

    /// Session of raw chunks, one line each with no newline, that stays open.
    pub fn held_chunks(chunks: &[&str]) -> Self {
        MockSession::Hold(
            chunks
                .iter()
                .map(|chunk| Bytes::from(chunk.to_string()))
                .collect(),
        )
    }

    fn line_chunks(lines: &[&str]) -> Vec<Bytes> {
        lines
            .iter()
            .map(|line| Bytes::from(format!("{}\n", line)))
            .collect()
    }
}

/// Mock HTTP client for testing.
///
/// # Example
///
/// ```ignore
/// use community_client::adapters::mock::{MockHttpClient, MockSession};
///
/// let client = MockHttpClient::new();
/// client.push_session(MockSession::lines(&[":ok"]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    /// Sessions handed out in order
    sessions: Arc<Mutex<VecDeque<MockSession>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next unanswered request.
    pub fn push_session(&self, session: MockSession) {
        self.sessions.lock().unwrap().push_back(session);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests made so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Poll until at least `count` requests were made or `timeout` passes.
    pub async fn wait_for_requests(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.request_count() < count {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        true
    }

    fn record_request(&self, url: &str, headers: &Headers) {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            headers: headers.clone(),
        });
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError> {
        self.record_request(url, headers);

        let next = self.sessions.lock().unwrap().pop_front();
        match next.unwrap_or(MockSession::Hold(Vec::new())) {
            MockSession::Stream(chunks) => Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok)))),
            MockSession::StreamThenError(chunks, err) => {
                let items = chunks.into_iter().map(Ok).chain(std::iter::once(Err(err)));
                Ok(Box::pin(stream::iter(items)))
            }
            MockSession::Hold(chunks) => {
                let held = stream::iter(chunks.into_iter().map(Ok)).chain(stream::pending());
                Ok(Box::pin(held))
            }
            MockSession::ConnectError(err) => Err(err),
        }
    }
}
