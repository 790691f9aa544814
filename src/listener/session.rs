//! A single streaming GET against the change-stream endpoint.

use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::StreamError;
use crate::listener::dispatcher::Dispatcher;
use crate::listener::readiness::ReadinessGate;
use crate::listener::reconnect::ListenerState;
use crate::sse::{Frame, FrameDecoder};
use crate::traits::{Headers, HttpClient, HttpError};

/// How a session ended. Reported exactly once per session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// The server closed the stream
    Ended,
    /// The request failed to open or broke mid-stream
    Failed(HttpError),
    /// The listener was asked to stop
    Cancelled,
}

/// Result of running one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    /// Frames decoded during the session, heartbeats included
    pub frames: usize,
}

/// Everything a session needs; shared by every session of one listener.
pub struct Session {
    pub(crate) http: Arc<dyn HttpClient>,
    pub(crate) url: String,
    pub(crate) resource: String,
    pub(crate) headers: Headers,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) gate: ReadinessGate,
    pub(crate) state_tx: watch::Sender<ListenerState>,
}

impl Session {
    /// Open the stream and pump it until it ends, fails or is cancelled.
    pub async fn run(&self, session: u64, shutdown: &mut watch::Receiver<bool>) -> SessionReport {
        self.state_tx.send_replace(ListenerState::Connecting { session });
        debug!("Opening {} change stream (session {})", self.resource, session);

        let opened = tokio::select! {
            biased;
            _ = shutdown_requested(shutdown) => return Self::report(SessionOutcome::Cancelled, 0),
            result = self.http.get_stream(&self.url, &self.headers) => result,
        };
        let mut body = match opened {
            Ok(body) => body,
            Err(e) => return Self::report(SessionOutcome::Failed(e), 0),
        };

        self.state_tx.send_replace(ListenerState::Streaming { session });

        // A new connection carries no announcement context
        let mut decoder = FrameDecoder::new();
        let mut frames = 0;

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown_requested(shutdown) => {
                    return Self::report(SessionOutcome::Cancelled, frames);
                }
                next = body.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    for frame in decoder.feed_chunk(&chunk) {
                        frames += 1;
                        self.handle_frame(frame);
                    }
                }
                Some(Err(e)) => return Self::report(SessionOutcome::Failed(e), frames),
                None => return Self::report(SessionOutcome::Ended, frames),
            }
        }
    }

    fn handle_frame(&self, frame: Frame) {
        match frame {
            Frame::Heartbeat => {
                if self.gate.resolve() {
                    debug!("{} change stream established", self.resource);
                }
                info!("Started listening to {}", self.resource);
            }
            Frame::Event(event) => self.dispatcher.dispatch_event(&event),
            Frame::Error(error) => {
                debug!("{} change stream: {}", self.resource, error);
                self.dispatcher.dispatch_error(&error);
            }
        }
    }

    /// Surface a transport failure to subscribers.
    pub(crate) fn report_transport_error(&self, error: HttpError) {
        self.dispatcher.dispatch_error(&StreamError::Transport(error));
    }

    fn report(outcome: SessionOutcome, frames: usize) -> SessionReport {
        SessionReport { outcome, frames }
    }
}

/// Resolves once shutdown is requested. Never resolves if the handle was
/// dropped without asking, which leaves the listener running.
pub(crate) async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockSession};
    use crate::listener::dispatcher::{subscriber, Notification};
    use serde_json::json;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<Result<crate::sse::DecodedEvent, StreamError>>>>;

    fn session_with(mock: &MockHttpClient) -> (Session, Log, crate::listener::readiness::Readiness) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let dispatcher = Dispatcher::new(vec![subscriber(move |n: Notification<'_>| {
            sink.lock().unwrap().push(n.cloned().map_err(|e| e.clone()));
        })])
        .unwrap();
        let (gate, readiness) = ReadinessGate::new();
        let (state_tx, _) = watch::channel(ListenerState::Idle);
        let session = Session {
            http: Arc::new(mock.clone()),
            url: "http://community.test/api/Posts/change-stream?_format=event-stream".to_string(),
            resource: "Posts".to_string(),
            headers: Headers::new(),
            dispatcher,
            gate,
            state_tx,
        };
        (session, log, readiness)
    }

    #[tokio::test]
    async fn test_session_decodes_and_ends() {
        let mock = MockHttpClient::new();
        mock.push_session(MockSession::lines(&[
            ":ok",
            "event: PostCreated",
            r#"PostCreated: {"id":1}"#,
        ]));
        let (session, log, readiness) = session_with(&mock);
        let (_stop_tx, mut stop_rx) = watch::channel(false);

        let report = session.run(1, &mut stop_rx).await;

        assert_eq!(report.outcome, SessionOutcome::Ended);
        assert_eq!(report.frames, 2);
        assert!(readiness.is_ready());
        assert_eq!(
            *log.lock().unwrap(),
            vec![Ok(crate::sse::DecodedEvent::new("PostCreated", json!({"id": 1})))]
        );
    }

    #[tokio::test]
    async fn test_session_reports_connect_failure() {
        let mock = MockHttpClient::new();
        mock.push_session(MockSession::ConnectError(HttpError::ConnectionFailed(
            "dns".to_string(),
        )));
        let (session, log, readiness) = session_with(&mock);
        let (_stop_tx, mut stop_rx) = watch::channel(false);

        let report = session.run(1, &mut stop_rx).await;

        assert_eq!(
            report.outcome,
            SessionOutcome::Failed(HttpError::ConnectionFailed("dns".to_string()))
        );
        assert!(!readiness.is_ready());
        // The loop, not the session, decides what subscribers hear
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_session_cancelled_while_streaming() {
        let mock = MockHttpClient::new();
        mock.push_session(MockSession::held_lines(&[":ok"]));
        let (session, _log, readiness) = session_with(&mock);
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            stop_tx.send_replace(true);
            stop_tx
        });

        let report = session.run(1, &mut stop_rx).await;
        assert_eq!(report.outcome, SessionOutcome::Cancelled);
        assert!(readiness.is_ready());
        drop(stopper.await.unwrap());
    }

    #[tokio::test]
    async fn test_session_decodes_newline_free_chunks_on_arrival() {
        let mock = MockHttpClient::new();
        mock.push_session(MockSession::held_chunks(&[
            ":ok",
            "event: PostCreated",
            r#"PostCreated: {"id":4}"#,
        ]));
        let (session, log, readiness) = session_with(&mock);
        let (stop_tx, mut stop_rx) = watch::channel(false);

        // The stream stays open, so every frame must come from the chunks alone
        let watcher = readiness.clone();
        let stopper = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            let ready = watcher.is_ready();
            stop_tx.send_replace(true);
            (ready, stop_tx)
        });

        let report = session.run(1, &mut stop_rx).await;
        let (ready_while_open, _stop_tx) = stopper.await.unwrap();

        assert!(ready_while_open);
        assert_eq!(report.outcome, SessionOutcome::Cancelled);
        assert_eq!(report.frames, 2);
        assert_eq!(
            *log.lock().unwrap(),
            vec![Ok(crate::sse::DecodedEvent::new("PostCreated", json!({"id": 4})))]
        );
    }
}
