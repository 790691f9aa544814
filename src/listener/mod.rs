//! Durable change-stream listener.
//!
//! A listener owns one background task that runs transport sessions back to
//! back for as long as the process lives:
//!
//! ```text
//! Idle -> Connecting -> Streaming -> (Errored | Ended) -> Connecting -> ...
//! ```
//!
//! Frames decoded by a session go to the [`Dispatcher`]; the first heartbeat
//! resolves the readiness gate. Nothing that happens after creation ends the
//! listener except an explicit [`ChangeStreamListener::shutdown`].
//!
//! # Module structure
//! - `dispatcher` - Subscriber trait and ordered fan-out
//! - `readiness` - One-shot "stream established" gate
//! - `session` - One streaming GET feeding the frame decoder
//! - `reconnect` - Unbounded restart loop and its policy

pub mod dispatcher;
pub mod readiness;
pub mod reconnect;
pub mod session;

pub use dispatcher::{subscriber, Dispatcher, Notification, Subscriber};
pub use readiness::{Readiness, ReadinessGate};
pub use reconnect::{ListenerState, ReconnectPolicy};
pub use session::{SessionOutcome, SessionReport};

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::ListenerError;
use crate::sse::StreamEstablished;
use crate::traits::{Headers, HttpClient};
use session::Session;

/// Everything needed to start a listener.
pub struct ListenerConfig {
    /// Full change-stream URL
    pub url: String,
    /// Resource name, used in logs
    pub resource: String,
    /// Extra request headers
    pub headers: Headers,
    pub policy: ReconnectPolicy,
}

/// Handle to a running change-stream listener.
///
/// Dropping the handle does not stop the listener; call
/// [`shutdown`](Self::shutdown) or [`stop`](Self::stop) for that.
#[derive(Debug)]
pub struct ChangeStreamListener {
    resource: String,
    url: String,
    readiness: Readiness,
    state_rx: watch::Receiver<ListenerState>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ChangeStreamListener {
    /// Spawn the listener task. Must be called from within a tokio runtime.
    pub fn spawn(
        http: Arc<dyn HttpClient>,
        dispatcher: Dispatcher,
        config: ListenerConfig,
    ) -> Self {
        let ListenerConfig {
            url,
            resource,
            mut headers,
            policy,
        } = config;
        headers
            .entry("Accept".to_string())
            .or_insert_with(|| "text/event-stream".to_string());

        let (gate, readiness) = ReadinessGate::new();
        let (state_tx, state_rx) = watch::channel(ListenerState::Idle);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            "Starting change-stream listener for {} ({} subscribers)",
            resource,
            dispatcher.len()
        );

        let session = Session {
            http,
            url: url.clone(),
            resource: resource.clone(),
            headers,
            dispatcher,
            gate,
            state_tx,
        };
        let task = tokio::spawn(reconnect::run_reconnect_loop(session, policy, shutdown_rx));

        Self {
            resource,
            url,
            readiness,
            state_rx,
            shutdown_tx,
            task,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Wait until the stream has been established once.
    ///
    /// Resolves on the first heartbeat and stays resolved across reconnects.
    /// Stays pending while the endpoint is unreachable.
    pub async fn ready(&self) -> Result<StreamEstablished, ListenerError> {
        self.readiness.wait().await
    }

    pub fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    /// Cloneable readiness waiter, usable after the handle is moved.
    pub fn readiness(&self) -> Readiness {
        self.readiness.clone()
    }

    /// Get the current listener state
    pub fn state(&self) -> ListenerState {
        *self.state_rx.borrow()
    }

    /// Subscribe to listener state changes
    pub fn state_receiver(&self) -> watch::Receiver<ListenerState> {
        self.state_rx.clone()
    }

    /// Ask the listener to stop at its next suspension point.
    pub fn shutdown(&self) {
        info!("Shutting down {} change-stream listener", self.resource);
        self.shutdown_tx.send_replace(true);
    }

    /// Stop the listener and wait for its task to finish.
    pub async fn stop(self) {
        self.shutdown();
        let _ = self.task.await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
