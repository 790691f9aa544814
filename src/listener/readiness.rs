//! One-shot "stream established" signal.
//!
//! The gate resolves on the first heartbeat a listener ever sees and stays
//! resolved across reconnects. It has no failure path of its own: an endpoint
//! that never answers leaves it pending. Waiters only get an error when the
//! listener is shut down before it was ever ready.

use tokio::sync::watch;

use crate::error::ListenerError;
use crate::sse::StreamEstablished;

/// Resolving side, owned by the listener task.
#[derive(Debug)]
pub struct ReadinessGate {
    tx: watch::Sender<Option<StreamEstablished>>,
}

/// Waiting side, cloneable.
#[derive(Debug, Clone)]
pub struct Readiness {
    rx: watch::Receiver<Option<StreamEstablished>>,
}

impl ReadinessGate {
    pub fn new() -> (Self, Readiness) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, Readiness { rx })
    }

    /// Resolve the gate. Returns true only for the call that resolved it.
    pub fn resolve(&self) -> bool {
        self.tx.send_if_modified(|value| {
            if value.is_some() {
                return false;
            }
            *value = Some(StreamEstablished::default());
            true
        })
    }

    pub fn is_resolved(&self) -> bool {
        self.tx.borrow().is_some()
    }
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Wait for the gate to resolve.
    pub async fn wait(&self) -> Result<StreamEstablished, ListenerError> {
        let mut rx = self.rx.clone();
        let resolved = match rx.wait_for(Option::is_some).await {
            Ok(value) => *value,
            Err(_) => None,
        };
        resolved.ok_or(ListenerError::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_resolves_exactly_once() {
        let (gate, readiness) = ReadinessGate::new();
        assert!(!readiness.is_ready());

        assert!(gate.resolve());
        assert!(!gate.resolve());
        assert!(!gate.resolve());

        assert!(gate.is_resolved());
        assert_eq!(
            readiness.wait().await,
            Ok(StreamEstablished { created: true })
        );
    }

    #[tokio::test]
    async fn test_pending_until_resolved() {
        let (gate, readiness) = ReadinessGate::new();

        let pending = tokio::time::timeout(Duration::from_millis(20), readiness.wait()).await;
        assert!(pending.is_err());

        let waiter = {
            let readiness = readiness.clone();
            tokio::spawn(async move { readiness.wait().await })
        };
        gate.resolve();
        assert_eq!(waiter.await.unwrap(), Ok(StreamEstablished::default()));
    }

    #[tokio::test]
    async fn test_resolved_value_survives_gate_drop() {
        let (gate, readiness) = ReadinessGate::new();
        gate.resolve();
        drop(gate);
        assert!(readiness.wait().await.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_before_ready_reports_stopped() {
        let (gate, readiness) = ReadinessGate::new();
        drop(gate);
        assert_eq!(readiness.wait().await, Err(ListenerError::Stopped));
    }
}
