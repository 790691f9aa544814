//! Supervisor that restarts change-stream sessions forever.
//!
//! There is no attempt limit. With the default [`ReconnectPolicy::Immediate`]
//! a new session starts as soon as the previous one ends, whatever the
//! reason. [`ReconnectPolicy::Backoff`] waits between unproductive sessions
//! instead, which keeps an unreachable endpoint from being hammered.

use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::listener::session::{shutdown_requested, Session, SessionOutcome};

/// Listener lifecycle, published on a watch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Created, no session started yet
    Idle,
    /// Waiting for the response to session `session`
    Connecting { session: u64 },
    /// Receiving data on session `session`
    Streaming { session: u64 },
    /// Session `session` failed; a new one follows
    Errored { session: u64 },
    /// Session `session` was closed by the server; a new one follows
    Ended { session: u64 },
    /// Shut down on request. Terminal.
    Stopped,
}

impl ListenerState {
    /// Number of the session this state refers to, if any.
    pub fn session(&self) -> Option<u64> {
        match self {
            ListenerState::Connecting { session }
            | ListenerState::Streaming { session }
            | ListenerState::Errored { session }
            | ListenerState::Ended { session } => Some(*session),
            ListenerState::Idle | ListenerState::Stopped => None,
        }
    }
}

/// Delay policy between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPolicy {
    /// Start the next session at once
    #[default]
    Immediate,
    /// Double the delay after each session that produced no frames,
    /// starting at `initial` and capped at `max`
    Backoff { initial: Duration, max: Duration },
}

impl ReconnectPolicy {
    /// Delay before the next session after `failures` unproductive sessions
    /// in a row. Zero failures means no delay.
    pub fn delay(&self, failures: u32) -> Duration {
        match self {
            ReconnectPolicy::Immediate => Duration::ZERO,
            ReconnectPolicy::Backoff { initial, max } => {
                if failures == 0 {
                    return Duration::ZERO;
                }
                let factor = 1u32.checked_shl(failures - 1).unwrap_or(u32::MAX);
                std::cmp::min(initial.saturating_mul(factor), *max)
            }
        }
    }
}

/// Run sessions until shutdown is requested.
pub(crate) async fn run_reconnect_loop(
    session: Session,
    policy: ReconnectPolicy,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut session_id: u64 = 0;
    let mut failures: u32 = 0;

    loop {
        session_id += 1;
        let report = session.run(session_id, &mut shutdown).await;

        match report.outcome {
            SessionOutcome::Cancelled => break,
            SessionOutcome::Ended => {
                info!("{} stream ended, retrying", session.resource);
                session
                    .state_tx
                    .send_replace(ListenerState::Ended { session: session_id });
            }
            SessionOutcome::Failed(e) => {
                error!(
                    "got error from {} change stream, retrying: {}",
                    session.resource, e
                );
                session
                    .state_tx
                    .send_replace(ListenerState::Errored { session: session_id });
                session.report_transport_error(e);
            }
        }

        if report.frames > 0 {
            failures = 0;
        } else {
            failures = failures.saturating_add(1);
        }

        if *shutdown.borrow() {
            break;
        }

        let delay = policy.delay(failures);
        if delay.is_zero() {
            // Give other tasks a turn before hitting the server again
            tokio::task::yield_now().await;
        } else {
            debug!(
                "Reconnecting to {} in {:?} ({} failed sessions)",
                session.resource, delay, failures
            );
            tokio::select! {
                _ = shutdown_requested(&mut shutdown) => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    info!("{} change-stream listener stopped", session.resource);
    session.state_tx.send_replace(ListenerState::Stopped);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_never_waits() {
        let policy = ReconnectPolicy::Immediate;
        assert_eq!(policy.delay(0), Duration::ZERO);
        assert_eq!(policy.delay(50), Duration::ZERO);
    }

    #[test]
    fn test_default_policy_is_immediate() {
        assert_eq!(ReconnectPolicy::default(), ReconnectPolicy::Immediate);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = ReconnectPolicy::Backoff {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
        };

        assert_eq!(policy.delay(0), Duration::ZERO);
        assert_eq!(policy.delay(1), Duration::from_secs(1));
        assert_eq!(policy.delay(2), Duration::from_secs(2));
        assert_eq!(policy.delay(3), Duration::from_secs(4));
        assert_eq!(policy.delay(5), Duration::from_secs(16));
        // 2^5 = 32s, capped at 30s
        assert_eq!(policy.delay(6), Duration::from_secs(30));
        assert_eq!(policy.delay(200), Duration::from_secs(30));
    }

    #[test]
    fn test_listener_state_session() {
        assert_eq!(ListenerState::Idle.session(), None);
        assert_eq!(ListenerState::Streaming { session: 3 }.session(), Some(3));
        assert_eq!(ListenerState::Ended { session: 4 }.session(), Some(4));
        assert_eq!(ListenerState::Stopped.session(), None);
    }
}
