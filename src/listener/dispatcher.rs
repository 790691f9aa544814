//! Fan-out of decoded events and errors to subscribers.

use std::sync::Arc;

use crate::error::{ConfigError, StreamError};
use crate::sse::DecodedEvent;

/// Notification handed to a subscriber: exactly one of event or error.
pub type Notification<'a> = Result<&'a DecodedEvent, &'a StreamError>;

/// Observer of a change stream.
///
/// Any `Fn(Notification<'_>) + Send + Sync` closure is a subscriber.
/// Subscribers run on the listener's task, so they should not block.
pub trait Subscriber: Send + Sync {
    fn observe(&self, notification: Notification<'_>);
}

impl<F> Subscriber for F
where
    F: Fn(Notification<'_>) + Send + Sync,
{
    fn observe(&self, notification: Notification<'_>) {
        self(notification)
    }
}

/// Wrap a closure as a shareable subscriber.
///
/// Passing the closure through this function lets the compiler infer its
/// argument type.
pub fn subscriber<F>(f: F) -> Arc<dyn Subscriber>
where
    F: Fn(Notification<'_>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Ordered, fixed set of subscribers.
#[derive(Clone)]
pub struct Dispatcher {
    subscribers: Arc<[Arc<dyn Subscriber>]>,
}

impl Dispatcher {
    /// Build a dispatcher. An empty list is a configuration error.
    pub fn new(subscribers: Vec<Arc<dyn Subscriber>>) -> Result<Self, ConfigError> {
        if subscribers.is_empty() {
            return Err(ConfigError::NoSubscribers);
        }
        Ok(Self {
            subscribers: subscribers.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Deliver an event to every subscriber in registration order.
    pub fn dispatch_event(&self, event: &DecodedEvent) {
        for subscriber in self.subscribers.iter() {
            subscriber.observe(Ok(event));
        }
    }

    /// Deliver an error to every subscriber in registration order.
    pub fn dispatch_error(&self, error: &StreamError) {
        for subscriber in self.subscribers.iter() {
            subscriber.observe(Err(error));
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
