//! Community client - durable change-stream listener
//!
//! Opens a long-lived `GET <endpoint>/api/<Resource>/change-stream?_format=event-stream`,
//! decodes the event framing as it arrives, fans events out to subscribers
//! and reconnects forever when the stream ends or fails.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod listener;
pub mod sse;
pub mod traits;

pub use client::CommunityClient;
pub use config::ClientConfig;
pub use error::{ConfigError, ListenerError, StreamError};
pub use listener::{
    subscriber, ChangeStreamListener, ListenerState, Notification, ReconnectPolicy, Subscriber,
};
pub use sse::{DecodedEvent, StreamEstablished};
