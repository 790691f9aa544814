//! Decoded change-stream types

use serde::{Deserialize, Serialize};

use crate::error::StreamError;

/// One payload line decoded for the currently announced event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedEvent {
    /// Announced event name, e.g. `PostCreated` (without the `": "` suffix)
    pub event_label: String,
    /// Parsed JSON payload
    pub payload: serde_json::Value,
}

impl DecodedEvent {
    pub fn new(event_label: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_label: event_label.into(),
            payload,
        }
    }

    /// Deserialize the payload into a concrete type.
    pub fn payload_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}

/// Output of the decoder for a single line.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// `:ok` liveness/acknowledgment line
    Heartbeat,
    /// Successfully decoded payload line
    Event(DecodedEvent),
    /// Decode or protocol error for this line only
    Error(StreamError),
}

/// Value the readiness gate resolves with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEstablished {
    pub created: bool,
}

impl Default for StreamEstablished {
    fn default() -> Self {
        Self { created: true }
    }
}
