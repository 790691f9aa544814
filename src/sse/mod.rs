//! Change-stream frame decoder
//!
//! Parses the minimal event-stream framing used by the change-stream endpoint.
//! The format consists of:
//! - `:ok` - heartbeat, sent once the stream is accepted
//! - `event: <Name>` - announces the type of the events that follow
//! - `<Name>: <json>` - payload line for the last announced event
//! - Empty line - separator (ignored)
//!
//! Any other line is a protocol error. Errors are returned as data
//! ([`Frame::Error`]) and never abort decoding.
//!
//! # Module structure
//! - `events` - Decoded types (DecodedEvent, Frame, StreamEstablished)
//! - `parser` - Stateful FrameDecoder

mod events;
mod parser;

// Re-export public types
pub use events::{DecodedEvent, Frame, StreamEstablished};
pub use parser::{FrameDecoder, ANNOUNCEMENT_PREFIX, HEARTBEAT_MARKER};
