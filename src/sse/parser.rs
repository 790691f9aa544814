//! Change-stream parsing logic
//!
//! Contains the stateful FrameDecoder that splits each received chunk into
//! lines and classifies each line against the current event announcement.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::StreamError;
use crate::sse::events::{DecodedEvent, Frame};

/// Prefix of the heartbeat line.
pub const HEARTBEAT_MARKER: &str = ":ok";

/// Prefix of an event announcement line.
pub const ANNOUNCEMENT_PREFIX: &str = "event: ";

/// Event name following the announcement prefix.
static ANNOUNCEMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^event: ([a-zA-Z]+)").expect("Invalid announcement regex pattern"));

/// Stateful decoder for one change-stream session.
///
/// `label` is `None` until the first valid announcement, so payload-looking
/// lines before it are protocol errors rather than silent matches. The label
/// is the only state carried between chunks.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Current data-line prefix, `"<Name>: "`
    label: Option<String>,
}

impl FrameDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the last announced event, if any.
    pub fn current_event(&self) -> Option<&str> {
        self.label.as_deref().map(|l| l.trim_end_matches(": "))
    }

    /// Feed one received chunk, returning a frame for every line in it.
    ///
    /// A chunk holds one or more `\n`-separated lines and the end of the
    /// chunk ends its last line, so nothing is held back for the next chunk.
    pub fn feed_chunk(&mut self, chunk: &[u8]) -> Vec<Frame> {
        String::from_utf8_lossy(chunk)
            .split('\n')
            .filter_map(|line| self.feed_line(line))
            .collect()
    }

    /// Classify a single line.
    ///
    /// Returns `None` for announcements and blank separator lines.
    pub fn feed_line(&mut self, line: &str) -> Option<Frame> {
        let line = line.trim_end_matches('\r');

        if line.trim().is_empty() {
            return None;
        }

        if line.starts_with(HEARTBEAT_MARKER) {
            return Some(Frame::Heartbeat);
        }

        if line.starts_with(ANNOUNCEMENT_PREFIX) {
            return match ANNOUNCEMENT_REGEX.captures(line) {
                Some(caps) => {
                    self.label = Some(format!("{}: ", &caps[1]));
                    None
                }
                None => Some(Frame::Error(StreamError::invalid_announcement(line))),
            };
        }

        if let Some(label) = self.label.as_deref() {
            if let Some(payload) = line.strip_prefix(label) {
                let event_label = label.trim_end_matches(": ");
                return Some(match serde_json::from_str(payload) {
                    Ok(value) => Frame::Event(DecodedEvent::new(event_label, value)),
                    Err(e) => Frame::Error(StreamError::Decode {
                        event_label: event_label.to_string(),
                        message: e.to_string(),
                    }),
                });
            }
        }

        Some(Frame::Error(StreamError::protocol(line)))
    }

    /// Reset the decoder state
    pub fn reset(&mut self) {
        self.label = None;
    }
}
