//! Errors delivered to change-stream subscribers.
//!
//! None of these end a listener. Decode and protocol errors concern a single
//! line; transport errors end the current session and the listener reconnects.

use std::fmt;

use crate::traits::HttpError;

/// Error half of a subscriber notification.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// The HTTP session failed to open or broke while streaming.
    Transport(HttpError),

    /// A payload line for the announced event was not valid JSON.
    Decode {
        event_label: String,
        message: String,
    },

    /// A line matched none of the framing rules.
    Protocol {
        line: String,
        message: String,
    },
}

impl StreamError {
    /// Protocol error for a line that matched nothing.
    pub fn protocol(line: impl Into<String>) -> Self {
        StreamError::Protocol {
            line: line.into(),
            message: "unrecognized stream content".to_string(),
        }
    }

    /// Protocol error for an `event: ` line without a valid name.
    pub fn invalid_announcement(line: impl Into<String>) -> Self {
        StreamError::Protocol {
            line: line.into(),
            message: "event announcement without a valid name".to_string(),
        }
    }

    /// True if the error ended a session.
    pub fn is_transport(&self) -> bool {
        matches!(self, StreamError::Transport(_))
    }

    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Transport(_) => "E_STREAM_TRANSPORT",
            StreamError::Decode { .. } => "E_STREAM_JSON",
            StreamError::Protocol { .. } => "E_STREAM_PROTOCOL",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Transport(e) => write!(f, "Change stream transport error: {}", e),
            StreamError::Decode {
                event_label,
                message,
            } => {
                write!(f, "Invalid JSON for {} event: {}", event_label, message)
            }
            StreamError::Protocol { line, message } => {
                write!(f, "{}: {:?}", message, line)
            }
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Transport(e) => Some(e),
            _ => None,
        }
    }
}
