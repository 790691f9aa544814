//! Mock implementations for testing.
//!
//! - [`MockHttpClient`] - Scripted streaming sessions with request recording

mod http;

pub use http::{MockHttpClient, MockSession, RecordedRequest};
