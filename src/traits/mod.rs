//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - Streaming HTTP GET used by change-stream sessions

pub mod http;

pub use http::{ByteStream, Headers, HttpClient, HttpError};
