//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - Pooled, keep-alive HTTP client using reqwest
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides a scripted HTTP client:
//! - [`mock::MockHttpClient`] - Replays one scripted session per request

pub mod mock;
pub mod reqwest_http;

pub use mock::{MockHttpClient, MockSession};
pub use reqwest_http::ReqwestHttpClient;
