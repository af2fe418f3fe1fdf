//! HTTP client for the server's REST endpoints
//!
//! One-shot JSON requests against the same host as the WebSocket. Failures
//! are returned to the caller; nothing here retries.

mod client;

pub use client::{FetchOptions, HttpError, RestClient};
