//! Typed client for the upstream tournament API.
//!
//! The library wraps the paginated REST endpoints with retrying, rate-limited
//! fetch operations and converts the wire payloads into the shared domain
//! types.

pub mod client;
pub mod dto;
pub mod metrics;

pub use client::{RetryPolicy, UpstreamClient};
