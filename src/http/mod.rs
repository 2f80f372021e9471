//! HTTP client layer: `ListingsHttp` with per-endpoint retry policies.

pub mod client;
pub mod retry;

pub use client::ListingsHttp;
pub use retry::{RetryConfig, RetryPolicy};
