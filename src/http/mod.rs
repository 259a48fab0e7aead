//! HTTP client module
//!
//! GET-only client used by the Reddit source: retries with backoff,
//! a per-minute token bucket, and optional request authentication.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
mod tests;
