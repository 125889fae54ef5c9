//! Shared library for cross-cutting concerns of the LUIS router client.
//!
//! This crate provides centralized implementations for:
//! - Error types with retryability classification
//! - HTTP client configuration and building
//! - Retry budgets with fixed or exponential backoff
//! - Counter metrics in Prometheus text format
//! - Tracing subscriber initialization

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod http;
pub mod metrics;
pub mod retry;
pub mod tracing_config;

pub use error::PlatformError;
pub use http::{HttpConfig, build_http_client};
pub use metrics::Counter;
pub use retry::{Retryable, RetryConfig, RetryPolicy};
pub use tracing_config::{TracingConfig, init_tracing};
