//! research-fetch
//!
//! The Upstream Fetcher: an HTTP client that gates every call through a
//! per-provider circuit breaker and rate limiter, retries transient failures
//! with exponential backoff, and runs blocking third-party SDK calls on a
//! bounded worker pool.
#![warn(missing_docs)]

mod fetch;
mod worker_pool;

pub use fetch::{FetchedBody, UpstreamFetcher};
pub use worker_pool::BlockingWorkerPool;
