use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error taxonomy shared by the fetcher, baskets, transport, and task manager.
///
/// These are the error *kinds* the research service classifies failures into;
/// they are not 1:1 with any single upstream provider's error shape.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq)]
#[non_exhaustive]
pub enum ResearchError {
    /// Malformed task submission or missing required arguments.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// Unknown task id.
    #[error("task not found: {0}")]
    TaskNotFound(String),

    /// The circuit breaker for a provider forbids the request.
    #[error("circuit open for {provider}, retry after {retry_after_ms}ms")]
    CircuitOpen {
        /// Provider the breaker is protecting.
        provider: String,
        /// Recommended wait before retrying, in milliseconds.
        retry_after_ms: u64,
    },

    /// A token/slot could not be acquired within the wait budget.
    #[error("rate limited by {provider}")]
    RateLimited {
        /// Provider whose limiter rejected the request.
        provider: String,
    },

    /// A non-retryable upstream HTTP status was returned.
    #[error("http error from {provider}: status {status}")]
    HttpError {
        /// Provider that returned the error.
        provider: String,
        /// HTTP status code.
        status: u16,
    },

    /// A per-call, per-tool, or per-task deadline was exceeded.
    #[error("timeout in {scope}")]
    Timeout {
        /// What timed out, e.g. "xbrl fetch", "fundamentals tool", "task".
        scope: String,
    },

    /// A provider payload did not match the expected shape.
    #[error("parse error from {provider}: {message}")]
    ParseError {
        /// Provider whose payload failed to parse.
        provider: String,
        /// Description of the mismatch.
        message: String,
    },

    /// The child-process or HTTP transport failed below the application level.
    #[error("transport error: {0}")]
    TransportError(String),

    /// Opaque/unclassified error, preserved for diagnostics.
    #[error("error: {0}")]
    Other(String),
}

impl ResearchError {
    /// Build an `InvalidParams` error.
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    /// Build a `TaskNotFound` error.
    pub fn task_not_found(id: impl Into<String>) -> Self {
        Self::TaskNotFound(id.into())
    }

    /// Build a `CircuitOpen` error.
    pub fn circuit_open(provider: impl Into<String>, retry_after_ms: u64) -> Self {
        Self::CircuitOpen {
            provider: provider.into(),
            retry_after_ms,
        }
    }

    /// Build a `RateLimited` error.
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
        }
    }

    /// Build an `HttpError`.
    pub fn http_error(provider: impl Into<String>, status: u16) -> Self {
        Self::HttpError {
            provider: provider.into(),
            status,
        }
    }

    /// Build a `Timeout` error.
    pub fn timeout(scope: impl Into<String>) -> Self {
        Self::Timeout {
            scope: scope.into(),
        }
    }

    /// Build a `ParseError`.
    pub fn parse_error(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Status codes that should trigger a bounded retry rather than immediate failure.
    #[must_use]
    pub const fn is_retryable_status(status: u16) -> bool {
        matches!(status, 429 | 500 | 502 | 503 | 504)
    }

    /// JSON-RPC 2.0 error code for this error, per the public task endpoint's error table.
    #[must_use]
    pub const fn json_rpc_code(&self) -> i64 {
        match self {
            Self::InvalidParams(_) => -32602,
            Self::TaskNotFound(_) => -32001,
            _ => -32000,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ResearchError>;
