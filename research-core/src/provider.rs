//! Basket-provider traits and the orthogonal capability interfaces baskets compose.
//!
//! Per-basket providers share behavior (rate-limiter gating, breaker gating,
//! retry, parsing, always-respond) without forming a type hierarchy: each
//! capability is a focused trait a provider may implement independently.

use async_trait::async_trait;
use research_types::ResearchError;

use crate::types::{BasketResult, Ticker};

/// A single upstream data source within a basket's fallback chain.
///
/// Implementors fetch and parse one provider's payload for a ticker; they do
/// not apply retries, rate limiting, or circuit breaking themselves — the
/// basket worker's fallback-chain driver wraps each provider call with those
/// concerns via [`RateLimited`], [`CircuitBroken`], and [`Cached`].
#[async_trait]
pub trait BasketProvider: Send + Sync {
    /// Stable identifier used to key rate limiters, breakers, and caches
    /// (e.g. `"sec_edgar"`).
    fn provider_id(&self) -> &'static str;

    /// Human-readable source name recorded in the resulting
    /// [`SourceEnvelope`](crate::types::SourceEnvelope), e.g. `"SEC EDGAR"`.
    fn source_name(&self) -> &'static str;

    /// Fetch and parse this provider's contribution for `ticker`.
    ///
    /// An empty, non-error result (e.g. no news items) is a valid outcome;
    /// only a genuine failure should return `Err`.
    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError>;
}

/// Orthogonal capability: this value gates admission through a rate limiter.
#[async_trait]
pub trait RateLimited: Send + Sync {
    /// Attempt to acquire one unit of capacity within the configured wait budget.
    ///
    /// # Errors
    /// Returns [`ResearchError::RateLimited`] if capacity could not be
    /// acquired before the wait budget elapsed.
    async fn acquire(&self) -> Result<(), ResearchError>;
}

/// Orthogonal capability: this value gates admission through a circuit breaker
/// and records the outcome of calls it admitted.
pub trait CircuitBroken: Send + Sync {
    /// Check whether a call should be admitted right now.
    ///
    /// # Errors
    /// Returns [`ResearchError::CircuitOpen`] if the breaker forbids the call.
    fn check(&self) -> Result<(), ResearchError>;

    /// Record that an admitted call succeeded.
    fn record_success(&self);

    /// Record that an admitted call failed.
    fn record_failure(&self);
}

/// Orthogonal capability: this value can serve cached values keyed by a string.
pub trait Cached: Send + Sync {
    /// Look up a previously cached value, if still within its TTL.
    fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Store a value for later retrieval, tagged with its namespace TTL.
    fn set(&self, key: &str, value: serde_json::Value);
}

/// Orthogonal capability: transforms a raw provider payload into canonical data.
///
/// Parsers use tagged variants over duck-typed lookups: every leaf read that
/// might be absent falls back to `null` rather than panicking or erroring.
pub trait Parser: Send + Sync {
    /// Parse `raw` into metric/content data for the given ticker.
    ///
    /// # Errors
    /// Returns [`ResearchError::ParseError`] if `raw` does not match the
    /// provider's expected shape closely enough to extract any fields.
    fn parse(&self, ticker: &Ticker, raw: &serde_json::Value) -> Result<BasketResult, ResearchError>;
}
