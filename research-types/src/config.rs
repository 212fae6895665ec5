//! Configuration types for rate limiting, circuit breaking, and caching.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The six basket categories, in their fixed invocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BasketId {
    /// Financial statements, filings, and ratios.
    Fundamentals,
    /// Price targets, multiples, and intrinsic-value estimates.
    Valuation,
    /// Historical and implied volatility measures.
    Volatility,
    /// Macroeconomic indicators relevant to the ticker's sector.
    Macro,
    /// News headlines and article summaries.
    News,
    /// Aggregate sentiment scores derived from news and social sources.
    Sentiment,
}

impl BasketId {
    /// All baskets, in the fixed order the aggregator invokes them.
    pub const ALL: [Self; 6] = [
        Self::Fundamentals,
        Self::Valuation,
        Self::Volatility,
        Self::Macro,
        Self::News,
        Self::Sentiment,
    ];

    /// Lowercase, stable identifier used in task output and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fundamentals => "fundamentals",
            Self::Valuation => "valuation",
            Self::Volatility => "volatility",
            Self::Macro => "macro",
            Self::News => "news",
            Self::Sentiment => "sentiment",
        }
    }
}

/// Identifier for an upstream data provider, used to key rate limiters,
/// circuit breakers, and caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ProviderId {
    /// SEC EDGAR XBRL company facts API.
    SecEdgar,
    /// Yahoo Finance quote and fundamentals endpoints.
    YahooFinance,
    /// Finnhub market data API.
    Finnhub,
    /// FRED macroeconomic series API.
    Fred,
    /// Reddit sentiment source.
    Reddit,
    /// New York Times article search API.
    Nyt,
    /// NewsAPI headline search.
    NewsApi,
    /// Tavily web search API.
    Tavily,
    /// Bureau of Economic Analysis national-accounts API.
    Bea,
    /// Bureau of Labor Statistics timeseries API.
    Bls,
    /// Alpha Vantage market data API.
    AlphaVantage,
}

impl ProviderId {
    /// Every registered provider, for building per-provider limiter/breaker tables.
    pub const ALL: [Self; 11] = [
        Self::SecEdgar,
        Self::YahooFinance,
        Self::Finnhub,
        Self::Fred,
        Self::Reddit,
        Self::Nyt,
        Self::NewsApi,
        Self::Tavily,
        Self::Bea,
        Self::Bls,
        Self::AlphaVantage,
    ];

    /// Lowercase, stable identifier used in error messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SecEdgar => "sec_edgar",
            Self::YahooFinance => "yahoo_finance",
            Self::Finnhub => "finnhub",
            Self::Fred => "fred",
            Self::Reddit => "reddit",
            Self::Nyt => "nyt",
            Self::NewsApi => "newsapi",
            Self::Tavily => "tavily",
            Self::Bea => "bea",
            Self::Bls => "bls",
            Self::AlphaVantage => "alpha_vantage",
        }
    }
}

/// Rate limiting strategy applied per-provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RateLimiterConfig {
    /// Burst-friendly limiter: refills continuously at `rate` tokens/sec up to `capacity`.
    TokenBucket {
        /// Tokens refilled per second.
        rate: f64,
        /// Maximum burst capacity.
        capacity: u32,
    },
    /// Strict limiter: at most `max_requests` requests in any trailing `window`.
    SlidingWindow {
        /// Maximum requests allowed within the window.
        max_requests: u32,
        /// Window duration.
        window: Duration,
    },
    /// Calendar-day limiter: at most `daily_limit` requests per UTC day.
    DailyQuota {
        /// Maximum requests allowed per day.
        daily_limit: u32,
    },
}

impl RateLimiterConfig {
    /// The default limiter configuration for a known provider, mirroring the
    /// fixed per-API limits enforced during stress testing.
    #[must_use]
    pub const fn default_for(provider: ProviderId) -> Self {
        match provider {
            ProviderId::SecEdgar => Self::TokenBucket {
                rate: 10.0,
                capacity: 10,
            },
            ProviderId::YahooFinance => Self::TokenBucket {
                rate: 5.0,
                capacity: 20,
            },
            ProviderId::Finnhub => Self::TokenBucket {
                rate: 1.0,
                capacity: 5,
            },
            ProviderId::Fred => Self::SlidingWindow {
                max_requests: 120,
                window: Duration::from_secs(60),
            },
            ProviderId::Reddit => Self::SlidingWindow {
                max_requests: 100,
                window: Duration::from_secs(60),
            },
            ProviderId::Nyt => Self::DailyQuota { daily_limit: 500 },
            ProviderId::NewsApi => Self::DailyQuota { daily_limit: 100 },
            ProviderId::Tavily => Self::DailyQuota { daily_limit: 33 },
            ProviderId::Bea => Self::SlidingWindow {
                max_requests: 100,
                window: Duration::from_secs(60),
            },
            ProviderId::Bls => Self::DailyQuota { daily_limit: 500 },
            ProviderId::AlphaVantage => Self::SlidingWindow {
                max_requests: 5,
                window: Duration::from_secs(60),
            },
        }
    }
}

/// Circuit breaker thresholds, shared by all providers unless overridden.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures (while CLOSED) before the breaker trips to OPEN.
    pub failure_threshold: u32,
    /// Consecutive successes (while HALF_OPEN) before the breaker resets to CLOSED.
    pub success_threshold: u32,
    /// Time the breaker stays OPEN before allowing a single HALF_OPEN probe.
    pub half_open_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            half_open_timeout: Duration::from_secs(30),
        }
    }
}

/// Cache namespace, used to key TTLs independently per payload category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CacheNamespace {
    /// Ticker-to-identifier resolution results.
    Identifier,
    /// Parsed XBRL company facts.
    Xbrl,
    /// Company profile/info lookups.
    CompanyInfo,
}

/// Per-namespace cache TTLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for ticker/identifier resolution entries.
    pub identifier_ttl: Duration,
    /// TTL for parsed XBRL company-facts entries.
    pub xbrl_ttl: Duration,
    /// TTL for company profile/info entries.
    pub company_info_ttl: Duration,
}

impl CacheConfig {
    /// TTL configured for a given namespace.
    #[must_use]
    pub const fn ttl_for(&self, namespace: CacheNamespace) -> Duration {
        match namespace {
            CacheNamespace::Identifier => self.identifier_ttl,
            CacheNamespace::Xbrl => self.xbrl_ttl,
            CacheNamespace::CompanyInfo => self.company_info_ttl,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            identifier_ttl: Duration::from_secs(24 * 60 * 60),
            xbrl_ttl: Duration::from_secs(60 * 60),
            company_info_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Top-level configuration for the research aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Overall per-task deadline before the task is marked `FAILED` with a timeout error.
    pub task_timeout: Duration,
    /// Timeout applied to a single provider call within a basket's fallback chain.
    pub provider_timeout: Duration,
    /// Number of retries for a basket's primary provider before falling to the next.
    pub retries_per_provider: u32,
    /// Relative tolerance used when reconciling a scalar metric reported by more
    /// than one provider (e.g., `0.005` for 0.5%).
    pub conflict_tolerance: f64,
    /// Circuit breaker thresholds, shared across providers.
    pub circuit_breaker: CircuitBreakerConfig,
    /// Cache TTLs, keyed by namespace.
    pub cache: CacheConfig,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            task_timeout: Duration::from_secs(90),
            provider_timeout: Duration::from_secs(10),
            retries_per_provider: 1,
            conflict_tolerance: 0.005,
            circuit_breaker: CircuitBreakerConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}
