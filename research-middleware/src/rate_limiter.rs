//! Rate limiter implementations and the middleware that gates providers with them.
//!
//! Three admission strategies are supported, matching the registered provider
//! configurations: a burst-friendly token bucket, a strict sliding window, and
//! a calendar-day quota counter.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use research_core::provider::{BasketProvider, RateLimited};
use research_core::types::{BasketResult, Ticker};
use research_types::{ProviderId, RateLimiterConfig, ResearchError};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

struct TokenBucketState {
    rate: f64,
    capacity: f64,
    tokens: f64,
    last_update: Instant,
}

impl TokenBucketState {
    fn new(rate: f64, capacity: u32) -> Self {
        Self {
            rate,
            capacity: f64::from(capacity),
            tokens: f64::from(capacity),
            last_update: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_update = now;
    }

    fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

struct SlidingWindowState {
    max_requests: u32,
    window: Duration,
    timestamps: VecDeque<Instant>,
}

impl SlidingWindowState {
    fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            timestamps: VecDeque::new(),
        }
    }

    fn evict_expired(&mut self) {
        let cutoff = Instant::now()
            .checked_sub(self.window)
            .unwrap_or_else(Instant::now);
        while matches!(self.timestamps.front(), Some(t) if *t < cutoff) {
            self.timestamps.pop_front();
        }
    }

    fn try_acquire(&mut self) -> bool {
        self.evict_expired();
        if self.timestamps.len() < self.max_requests as usize {
            self.timestamps.push_back(Instant::now());
            true
        } else {
            false
        }
    }
}

struct DailyQuotaState {
    daily_limit: u32,
    used: u32,
    reset_date: chrono::NaiveDate,
}

impl DailyQuotaState {
    fn new(daily_limit: u32) -> Self {
        Self {
            daily_limit,
            used: 0,
            reset_date: Utc::now().date_naive(),
        }
    }

    fn try_acquire(&mut self) -> bool {
        let today = Utc::now().date_naive();
        if today != self.reset_date {
            self.used = 0;
            self.reset_date = today;
        }
        if self.used < self.daily_limit {
            self.used += 1;
            true
        } else {
            false
        }
    }
}

enum LimiterState {
    TokenBucket(TokenBucketState),
    SlidingWindow(SlidingWindowState),
    DailyQuota(DailyQuotaState),
}

impl LimiterState {
    fn from_config(config: RateLimiterConfig) -> Self {
        match config {
            RateLimiterConfig::TokenBucket { rate, capacity } => {
                Self::TokenBucket(TokenBucketState::new(rate, capacity))
            }
            RateLimiterConfig::SlidingWindow {
                max_requests,
                window,
            } => Self::SlidingWindow(SlidingWindowState::new(max_requests, window)),
            RateLimiterConfig::DailyQuota { daily_limit } => {
                Self::DailyQuota(DailyQuotaState::new(daily_limit))
            }
        }
    }

    fn try_acquire(&mut self) -> bool {
        match self {
            Self::TokenBucket(s) => s.try_acquire(),
            Self::SlidingWindow(s) => s.try_acquire(),
            Self::DailyQuota(s) => s.try_acquire(),
        }
    }
}

/// A rate limiter for a single provider, polled by the async `acquire` loop.
pub struct RateLimiter {
    provider: &'static str,
    state: Mutex<LimiterState>,
    acquire_timeout: Duration,
}

impl RateLimiter {
    /// Construct a limiter for `provider` using its registered default configuration.
    #[must_use]
    pub fn for_provider(provider: ProviderId) -> Self {
        Self::with_config(provider.as_str(), RateLimiterConfig::default_for(provider))
    }

    /// Construct a limiter for an explicit configuration.
    #[must_use]
    pub fn with_config(provider: &'static str, config: RateLimiterConfig) -> Self {
        Self {
            provider,
            state: Mutex::new(LimiterState::from_config(config)),
            acquire_timeout: ACQUIRE_TIMEOUT,
        }
    }

    /// Construct a limiter with an explicit acquire wait budget, for testing.
    #[must_use]
    pub fn with_config_and_timeout(
        provider: &'static str,
        config: RateLimiterConfig,
        acquire_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            state: Mutex::new(LimiterState::from_config(config)),
            acquire_timeout,
        }
    }
}

#[async_trait]
impl RateLimited for RateLimiter {
    async fn acquire(&self) -> Result<(), ResearchError> {
        let deadline = Instant::now() + self.acquire_timeout;
        loop {
            {
                let mut state = self.state.lock().expect("rate limiter mutex poisoned");
                if state.try_acquire() {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(ResearchError::rate_limited(self.provider));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Middleware that wraps a [`BasketProvider`] with a [`RateLimiter`].
pub struct RateLimiterMiddleware {
    limiter: Arc<RateLimiter>,
}

impl RateLimiterMiddleware {
    /// Wrap a provider with a rate limiter built from its registered default configuration.
    #[must_use]
    pub fn for_provider(provider: ProviderId) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::for_provider(provider)),
        }
    }

    /// Wrap a provider with a rate limiter built from an explicit configuration.
    #[must_use]
    pub fn for_provider_config(provider: &'static str, config: RateLimiterConfig) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::with_config(provider, config)),
        }
    }
}

struct RateLimitedProvider {
    inner: Arc<dyn BasketProvider>,
    limiter: Arc<RateLimiter>,
}

#[async_trait]
impl BasketProvider for RateLimitedProvider {
    fn provider_id(&self) -> &'static str {
        self.inner.provider_id()
    }

    fn source_name(&self) -> &'static str {
        self.inner.source_name()
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        self.limiter.acquire().await?;
        self.inner.fetch(ticker).await
    }
}

impl research_core::middleware::Middleware for RateLimiterMiddleware {
    fn apply(self: Box<Self>, inner: Arc<dyn BasketProvider>) -> Arc<dyn BasketProvider> {
        Arc::new(RateLimitedProvider {
            inner,
            limiter: self.limiter,
        })
    }

    fn name(&self) -> &'static str {
        "RateLimiterMiddleware"
    }

    fn config_json(&self) -> serde_json::Value {
        serde_json::json!({})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_bucket_admits_up_to_capacity_then_blocks_briefly() {
        let limiter = RateLimiter::with_config(
            "test",
            RateLimiterConfig::TokenBucket {
                rate: 1000.0,
                capacity: 2,
            },
        );
        limiter.acquire().await.unwrap();
        limiter.acquire().await.unwrap();
        // third should still succeed quickly because refill is fast
        limiter.acquire().await.unwrap();
    }

    #[tokio::test]
    async fn daily_quota_rejects_once_exhausted_within_the_wait_budget() {
        let limiter = RateLimiter::with_config_and_timeout(
            "test",
            RateLimiterConfig::DailyQuota { daily_limit: 1 },
            Duration::from_millis(100),
        );
        limiter.acquire().await.unwrap();
        let err = limiter.acquire().await.unwrap_err();
        assert!(matches!(err, ResearchError::RateLimited { .. }));
    }
}
