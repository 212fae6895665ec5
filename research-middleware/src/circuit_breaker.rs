//! Per-provider CLOSED/OPEN/HALF_OPEN circuit breaker and the middleware that applies it.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use research_core::provider::{BasketProvider, CircuitBroken};
use research_core::types::{BasketResult, Ticker};
use research_types::{CircuitBreakerConfig, ResearchError};

/// The three states a breaker can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// All requests admitted.
    Closed,
    /// Requests rejected until the half-open timeout elapses.
    Open,
    /// A single probe window; admits a bounded number of successes before closing.
    HalfOpen,
}

struct BreakerRuntime {
    state: BreakerState,
    failure_count: u32,
    success_count: u32,
    last_failure_time: Option<Instant>,
    last_state_change: Instant,
}

impl BreakerRuntime {
    fn new() -> Self {
        Self {
            state: BreakerState::Closed,
            failure_count: 0,
            success_count: 0,
            last_failure_time: None,
            last_state_change: Instant::now(),
        }
    }

    fn transition(&mut self, state: BreakerState) {
        self.state = state;
        self.failure_count = 0;
        self.success_count = 0;
        self.last_state_change = Instant::now();
    }
}

/// A circuit breaker for a single provider.
pub struct CircuitBreaker {
    provider: &'static str,
    config: CircuitBreakerConfig,
    runtime: Mutex<BreakerRuntime>,
}

impl CircuitBreaker {
    /// Construct a breaker with the shared default thresholds.
    #[must_use]
    pub fn new(provider: &'static str) -> Self {
        Self::with_config(provider, CircuitBreakerConfig::default())
    }

    /// Construct a breaker with explicit thresholds (for providers needing overrides).
    #[must_use]
    pub fn with_config(provider: &'static str, config: CircuitBreakerConfig) -> Self {
        Self {
            provider,
            config,
            runtime: Mutex::new(BreakerRuntime::new()),
        }
    }

    /// Current state, for introspection/tests.
    #[must_use]
    pub fn state(&self) -> BreakerState {
        self.runtime.lock().expect("breaker mutex poisoned").state
    }
}

impl CircuitBroken for CircuitBreaker {
    fn check(&self) -> Result<(), ResearchError> {
        let mut rt = self.runtime.lock().expect("breaker mutex poisoned");
        match rt.state {
            BreakerState::Closed | BreakerState::HalfOpen => Ok(()),
            BreakerState::Open => {
                let since_failure = rt
                    .last_failure_time
                    .map(|t| t.elapsed())
                    .unwrap_or_default();
                if since_failure >= self.config.half_open_timeout {
                    rt.transition(BreakerState::HalfOpen);
                    Ok(())
                } else {
                    let retry_after_ms = self
                        .config
                        .half_open_timeout
                        .saturating_sub(since_failure)
                        .as_millis()
                        .try_into()
                        .unwrap_or(u64::MAX);
                    Err(ResearchError::circuit_open(self.provider, retry_after_ms))
                }
            }
        }
    }

    fn record_success(&self) {
        let mut rt = self.runtime.lock().expect("breaker mutex poisoned");
        match rt.state {
            BreakerState::Closed => {
                rt.failure_count = rt.failure_count.saturating_sub(1);
            }
            BreakerState::HalfOpen => {
                rt.success_count += 1;
                if rt.success_count >= self.config.success_threshold {
                    rt.transition(BreakerState::Closed);
                }
            }
            BreakerState::Open => {}
        }
    }

    fn record_failure(&self) {
        let mut rt = self.runtime.lock().expect("breaker mutex poisoned");
        match rt.state {
            BreakerState::Closed => {
                rt.failure_count += 1;
                rt.last_failure_time = Some(Instant::now());
                if rt.failure_count >= self.config.failure_threshold {
                    rt.transition(BreakerState::Open);
                    rt.last_failure_time = Some(Instant::now());
                }
            }
            BreakerState::HalfOpen => {
                rt.last_failure_time = Some(Instant::now());
                rt.transition(BreakerState::Open);
            }
            BreakerState::Open => {}
        }
    }
}

/// Middleware that wraps a [`BasketProvider`] with a [`CircuitBreaker`].
pub struct CircuitBreakerMiddleware {
    breaker: Arc<CircuitBreaker>,
}

impl CircuitBreakerMiddleware {
    /// Wrap a provider with a breaker using shared default thresholds.
    #[must_use]
    pub fn new(provider: &'static str) -> Self {
        Self {
            breaker: Arc::new(CircuitBreaker::new(provider)),
        }
    }

    /// Wrap a provider with a breaker using explicit thresholds.
    #[must_use]
    pub fn with_config(provider: &'static str, config: CircuitBreakerConfig) -> Self {
        Self {
            breaker: Arc::new(CircuitBreaker::with_config(provider, config)),
        }
    }
}

struct BreakerGuardedProvider {
    inner: Arc<dyn BasketProvider>,
    breaker: Arc<CircuitBreaker>,
}

#[async_trait]
impl BasketProvider for BreakerGuardedProvider {
    fn provider_id(&self) -> &'static str {
        self.inner.provider_id()
    }

    fn source_name(&self) -> &'static str {
        self.inner.source_name()
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        self.breaker.check()?;
        match self.inner.fetch(ticker).await {
            Ok(result) => {
                self.breaker.record_success();
                Ok(result)
            }
            Err(err) => {
                self.breaker.record_failure();
                Err(err)
            }
        }
    }
}

impl research_core::middleware::Middleware for CircuitBreakerMiddleware {
    fn apply(self: Box<Self>, inner: Arc<dyn BasketProvider>) -> Arc<dyn BasketProvider> {
        Arc::new(BreakerGuardedProvider {
            inner,
            breaker: self.breaker,
        })
    }

    fn name(&self) -> &'static str {
        "CircuitBreakerMiddleware"
    }

    fn config_json(&self) -> serde_json::Value {
        serde_json::json!({
            "failure_threshold": self.breaker.config.failure_threshold,
            "success_threshold": self.breaker.config.success_threshold,
            "half_open_timeout_ms": self.breaker.config.half_open_timeout.as_millis(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fast_config() -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: 3,
            success_threshold: 2,
            half_open_timeout: Duration::from_millis(10),
        }
    }

    #[test]
    fn opens_after_failure_threshold_consecutive_failures() {
        let breaker = CircuitBreaker::with_config("test", fast_config());
        for _ in 0..3 {
            breaker.check().unwrap();
            breaker.record_failure();
        }
        assert_eq!(breaker.state(), BreakerState::Open);
        assert!(breaker.check().is_err());
    }

    #[test]
    fn success_decrements_failure_count_by_one_while_closed() {
        let breaker = CircuitBreaker::with_config("test", fast_config());
        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        // two failures net (2 - 1 + 1), threshold is 3, so still closed
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[tokio::test]
    async fn half_open_closes_after_success_threshold_probes() {
        let breaker = CircuitBreaker::with_config("test", fast_config());
        for _ in 0..3 {
            breaker.check().unwrap();
            breaker.record_failure();
        }
        assert_eq!(breaker.state(), BreakerState::Open);
        tokio::time::sleep(Duration::from_millis(20)).await;
        breaker.check().unwrap();
        assert_eq!(breaker.state(), BreakerState::HalfOpen);
        breaker.record_success();
        breaker.record_success();
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[tokio::test]
    async fn any_failure_during_half_open_reopens_the_breaker() {
        let breaker = CircuitBreaker::with_config("test", fast_config());
        for _ in 0..3 {
            breaker.check().unwrap();
            breaker.record_failure();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        breaker.check().unwrap();
        assert_eq!(breaker.state(), BreakerState::HalfOpen);
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
    }
}
