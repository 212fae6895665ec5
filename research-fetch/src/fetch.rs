//! HTTP fetcher that gates every upstream call through a circuit breaker and
//! rate limiter, retrying transient failures with exponential backoff.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use research_core::provider::{CircuitBroken, RateLimited};
use research_middleware::{CircuitBreaker, RateLimiter};
use research_types::{ProviderId, ResearchError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];
const BACKOFF_BASE: Duration = Duration::from_secs(1);
const BACKOFF_FACTOR: u32 = 2;
const MAX_ATTEMPTS: u32 = 3;

/// The decoded body of an upstream response.
#[derive(Debug, Clone)]
pub enum FetchedBody {
    /// A successfully JSON-decoded response body.
    Json(serde_json::Value),
    /// A raw-text response body, for blob endpoints that aren't JSON.
    Text(String),
}

/// Wraps `reqwest` with per-provider breaker/limiter gating and bounded retry.
///
/// One breaker and one limiter are constructed per registered [`ProviderId`]
/// using its default configuration; callers needing overrides should build
/// [`CircuitBreaker`]/[`RateLimiter`] instances directly and call the raw
/// HTTP path themselves.
pub struct UpstreamFetcher {
    http: reqwest::Client,
    breakers: HashMap<ProviderId, Arc<CircuitBreaker>>,
    limiters: HashMap<ProviderId, Arc<RateLimiter>>,
}

impl UpstreamFetcher {
    /// Build a fetcher with a breaker and limiter for every registered provider.
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Build a fetcher around an existing `reqwest::Client` (e.g. one preconfigured
    /// with a cookie store or custom user agent).
    #[must_use]
    pub fn with_client(http: reqwest::Client) -> Self {
        let mut breakers = HashMap::new();
        let mut limiters = HashMap::new();
        for provider in ProviderId::ALL {
            breakers.insert(provider, Arc::new(CircuitBreaker::new(provider.as_str())));
            limiters.insert(provider, Arc::new(RateLimiter::for_provider(provider)));
        }
        Self {
            http,
            breakers,
            limiters,
        }
    }

    /// The breaker tracking `provider`'s upstream health, for inspection or
    /// for basket providers that need to record success/failure directly.
    #[must_use]
    pub fn breaker(&self, provider: ProviderId) -> Arc<CircuitBreaker> {
        Arc::clone(&self.breakers[&provider])
    }

    /// The rate limiter gating calls to `provider`.
    #[must_use]
    pub fn limiter(&self, provider: ProviderId) -> Arc<RateLimiter> {
        Arc::clone(&self.limiters[&provider])
    }

    /// Fetch `url` on behalf of `provider`, decoding the body as JSON unless
    /// `raw_text` is set.
    ///
    /// # Errors
    /// Returns [`ResearchError::CircuitOpen`] if the breaker forbids the call,
    /// [`ResearchError::RateLimited`] if a token can't be acquired within 5s,
    /// [`ResearchError::HttpError`] for a non-retryable or retry-exhausted
    /// status, or [`ResearchError::TransportError`] for connection failures.
    pub async fn get(
        &self,
        provider: ProviderId,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Duration,
        raw_text: bool,
    ) -> Result<FetchedBody, ResearchError> {
        let breaker = &self.breakers[&provider];
        let limiter = &self.limiters[&provider];

        breaker.check()?;
        limiter.acquire().await?;

        let header_map = build_headers(headers)?;

        let mut attempt = 0;
        let mut delay = BACKOFF_BASE;
        loop {
            attempt += 1;
            let result = self
                .http
                .get(url)
                .headers(header_map.clone())
                .timeout(timeout)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = decode_body(response, raw_text).await?;
                        breaker.record_success();
                        return Ok(body);
                    }
                    if RETRYABLE_STATUSES.contains(&status.as_u16()) && attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(delay).await;
                        delay *= BACKOFF_FACTOR;
                        continue;
                    }
                    breaker.record_failure();
                    return Err(ResearchError::http_error(provider.as_str(), status.as_u16()));
                }
                Err(err) => {
                    if err.is_timeout() && attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(delay).await;
                        delay *= BACKOFF_FACTOR;
                        continue;
                    }
                    breaker.record_failure();
                    return Err(ResearchError::TransportError(err.to_string()));
                }
            }
        }
    }
}

impl Default for UpstreamFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn build_headers(headers: &[(&str, &str)]) -> Result<HeaderMap, ResearchError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ResearchError::parse_error("upstream-fetcher", e.to_string()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| ResearchError::parse_error("upstream-fetcher", e.to_string()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

async fn decode_body(response: reqwest::Response, raw_text: bool) -> Result<FetchedBody, ResearchError> {
    if raw_text {
        let text = response
            .text()
            .await
            .map_err(|e| ResearchError::TransportError(e.to_string()))?;
        return Ok(FetchedBody::Text(text));
    }
    let text = response
        .text()
        .await
        .map_err(|e| ResearchError::TransportError(e.to_string()))?;
    match serde_json::from_str(&text) {
        Ok(value) => Ok(FetchedBody::Json(value)),
        Err(_) => Ok(FetchedBody::Text(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_registers_a_breaker_and_limiter_for_every_provider() {
        let fetcher = UpstreamFetcher::new();
        for provider in ProviderId::ALL {
            let _ = fetcher.breaker(provider);
            let _ = fetcher.limiter(provider);
        }
    }

    #[test]
    fn build_headers_rejects_invalid_header_values() {
        let err = build_headers(&[("x-test", "ok\u{0}bad")]).unwrap_err();
        assert!(matches!(err, ResearchError::ParseError { .. }));
    }
}
