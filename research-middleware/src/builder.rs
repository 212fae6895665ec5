//! Builder for composing a raw provider with middleware layers.
//!
//! # Middleware Ordering Convention
//!
//! Middleware layers form an "onion" around the raw provider:
//!
//! ```text
//! User Request
//!     ↓
//! Outermost Middleware (Cache - checks first, handles errors last)
//!     ↓
//! Inner Middleware (CircuitBreaker -> RateLimiter)
//!     ↓
//! Raw Provider (makes the actual upstream call)
//! ```
//!
//! ## Storage vs Application Order
//!
//! The `layers` vector stores middleware in **outermost-first** order for intuitive
//! builder semantics (last added = outermost), but they are **applied in reverse**
//! during `build()` to construct the proper nesting.
//!
//! This convention matches [`MiddlewareStack`](research_types::MiddlewareStack) where
//! `layers[0]` is the outermost layer.

use std::sync::Arc;
use std::time::Duration;

use research_core::middleware::{Middleware, MiddlewareDescriptor, ValidationContext};
use research_core::provider::BasketProvider;
use research_types::{CircuitBreakerConfig, MiddlewareLayer, MiddlewareStack, ProviderId, RateLimiterConfig, ResearchError};
use serde_json::json;

use crate::cache::CacheMiddleware;
use crate::circuit_breaker::CircuitBreakerMiddleware;
use crate::rate_limiter::RateLimiterMiddleware;

/// Builder for composing a raw [`BasketProvider`] with layered middleware.
///
/// See [module-level documentation](self) for details on middleware ordering.
pub struct ProviderBuilder {
    raw: Arc<dyn BasketProvider>,
    /// Middleware layers in outermost-first order.
    layers: Vec<MiddlewareDescriptor>,
}

impl ProviderBuilder {
    /// Create a new builder from a raw, unwrapped provider.
    #[must_use]
    pub fn new(raw: Arc<dyn BasketProvider>) -> Self {
        Self {
            raw,
            layers: Vec::new(),
        }
    }

    /// Reorder layers to satisfy the canonical policy:
    /// Cache (outermost) -> CircuitBreaker -> RateLimiter -> others.
    fn enforce_ordering(&mut self) {
        self.layers.sort_by_key(|d| match d.name() {
            "CacheMiddleware" => 0,
            "CircuitBreakerMiddleware" => 1,
            "RateLimiterMiddleware" => 2,
            _ => 3,
        });
    }

    /// Add or replace the cache layer.
    #[must_use]
    pub fn with_cache(mut self, ttl: Duration) -> Self {
        self.layers.retain(|d| d.name() != "CacheMiddleware");
        self.layers
            .insert(0, MiddlewareDescriptor::new(CacheMiddleware::new(ttl)));
        self.enforce_ordering();
        self
    }

    /// Remove the cache layer if present.
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.layers.retain(|d| d.name() != "CacheMiddleware");
        self
    }

    /// Add or replace the circuit breaker layer, for the given provider's identity.
    #[must_use]
    pub fn with_circuit_breaker(mut self, provider: ProviderId, config: CircuitBreakerConfig) -> Self {
        self.layers.retain(|d| d.name() != "CircuitBreakerMiddleware");
        self.layers.push(MiddlewareDescriptor::new(
            CircuitBreakerMiddleware::with_config(provider.as_str(), config),
        ));
        self.enforce_ordering();
        self
    }

    /// Remove the circuit breaker layer if present.
    #[must_use]
    pub fn without_circuit_breaker(mut self) -> Self {
        self.layers.retain(|d| d.name() != "CircuitBreakerMiddleware");
        self
    }

    /// Add or replace the rate limiter layer, using the provider's registered defaults.
    #[must_use]
    pub fn with_rate_limiter(mut self, provider: ProviderId) -> Self {
        self.layers.retain(|d| d.name() != "RateLimiterMiddleware");
        self.layers.push(MiddlewareDescriptor::new(
            RateLimiterMiddleware::for_provider(provider),
        ));
        self.enforce_ordering();
        self
    }

    /// Add or replace the rate limiter layer with an explicit configuration.
    #[must_use]
    pub fn with_rate_limiter_config(mut self, provider: &'static str, config: RateLimiterConfig) -> Self {
        self.layers.retain(|d| d.name() != "RateLimiterMiddleware");
        self.layers.push(MiddlewareDescriptor::new(
            RateLimiterMiddleware::for_provider_config(provider, config),
        ));
        self.enforce_ordering();
        self
    }

    /// Remove the rate limiter layer if present.
    #[must_use]
    pub fn without_rate_limiter(mut self) -> Self {
        self.layers.retain(|d| d.name() != "RateLimiterMiddleware");
        self
    }

    /// Export the current middleware stack configuration for inspection.
    ///
    /// The raw provider is appended as the innermost "layer" for observability.
    #[must_use]
    pub fn to_stack(&self) -> MiddlewareStack {
        let mut stack = MiddlewareStack::new();
        for desc in &self.layers {
            stack.push_inner(MiddlewareLayer::new(
                desc.name(),
                desc.middleware().config_json(),
            ));
        }
        stack.push_inner(MiddlewareLayer::new(
            "RawProvider",
            json!({ "provider_id": self.raw.provider_id() }),
        ));
        stack
    }

    /// Validate the middleware stack without building.
    ///
    /// # Errors
    /// Returns [`ResearchError`] if any layer's validation fails.
    pub fn validate(&self) -> Result<(), ResearchError> {
        for (idx, desc) in self.layers.iter().enumerate().rev() {
            let ctx = ValidationContext::new(&self.layers, idx);
            desc.middleware().validate(&ctx)?;
        }
        Ok(())
    }

    /// Build the wrapped provider according to the captured stack.
    ///
    /// Validates the stack, then applies middleware layers in reverse order
    /// (innermost to outermost) to construct the proper nesting.
    ///
    /// # Errors
    /// Returns [`ResearchError`] if validation fails.
    pub fn build(self) -> Result<Arc<dyn BasketProvider>, ResearchError> {
        self.validate()?;
        let mut acc: Arc<dyn BasketProvider> = Arc::clone(&self.raw);
        for desc in self.layers.into_iter().rev() {
            acc = desc.into_middleware().apply(acc);
        }
        Ok(acc)
    }

    /// Add an arbitrary middleware layer at the outermost position.
    #[must_use]
    pub fn layer<M: Middleware + 'static>(mut self, layer: M) -> Self {
        self.layers.insert(0, MiddlewareDescriptor::new(layer));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use research_core::types::{BasketResult, Ticker};

    struct StubProvider;

    #[async_trait]
    impl BasketProvider for StubProvider {
        fn provider_id(&self) -> &'static str {
            "stub"
        }
        fn source_name(&self) -> &'static str {
            "Stub"
        }
        async fn fetch(&self, _ticker: &Ticker) -> Result<BasketResult, ResearchError> {
            Err(ResearchError::timeout("stub"))
        }
    }

    #[test]
    fn layers_are_reordered_to_cache_breaker_limiter() {
        let builder = ProviderBuilder::new(Arc::new(StubProvider))
            .with_rate_limiter(ProviderId::SecEdgar)
            .with_circuit_breaker(ProviderId::SecEdgar, CircuitBreakerConfig::default())
            .with_cache(Duration::from_secs(60));
        let names: Vec<&str> = builder.layers.iter().map(MiddlewareDescriptor::name).collect();
        assert_eq!(
            names,
            vec!["CacheMiddleware", "CircuitBreakerMiddleware", "RateLimiterMiddleware"]
        );
    }

    #[test]
    fn without_methods_remove_the_named_layer() {
        let builder = ProviderBuilder::new(Arc::new(StubProvider))
            .with_cache(Duration::from_secs(60))
            .without_cache();
        assert!(builder.layers.is_empty());
    }

    #[test]
    fn build_succeeds_with_an_empty_stack() {
        let provider = ProviderBuilder::new(Arc::new(StubProvider)).build().unwrap();
        assert_eq!(provider.provider_id(), "stub");
    }
}
