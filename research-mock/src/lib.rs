//! research-mock
//!
//! Deterministic providers for tests and local examples: a static,
//! fixture-backed provider per basket category, and a dynamic provider whose
//! behavior is driven by a controller handle for exercising fallback chains,
//! retries, and breaker/limiter interaction.

mod dynamic;
mod fixtures;
mod static_provider;

pub use dynamic::{DynamicMockController, DynamicMockProvider, MockBehavior};
pub use static_provider::StaticMockProvider;
