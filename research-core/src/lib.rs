//! research-core
//!
//! Core types, traits, and utilities shared across the research aggregation
//! workspace.
//!
//! - `types`: canonical data structures (tickers, temporal metrics, baskets, tasks).
//! - `provider`: the `BasketProvider` trait and orthogonal capability traits.
//! - `middleware`: the `Middleware` trait used to compose provider wrappers.
#![warn(missing_docs)]

/// Core error type shared by the aggregator and basket providers.
pub mod error;
/// Middleware trait for composing provider wrappers.
pub mod middleware;
/// Basket-provider traits and capability interfaces.
pub mod provider;
/// Canonical domain types.
pub mod types;

pub use error::{ResearchError, Result};
pub use provider::{BasketProvider, Cached, CircuitBroken, Parser, RateLimited};
pub use types::*;
