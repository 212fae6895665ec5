use async_trait::async_trait;
use research_core::types::{BasketResult, Ticker};
use research_types::BasketId;

/// A basket worker: orchestrates providers for one data category and always
/// returns a well-formed result, per the always-respond invariant.
#[async_trait]
pub trait BasketWorker: Send + Sync {
    /// The category this worker serves.
    fn basket_id(&self) -> BasketId;

    /// Run the worker's fallback chain (or parallel merge) for `ticker`.
    async fn run(&self, ticker: &Ticker) -> BasketResult;
}
