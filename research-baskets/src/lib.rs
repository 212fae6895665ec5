//! research-baskets
//!
//! Per-category basket workers: real upstream providers composed through
//! fallback chains or parallel merges, each always returning a well-formed
//! [`BasketResult`](research_core::types::BasketResult) even when every
//! upstream call fails.

mod chain;
mod fundamentals;
mod macro_data;
mod news;
mod providers;
mod sentiment;
mod valuation;
mod volatility;
mod worker;

use std::collections::HashMap;
use std::sync::Arc;

use research_core::types::{BasketResult, Ticker};
use research_fetch::UpstreamFetcher;
use research_types::{BasketId, ResearchError};

pub use chain::{historical_average, minimal_fallback, tool_error_payload, with_tool_deadline, FallbackChain, MergedProvider, ParallelMerge};
pub use fundamentals::FundamentalsWorker;
pub use macro_data::MacroWorker;
pub use news::NewsWorker;
pub use providers::alpha_vantage::AlphaVantageProvider;
pub use providers::bea::BeaProvider;
pub use providers::bls::BlsProvider;
pub use providers::finnhub::FinnhubProvider;
pub use providers::fred::FredProvider;
pub use providers::newsapi::NewsApiProvider;
pub use providers::nyt::NytProvider;
pub use providers::reddit::RedditProvider;
pub use providers::sec_edgar::SecEdgarProvider;
pub use providers::tavily::TavilyProvider;
pub use providers::yahoo_finance::YahooFinanceProvider;
pub use sentiment::SentimentWorker;
pub use valuation::ValuationWorker;
pub use volatility::VolatilityWorker;
pub use worker::BasketWorker;

/// Holds one worker per basket category, dispatched by [`BasketId`].
pub struct BasketRegistry {
    workers: HashMap<BasketId, Box<dyn BasketWorker>>,
}

impl BasketRegistry {
    /// Build the registry's full set of workers over a shared fetcher.
    ///
    /// # Errors
    /// Returns a [`ResearchError`] if any worker's middleware stack fails
    /// validation during construction.
    pub fn new(fetcher: Arc<UpstreamFetcher>) -> Result<Self, ResearchError> {
        let mut workers: HashMap<BasketId, Box<dyn BasketWorker>> = HashMap::new();
        workers.insert(BasketId::Fundamentals, Box::new(FundamentalsWorker::new(Arc::clone(&fetcher))?));
        workers.insert(BasketId::Valuation, Box::new(ValuationWorker::new(Arc::clone(&fetcher))?));
        workers.insert(BasketId::Volatility, Box::new(VolatilityWorker::new(Arc::clone(&fetcher))?));
        workers.insert(BasketId::Macro, Box::new(MacroWorker::new(Arc::clone(&fetcher))?));
        workers.insert(BasketId::News, Box::new(NewsWorker::new(Arc::clone(&fetcher))?));
        workers.insert(BasketId::Sentiment, Box::new(SentimentWorker::new(fetcher)?));
        Ok(Self { workers })
    }

    /// Run the worker registered for `basket`, wrapped in the tool-execution
    /// deadline. Returns the canonical tool-error payload on timeout.
    pub async fn run(&self, basket: BasketId, ticker: &Ticker) -> Result<BasketResult, serde_json::Value> {
        let worker = &self.workers[&basket];
        with_tool_deadline(ticker, basket.as_str(), basket.as_str(), || worker.run(ticker)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_builds_a_worker_for_every_basket() {
        let fetcher = Arc::new(UpstreamFetcher::new());
        let registry = BasketRegistry::new(fetcher).expect("registry should build");
        for basket in BasketId::ALL {
            assert!(registry.workers.contains_key(&basket));
        }
    }
}
