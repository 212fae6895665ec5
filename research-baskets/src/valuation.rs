//! Valuation basket: Yahoo Finance primary, Alpha Vantage fallback, then a
//! historical-average tier of last-known multiples.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use research_core::types::{BasketGroup, BasketResult, MetricValue, TemporalMetric, Ticker};
use research_fetch::UpstreamFetcher;
use research_middleware::ProviderBuilder;
use research_types::BasketId;

use crate::chain::FallbackChain;
use crate::providers::alpha_vantage::AlphaVantageProvider;
use crate::providers::yahoo_finance::YahooFinanceProvider;
use crate::worker::BasketWorker;

const CACHE_TTL: Duration = Duration::from_secs(15 * 60);

fn historical_default() -> HashMap<String, MetricValue> {
    HashMap::from([(
        "pe_ratio".to_string(),
        MetricValue::Metric(TemporalMetric { value: Some(20.0), ..TemporalMetric::default() }),
    )])
}

/// Valuation worker: Yahoo Finance multiples, falling back to Alpha Vantage.
pub struct ValuationWorker {
    chain: FallbackChain,
}

impl ValuationWorker {
    /// Build the worker's fallback chain over a shared fetcher.
    ///
    /// # Errors
    /// Returns a [`research_types::ResearchError`] if a provider's middleware
    /// stack fails validation.
    pub fn new(fetcher: Arc<UpstreamFetcher>) -> Result<Self, research_types::ResearchError> {
        let yahoo = ProviderBuilder::new(Arc::new(YahooFinanceProvider::for_basket(
            Arc::clone(&fetcher),
            BasketId::Valuation,
        )))
        .with_cache(CACHE_TTL)
        .build()?;
        let alpha_vantage = ProviderBuilder::new(Arc::new(AlphaVantageProvider::for_basket(
            fetcher,
            BasketId::Valuation,
        )))
        .with_cache(CACHE_TTL)
        .build()?;

        Ok(Self {
            chain: FallbackChain::new(vec![yahoo, alpha_vantage]).with_historical_average(historical_default()),
        })
    }
}

#[async_trait]
impl BasketWorker for ValuationWorker {
    fn basket_id(&self) -> BasketId {
        BasketId::Valuation
    }

    async fn run(&self, ticker: &Ticker) -> BasketResult {
        self.chain.fetch(ticker, BasketId::Valuation, BasketGroup::SourceComparison).await
    }
}
