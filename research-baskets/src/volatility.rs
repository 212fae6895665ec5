//! Volatility basket: Yahoo Finance stock metrics merged with FRED's VIX as
//! market context, falling back to Alpha Vantage, then historical averages.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use research_core::types::{BasketGroup, BasketResult, MetricValue, TemporalMetric, Ticker};
use research_fetch::UpstreamFetcher;
use research_middleware::ProviderBuilder;
use research_types::BasketId;

use crate::chain::{FallbackChain, MergedProvider};
use crate::providers::alpha_vantage::AlphaVantageProvider;
use crate::providers::fred::FredProvider;
use crate::providers::yahoo_finance::YahooFinanceProvider;
use crate::worker::BasketWorker;

const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

fn historical_default() -> HashMap<String, MetricValue> {
    HashMap::from([(
        "beta".to_string(),
        MetricValue::Metric(TemporalMetric { value: Some(1.0), ..TemporalMetric::default() }),
    )])
}

/// Volatility worker: beta and 52-week range from Yahoo Finance, merged with
/// VIX from FRED as market-context, falling back to Alpha Vantage.
pub struct VolatilityWorker {
    chain: FallbackChain,
}

impl VolatilityWorker {
    /// Build the worker's fallback chain over a shared fetcher.
    ///
    /// # Errors
    /// Returns a [`research_types::ResearchError`] if a provider's middleware
    /// stack fails validation.
    pub fn new(fetcher: Arc<UpstreamFetcher>) -> Result<Self, research_types::ResearchError> {
        let yahoo = ProviderBuilder::new(Arc::new(YahooFinanceProvider::for_basket(
            Arc::clone(&fetcher),
            BasketId::Volatility,
        )))
        .with_cache(CACHE_TTL)
        .build()?;
        let vix = ProviderBuilder::new(Arc::new(FredProvider::for_basket(Arc::clone(&fetcher), BasketId::Volatility)))
            .with_cache(CACHE_TTL)
            .build()?;
        let primary: Arc<dyn research_core::provider::BasketProvider> = Arc::new(MergedProvider::new(
            vec![yahoo, vix],
            "yahoo_fred",
            "Yahoo Finance/FRED",
            BasketId::Volatility,
            BasketGroup::RawMetrics,
        ));
        let alpha_vantage = ProviderBuilder::new(Arc::new(AlphaVantageProvider::for_basket(fetcher, BasketId::Volatility)))
            .with_cache(CACHE_TTL)
            .build()?;

        Ok(Self {
            chain: FallbackChain::new(vec![primary, alpha_vantage]).with_historical_average(historical_default()),
        })
    }
}

#[async_trait]
impl BasketWorker for VolatilityWorker {
    fn basket_id(&self) -> BasketId {
        BasketId::Volatility
    }

    async fn run(&self, ticker: &Ticker) -> BasketResult {
        self.chain.fetch(ticker, BasketId::Volatility, BasketGroup::RawMetrics).await
    }
}
