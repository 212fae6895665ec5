//! Macro basket: BEA (GDP) and BLS (CPI, unemployment) queried concurrently
//! as the primary tier, FRED as fallback, ticker-independent.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use research_core::types::{BasketGroup, BasketResult, MetricValue, TemporalMetric, Ticker};
use research_fetch::UpstreamFetcher;
use research_middleware::ProviderBuilder;
use research_types::BasketId;

use crate::chain::{FallbackChain, MergedProvider};
use crate::providers::bea::BeaProvider;
use crate::providers::bls::BlsProvider;
use crate::providers::fred::FredProvider;
use crate::worker::BasketWorker;

const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

fn historical_default() -> HashMap<String, MetricValue> {
    HashMap::from([
        (
            "gdp_growth".to_string(),
            MetricValue::Metric(TemporalMetric { value: Some(0.02), ..TemporalMetric::default() }),
        ),
        (
            "unemployment_rate".to_string(),
            MetricValue::Metric(TemporalMetric { value: Some(4.0), ..TemporalMetric::default() }),
        ),
    ])
}

/// Macro worker: GDP growth, inflation, unemployment, and fed funds rate,
/// from the national-accounts and labor-statistics agencies primarily and
/// the reserve-bank series as fallback.
///
/// Ignores the ticker's symbol; macro series are economy-wide, not per-issuer.
pub struct MacroWorker {
    chain: FallbackChain,
}

impl MacroWorker {
    /// Build the worker's fallback chain over a shared fetcher.
    ///
    /// # Errors
    /// Returns a [`research_types::ResearchError`] if a provider's middleware
    /// stack fails validation.
    pub fn new(fetcher: Arc<UpstreamFetcher>) -> Result<Self, research_types::ResearchError> {
        let bea = ProviderBuilder::new(Arc::new(BeaProvider::new(Arc::clone(&fetcher))))
            .with_cache(CACHE_TTL)
            .build()?;
        let bls = ProviderBuilder::new(Arc::new(BlsProvider::new(Arc::clone(&fetcher))))
            .with_cache(CACHE_TTL)
            .build()?;
        let primary: Arc<dyn research_core::provider::BasketProvider> = Arc::new(MergedProvider::new(
            vec![bea, bls],
            "bea_bls",
            "BEA/BLS",
            BasketId::Macro,
            BasketGroup::RawMetrics,
        ));
        let fred = ProviderBuilder::new(Arc::new(FredProvider::new(fetcher)))
            .with_cache(CACHE_TTL)
            .build()?;

        Ok(Self {
            chain: FallbackChain::new(vec![primary, fred]).with_historical_average(historical_default()),
        })
    }
}

#[async_trait]
impl BasketWorker for MacroWorker {
    fn basket_id(&self) -> BasketId {
        BasketId::Macro
    }

    async fn run(&self, ticker: &Ticker) -> BasketResult {
        self.chain.fetch(ticker, BasketId::Macro, BasketGroup::RawMetrics).await
    }
}
