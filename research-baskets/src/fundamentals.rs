//! Fundamentals basket: SEC EDGAR primary, Yahoo Finance supplementary fallback.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use research_core::types::{BasketGroup, BasketResult, Ticker};
use research_fetch::UpstreamFetcher;
use research_middleware::ProviderBuilder;
use research_types::BasketId;

use crate::chain::FallbackChain;
use crate::providers::sec_edgar::SecEdgarProvider;
use crate::providers::yahoo_finance::YahooFinanceProvider;
use crate::worker::BasketWorker;

const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Fundamentals worker: SEC EDGAR XBRL facts, falling back to Yahoo Finance.
pub struct FundamentalsWorker {
    chain: FallbackChain,
}

impl FundamentalsWorker {
    /// Build the worker's fallback chain over a shared fetcher.
    ///
    /// # Errors
    /// Returns a [`research_types::ResearchError`] if a provider's middleware
    /// stack fails validation.
    pub fn new(fetcher: Arc<UpstreamFetcher>) -> Result<Self, research_types::ResearchError> {
        let sec_edgar = ProviderBuilder::new(Arc::new(SecEdgarProvider::new(Arc::clone(&fetcher))))
            .with_cache(CACHE_TTL)
            .build()?;
        let yahoo = ProviderBuilder::new(Arc::new(YahooFinanceProvider::for_basket(
            fetcher,
            BasketId::Fundamentals,
        )))
        .with_cache(CACHE_TTL)
        .build()?;

        Ok(Self {
            chain: FallbackChain::new(vec![sec_edgar, yahoo]),
        })
    }
}

#[async_trait]
impl BasketWorker for FundamentalsWorker {
    fn basket_id(&self) -> BasketId {
        BasketId::Fundamentals
    }

    async fn run(&self, ticker: &Ticker) -> BasketResult {
        self.chain.fetch(ticker, BasketId::Fundamentals, BasketGroup::SourceComparison).await
    }
}
