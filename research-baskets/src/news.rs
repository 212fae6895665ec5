//! News basket: NYT, NewsAPI, and Tavily article search, merged in parallel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use research_core::types::{BasketGroup, BasketResult, Ticker};
use research_fetch::UpstreamFetcher;
use research_middleware::ProviderBuilder;
use research_types::BasketId;

use crate::chain::ParallelMerge;
use crate::providers::newsapi::NewsApiProvider;
use crate::providers::nyt::NytProvider;
use crate::providers::tavily::TavilyProvider;
use crate::worker::BasketWorker;

const CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// News worker: NYT, NewsAPI, and Tavily headlines, merged rather than
/// chained since every source contributes distinct articles for the same
/// ticker.
pub struct NewsWorker {
    merge: ParallelMerge,
}

impl NewsWorker {
    /// Build the worker's parallel-merge driver over a shared fetcher.
    ///
    /// # Errors
    /// Returns a [`research_types::ResearchError`] if a provider's middleware
    /// stack fails validation.
    pub fn new(fetcher: Arc<UpstreamFetcher>) -> Result<Self, research_types::ResearchError> {
        let nyt = ProviderBuilder::new(Arc::new(NytProvider::new(Arc::clone(&fetcher))))
            .with_cache(CACHE_TTL)
            .build()?;
        let newsapi = ProviderBuilder::new(Arc::new(NewsApiProvider::new(Arc::clone(&fetcher))))
            .with_cache(CACHE_TTL)
            .build()?;
        let tavily = ProviderBuilder::new(Arc::new(TavilyProvider::new(fetcher)))
            .with_cache(CACHE_TTL)
            .build()?;

        Ok(Self {
            merge: ParallelMerge::new(vec![nyt, newsapi, tavily]),
        })
    }
}

#[async_trait]
impl BasketWorker for NewsWorker {
    fn basket_id(&self) -> BasketId {
        BasketId::News
    }

    async fn run(&self, ticker: &Ticker) -> BasketResult {
        self.merge.fetch(ticker, BasketId::News, BasketGroup::ContentAnalysis).await
    }
}
