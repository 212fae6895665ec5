//! Sentiment basket: Finnhub company news and Reddit retail mentions, merged.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use research_core::types::{BasketGroup, BasketResult, Ticker};
use research_fetch::UpstreamFetcher;
use research_middleware::ProviderBuilder;
use research_types::BasketId;

use crate::chain::ParallelMerge;
use crate::providers::finnhub::FinnhubProvider;
use crate::providers::reddit::RedditProvider;
use crate::worker::BasketWorker;

const CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Sentiment worker: Finnhub company-news headlines merged with recent
/// r/stocks mentions of the ticker. Downstream scoring is left to the
/// caller; this basket only surfaces the raw content.
pub struct SentimentWorker {
    merge: ParallelMerge,
}

impl SentimentWorker {
    /// Build the worker's parallel-merge driver over a shared fetcher.
    ///
    /// # Errors
    /// Returns a [`research_types::ResearchError`] if a provider's middleware
    /// stack fails validation.
    pub fn new(fetcher: Arc<UpstreamFetcher>) -> Result<Self, research_types::ResearchError> {
        let finnhub = ProviderBuilder::new(Arc::new(FinnhubProvider::new(Arc::clone(&fetcher))))
            .with_cache(CACHE_TTL)
            .build()?;
        let reddit = ProviderBuilder::new(Arc::new(RedditProvider::new(fetcher)))
            .with_cache(CACHE_TTL)
            .build()?;

        Ok(Self {
            merge: ParallelMerge::new(vec![finnhub, reddit]),
        })
    }
}

#[async_trait]
impl BasketWorker for SentimentWorker {
    fn basket_id(&self) -> BasketId {
        BasketId::Sentiment
    }

    async fn run(&self, ticker: &Ticker) -> BasketResult {
        self.merge.fetch(ticker, BasketId::Sentiment, BasketGroup::ContentAnalysis).await
    }
}
