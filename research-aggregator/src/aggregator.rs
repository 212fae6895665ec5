//! The aggregator: drives basket workers in a fixed order, normalizes and
//! enriches their results, and assembles the final [`ResearchArtifact`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use research_baskets::BasketRegistry;
use research_core::types::{BasketGroup, MetricEvent, ResearchArtifact, SwotSummary, Ticker};
use research_types::BasketId;

use crate::{completeness, conflict, metrics as metrics_mod, trim};

/// Drives a single task's basket workers to completion.
pub struct Aggregator {
    registry: Arc<BasketRegistry>,
}

impl Aggregator {
    /// Build an aggregator over a shared basket registry.
    #[must_use]
    pub fn new(registry: Arc<BasketRegistry>) -> Self {
        Self { registry }
    }

    /// Run every basket worker in the fixed order (fundamentals → valuation
    /// → volatility → macro → news → sentiment), streaming a [`MetricEvent`]
    /// per extracted metric through `emit`, and checking `should_cancel`
    /// before starting each basket.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, emit, should_cancel), fields(ticker = %ticker.symbol)))]
    pub async fn run<F, C>(&self, ticker: &Ticker, mut emit: F, should_cancel: C) -> ResearchArtifact
    where
        F: FnMut(MetricEvent),
        C: Fn() -> bool,
    {
        let mut metrics = HashMap::new();
        let mut sources_available = Vec::new();
        let mut sources_failed = Vec::new();
        let mut multi_source = HashMap::new();
        let mut conflict_resolution = Vec::new();
        let mut aggregated_swot = SwotSummary::default();

        for basket in BasketId::ALL {
            if should_cancel() {
                break;
            }

            let mut result = match self.run_with_retry(basket, ticker).await {
                Ok(result) if result.is_all_fallback() => {
                    sources_failed.push(basket);
                    result
                }
                Ok(result) => {
                    sources_available.push(basket);
                    result
                }
                Err(payload) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(basket = basket.as_str(), ticker = %ticker.symbol, error = %payload, "basket failed after retry");
                    sources_failed.push(basket);
                    research_baskets::minimal_fallback(ticker, basket, group_for(basket))
                }
            };

            if matches!(basket, BasketId::News | BasketId::Sentiment) {
                trim::trim_in_place(&mut result);
            }

            for event in metrics_mod::extract(basket, &result) {
                emit(event);
            }

            conflict_resolution.extend(conflict::detect(basket, &result));

            if result.group == BasketGroup::SourceComparison {
                multi_source.insert(format!("{}_all", basket.as_str()), result.clone());
            }

            metrics.insert(basket, result);
        }

        let completeness = completeness::score(&metrics);

        ResearchArtifact {
            ticker: ticker.symbol.clone(),
            company_name: ticker.company_name.clone().unwrap_or_else(|| ticker.symbol.clone()),
            sources_available,
            sources_failed,
            metrics,
            multi_source,
            conflict_resolution,
            aggregated_swot: std::mem::take(&mut aggregated_swot),
            completeness,
            generated_at: Utc::now(),
        }
    }

    /// Invoke a basket once; on failure, invoke it exactly one more time
    /// before giving up.
    async fn run_with_retry(
        &self,
        basket: BasketId,
        ticker: &Ticker,
    ) -> Result<research_core::types::BasketResult, serde_json::Value> {
        match self.registry.run(basket, ticker).await {
            Ok(result) => Ok(result),
            Err(_first_error) => self.registry.run(basket, ticker).await,
        }
    }
}

fn group_for(basket: BasketId) -> BasketGroup {
    match basket {
        BasketId::Fundamentals | BasketId::Valuation => BasketGroup::SourceComparison,
        BasketId::Volatility | BasketId::Macro => BasketGroup::RawMetrics,
        BasketId::News | BasketId::Sentiment => BasketGroup::ContentAnalysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_fetch::UpstreamFetcher;

    #[tokio::test]
    async fn always_produces_an_artifact_covering_every_basket() {
        let registry = Arc::new(BasketRegistry::new(Arc::new(UpstreamFetcher::new())).expect("registry"));
        let aggregator = Aggregator::new(registry);
        let ticker = Ticker::new("ZZZZ", None);

        let mut events = Vec::new();
        let artifact = aggregator.run(&ticker, |e| events.push(e), || false).await;

        assert_eq!(artifact.sources_available.len() + artifact.sources_failed.len(), 6);
    }
}
