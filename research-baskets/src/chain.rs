//! The fallback-chain and parallel-merge drivers every basket worker composes
//! providers with, plus the always-respond minimal-fallback builder.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use research_core::provider::BasketProvider;
use research_core::types::{BasketGroup, BasketResult, SourceEnvelope, Ticker};
use research_types::{BasketId, ResearchError};

const TOOL_DEADLINE: Duration = Duration::from_secs(90);

fn is_empty_result(result: &BasketResult) -> bool {
    result.sources.values().all(|envelope| envelope.data.is_empty())
}

/// A basket result whose every source is a fallback/historical-average
/// placeholder, satisfying the always-respond invariant.
#[must_use]
pub fn minimal_fallback(ticker: &Ticker, basket: BasketId, group: BasketGroup) -> BasketResult {
    let mut sources = std::collections::HashMap::new();
    sources.insert(
        "minimal_fallback".to_string(),
        SourceEnvelope {
            source: "Minimal Fallback".to_string(),
            as_of: Utc::now(),
            data: std::collections::HashMap::new(),
        },
    );
    BasketResult {
        group,
        ticker: ticker.symbol.clone(),
        sources,
        source: basket,
        as_of: Utc::now(),
    }
}

/// A basket result built from last known historical averages rather than a
/// live call, used as the final tier of a fallback chain.
#[must_use]
pub fn historical_average(
    ticker: &Ticker,
    basket: BasketId,
    group: BasketGroup,
    data: std::collections::HashMap<String, research_core::types::MetricValue>,
) -> BasketResult {
    let mut sources = std::collections::HashMap::new();
    sources.insert(
        "historical_average".to_string(),
        SourceEnvelope {
            source: "Historical Average".to_string(),
            as_of: Utc::now(),
            data,
        },
    );
    BasketResult {
        group,
        ticker: ticker.symbol.clone(),
        sources,
        source: basket,
        as_of: Utc::now(),
    }
}

/// Sequential fallback chain: tries each provider in order, advancing past
/// errors and empty results, and wraps the final provider's failure into a
/// minimal-fallback entry rather than propagating it.
pub struct FallbackChain {
    providers: Vec<Arc<dyn BasketProvider>>,
    historical_default: Option<std::collections::HashMap<String, research_core::types::MetricValue>>,
}

impl FallbackChain {
    /// Build a chain from providers in fallback priority order.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn BasketProvider>>) -> Self {
        Self { providers, historical_default: None }
    }

    /// Attach a historical-average terminal tier, used in place of the
    /// minimal fallback once every provider in the chain is exhausted.
    #[must_use]
    pub fn with_historical_average(mut self, data: std::collections::HashMap<String, research_core::types::MetricValue>) -> Self {
        self.historical_default = Some(data);
        self
    }

    /// Run the chain, always returning a well-formed result.
    pub async fn fetch(&self, ticker: &Ticker, basket: BasketId, group: BasketGroup) -> BasketResult {
        for provider in &self.providers {
            match provider.fetch(ticker).await {
                Ok(result) if !is_empty_result(&result) => return result,
                Ok(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(provider = provider.provider_id(), ticker = %ticker.symbol, "empty result, advancing chain");
                }
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(provider = provider.provider_id(), ticker = %ticker.symbol, error = %_err, "provider failed, advancing chain");
                }
            }
        }
        match &self.historical_default {
            Some(data) => historical_average(ticker, basket, group, data.clone()),
            None => minimal_fallback(ticker, basket, group),
        }
    }
}

/// Parallel-merge driver: runs every provider concurrently and merges the
/// successful envelopes into one result, keyed by provider id. A provider
/// returning an empty result (e.g. no news found) is still merged in, since
/// an empty item list is a valid non-error outcome.
pub struct ParallelMerge {
    providers: Vec<Arc<dyn BasketProvider>>,
}

impl ParallelMerge {
    /// Build a merge driver over the given providers.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn BasketProvider>>) -> Self {
        Self { providers }
    }

    /// Run every provider concurrently and merge their envelopes.
    pub async fn fetch(&self, ticker: &Ticker, basket: BasketId, group: BasketGroup) -> BasketResult {
        let calls = self.providers.iter().map(|p| p.fetch(ticker));
        let results = futures::future::join_all(calls).await;

        let mut sources = std::collections::HashMap::new();
        for (provider, outcome) in self.providers.iter().zip(results) {
            match outcome {
                Ok(result) => sources.extend(result.sources),
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(provider = provider.provider_id(), ticker = %ticker.symbol, error = %_err, "merge provider failed");
                    let _ = provider;
                }
            }
        }

        if sources.is_empty() {
            return minimal_fallback(ticker, basket, group);
        }

        BasketResult {
            group,
            ticker: ticker.symbol.clone(),
            sources,
            source: basket,
            as_of: Utc::now(),
        }
    }
}

/// Wraps several providers as a single provider whose own result is their
/// parallel merge, letting a merged tier (e.g. two primaries queried
/// concurrently) sit as one link inside a [`FallbackChain`].
pub struct MergedProvider {
    merge: ParallelMerge,
    id: &'static str,
    name: &'static str,
    basket: BasketId,
    group: BasketGroup,
}

impl MergedProvider {
    /// Build a merged tier from its member providers.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn BasketProvider>>, id: &'static str, name: &'static str, basket: BasketId, group: BasketGroup) -> Self {
        Self { merge: ParallelMerge::new(providers), id, name, basket, group }
    }
}

#[async_trait::async_trait]
impl BasketProvider for MergedProvider {
    fn provider_id(&self) -> &'static str {
        self.id
    }

    fn source_name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        Ok(self.merge.fetch(ticker, self.basket, self.group).await)
    }
}

/// Wraps a basket's tool execution with the 90-second outer deadline and
/// converts an escaping error into the canonical tool-error payload.
pub async fn with_tool_deadline<F, Fut>(
    ticker: &Ticker,
    tool: &str,
    source: &str,
    work: F,
) -> Result<BasketResult, serde_json::Value>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = BasketResult>,
{
    match tokio::time::timeout(TOOL_DEADLINE, work()).await {
        Ok(result) => Ok(result),
        Err(_) => Err(tool_error_payload(
            ticker,
            tool,
            source,
            &ResearchError::timeout(tool.to_string()),
        )),
    }
}

/// The canonical `{error, ticker, tool, source, fallback: true}` payload.
#[must_use]
pub fn tool_error_payload(
    ticker: &Ticker,
    tool: &str,
    source: &str,
    error: &ResearchError,
) -> serde_json::Value {
    serde_json::json!({
        "error": error.to_string(),
        "ticker": ticker.symbol,
        "tool": tool,
        "source": source,
        "fallback": true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use research_core::types::{MetricValue, TemporalMetric};

    struct EmptyProvider;
    #[async_trait]
    impl BasketProvider for EmptyProvider {
        fn provider_id(&self) -> &'static str {
            "empty"
        }
        fn source_name(&self) -> &'static str {
            "Empty"
        }
        async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
            Ok(BasketResult {
                group: BasketGroup::RawMetrics,
                ticker: ticker.symbol.clone(),
                sources: std::collections::HashMap::from([(
                    "empty".to_string(),
                    SourceEnvelope {
                        source: "Empty".to_string(),
                        as_of: Utc::now(),
                        data: std::collections::HashMap::new(),
                    },
                )]),
                source: BasketId::Macro,
                as_of: Utc::now(),
            })
        }
    }

    struct WorkingProvider;
    #[async_trait]
    impl BasketProvider for WorkingProvider {
        fn provider_id(&self) -> &'static str {
            "working"
        }
        fn source_name(&self) -> &'static str {
            "Working"
        }
        async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
            let mut data = std::collections::HashMap::new();
            data.insert(
                "gdp_growth".to_string(),
                MetricValue::Metric(TemporalMetric {
                    value: Some(0.03),
                    ..TemporalMetric::default()
                }),
            );
            Ok(BasketResult {
                group: BasketGroup::RawMetrics,
                ticker: ticker.symbol.clone(),
                sources: std::collections::HashMap::from([(
                    "working".to_string(),
                    SourceEnvelope {
                        source: "Working".to_string(),
                        as_of: Utc::now(),
                        data,
                    },
                )]),
                source: BasketId::Macro,
                as_of: Utc::now(),
            })
        }
    }

    struct FailingProvider;
    #[async_trait]
    impl BasketProvider for FailingProvider {
        fn provider_id(&self) -> &'static str {
            "failing"
        }
        fn source_name(&self) -> &'static str {
            "Failing"
        }
        async fn fetch(&self, _ticker: &Ticker) -> Result<BasketResult, ResearchError> {
            Err(ResearchError::timeout("failing"))
        }
    }

    #[tokio::test]
    async fn chain_advances_past_empty_and_errored_providers() {
        let chain = FallbackChain::new(vec![
            Arc::new(FailingProvider),
            Arc::new(EmptyProvider),
            Arc::new(WorkingProvider),
        ]);
        let ticker = Ticker::new("AAPL", None);
        let result = chain.fetch(&ticker, BasketId::Macro, BasketGroup::RawMetrics).await;
        assert!(result.sources.contains_key("working"));
    }

    #[tokio::test]
    async fn chain_falls_back_to_minimal_when_every_provider_fails() {
        let chain = FallbackChain::new(vec![Arc::new(FailingProvider), Arc::new(FailingProvider)]);
        let ticker = Ticker::new("ZZZZ", None);
        let result = chain.fetch(&ticker, BasketId::Macro, BasketGroup::RawMetrics).await;
        assert!(result.is_all_fallback());
    }

    #[tokio::test]
    async fn chain_falls_back_to_historical_average_when_configured() {
        let mut data = std::collections::HashMap::new();
        data.insert(
            "gdp_growth".to_string(),
            MetricValue::Metric(TemporalMetric { value: Some(0.02), ..TemporalMetric::default() }),
        );
        let chain = FallbackChain::new(vec![Arc::new(FailingProvider), Arc::new(FailingProvider)])
            .with_historical_average(data);
        let ticker = Ticker::new("ZZZZ", None);
        let result = chain.fetch(&ticker, BasketId::Macro, BasketGroup::RawMetrics).await;
        assert!(result.is_all_fallback());
        assert!(result.sources.contains_key("historical_average"));
    }

    #[tokio::test]
    async fn merge_combines_successful_providers_and_skips_failures() {
        let merge = ParallelMerge::new(vec![Arc::new(WorkingProvider), Arc::new(FailingProvider)]);
        let ticker = Ticker::new("AAPL", None);
        let result = merge.fetch(&ticker, BasketId::Macro, BasketGroup::RawMetrics).await;
        assert_eq!(result.sources.len(), 1);
        assert!(result.sources.contains_key("working"));
    }
}
