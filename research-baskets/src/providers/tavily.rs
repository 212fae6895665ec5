use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use research_core::provider::BasketProvider;
use research_core::types::{BasketGroup, BasketResult, ContentItem, MetricValue, Ticker};
use research_fetch::{FetchedBody, UpstreamFetcher};
use research_types::{BasketId, ProviderId, ResearchError};
use serde_json::Value;

use super::envelope;

/// Tavily web-search provider, serving the news basket as a third
/// concurrent source alongside NYT and NewsAPI.
pub struct TavilyProvider {
    fetcher: Arc<UpstreamFetcher>,
}

impl TavilyProvider {
    /// Build a provider wrapping the given fetcher.
    #[must_use]
    pub fn new(fetcher: Arc<UpstreamFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl BasketProvider for TavilyProvider {
    fn provider_id(&self) -> &'static str {
        "tavily"
    }

    fn source_name(&self) -> &'static str {
        "Tavily"
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        let query = ticker.company_name.as_deref().unwrap_or(&ticker.symbol).replace(' ', "%20");
        let url = format!("https://api.tavily.com/search?query={query}&topic=news&max_results=10");
        let body = self
            .fetcher
            .get(ProviderId::Tavily, &url, &[], Duration::from_secs(15), false)
            .await?;
        let json = match body {
            FetchedBody::Json(v) => v,
            FetchedBody::Text(_) => return Err(ResearchError::parse_error("tavily", "expected JSON body")),
        };

        let results = json.get("results").and_then(Value::as_array).cloned().unwrap_or_default();
        let today = chrono::Utc::now().date_naive();
        let items: Vec<ContentItem> = results
            .iter()
            .filter_map(|result| {
                let title = result.get("title").and_then(Value::as_str)?.to_string();
                Some(ContentItem {
                    title,
                    content: result.get("content").and_then(Value::as_str).unwrap_or_default().to_string(),
                    url: result.get("url").and_then(Value::as_str).unwrap_or_default().to_string(),
                    datetime: today,
                    source: "Tavily".to_string(),
                    subreddit: None,
                })
            })
            .collect();

        let mut data = HashMap::new();
        data.insert("items".to_string(), MetricValue::Items(items));

        Ok(BasketResult {
            group: BasketGroup::ContentAnalysis,
            ticker: ticker.symbol.clone(),
            sources: HashMap::from([("tavily".to_string(), envelope("Tavily", data))]),
            source: BasketId::News,
            as_of: chrono::Utc::now(),
        })
    }
}
