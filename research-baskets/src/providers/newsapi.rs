use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use research_core::provider::BasketProvider;
use research_core::types::{BasketGroup, BasketResult, ContentItem, MetricValue, Ticker};
use research_fetch::{FetchedBody, UpstreamFetcher};
use research_types::{BasketId, ProviderId, ResearchError};
use serde_json::Value;

use super::envelope;

/// NewsAPI headline-search provider, serving the news basket as a secondary source.
pub struct NewsApiProvider {
    fetcher: Arc<UpstreamFetcher>,
}

impl NewsApiProvider {
    /// Build a provider wrapping the given fetcher.
    #[must_use]
    pub fn new(fetcher: Arc<UpstreamFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl BasketProvider for NewsApiProvider {
    fn provider_id(&self) -> &'static str {
        "newsapi"
    }

    fn source_name(&self) -> &'static str {
        "NewsAPI"
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        let query = ticker.company_name.as_deref().unwrap_or(&ticker.symbol).replace(' ', "%20");
        let url = format!("https://newsapi.org/v2/everything?q={query}&sortBy=publishedAt");
        let body = self
            .fetcher
            .get(ProviderId::NewsApi, &url, &[], Duration::from_secs(15), false)
            .await?;
        let json = match body {
            FetchedBody::Json(v) => v,
            FetchedBody::Text(_) => return Err(ResearchError::parse_error("newsapi", "expected JSON body")),
        };

        let articles = json.get("articles").and_then(Value::as_array).cloned().unwrap_or_default();

        let items: Vec<ContentItem> = articles
            .iter()
            .filter_map(|article| {
                let title = article.get("title").and_then(Value::as_str)?.to_string();
                let published_at = article.get("publishedAt").and_then(Value::as_str)?;
                let datetime = NaiveDate::parse_from_str(&published_at[..10], "%Y-%m-%d").ok()?;
                Some(ContentItem {
                    title,
                    content: article.get("description").and_then(Value::as_str).unwrap_or_default().to_string(),
                    url: article.get("url").and_then(Value::as_str).unwrap_or_default().to_string(),
                    datetime,
                    source: "NewsAPI".to_string(),
                    subreddit: None,
                })
            })
            .collect();

        let mut data = HashMap::new();
        data.insert("items".to_string(), MetricValue::Items(items));

        Ok(BasketResult {
            group: BasketGroup::ContentAnalysis,
            ticker: ticker.symbol.clone(),
            sources: HashMap::from([("newsapi".to_string(), envelope("NewsAPI", data))]),
            source: BasketId::News,
            as_of: chrono::Utc::now(),
        })
    }
}
