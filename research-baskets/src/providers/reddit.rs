use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use research_core::provider::BasketProvider;
use research_core::types::{BasketGroup, BasketResult, ContentItem, MetricValue, Ticker};
use research_fetch::{FetchedBody, UpstreamFetcher};
use research_types::{BasketId, ProviderId, ResearchError};
use serde_json::Value;

use super::envelope;

/// Reddit retail-sentiment provider, searching r/stocks for ticker mentions.
pub struct RedditProvider {
    fetcher: Arc<UpstreamFetcher>,
}

impl RedditProvider {
    /// Build a provider wrapping the given fetcher.
    #[must_use]
    pub fn new(fetcher: Arc<UpstreamFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl BasketProvider for RedditProvider {
    fn provider_id(&self) -> &'static str {
        "reddit"
    }

    fn source_name(&self) -> &'static str {
        "Reddit"
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        let url = format!(
            "https://www.reddit.com/r/stocks/search.json?q={}&restrict_sr=1&sort=new&limit=10",
            ticker.symbol
        );
        let body = self
            .fetcher
            .get(ProviderId::Reddit, &url, &[], Duration::from_secs(15), false)
            .await?;
        let json = match body {
            FetchedBody::Json(v) => v,
            FetchedBody::Text(_) => return Err(ResearchError::parse_error("reddit", "expected JSON body")),
        };

        let posts = json
            .get("data")
            .and_then(|d| d.get("children"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let items: Vec<ContentItem> = posts
            .iter()
            .filter_map(|child| {
                let post = child.get("data")?;
                let title = post.get("title").and_then(Value::as_str)?.to_string();
                let created = post.get("created_utc").and_then(Value::as_f64)?;
                let datetime = DateTime::from_timestamp(created as i64, 0)?.date_naive();
                Some(ContentItem {
                    title,
                    content: post.get("selftext").and_then(Value::as_str).unwrap_or_default().to_string(),
                    url: post.get("url").and_then(Value::as_str).unwrap_or_default().to_string(),
                    datetime,
                    source: "Reddit".to_string(),
                    subreddit: Some("stocks".to_string()),
                })
            })
            .collect();

        let mut data = HashMap::new();
        data.insert("items".to_string(), MetricValue::Items(items));

        Ok(BasketResult {
            group: BasketGroup::ContentAnalysis,
            ticker: ticker.symbol.clone(),
            sources: HashMap::from([("reddit".to_string(), envelope("Reddit", data))]),
            source: BasketId::Sentiment,
            as_of: chrono::Utc::now(),
        })
    }
}
