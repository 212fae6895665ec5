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

/// New York Times article-search provider, serving the news basket.
pub struct NytProvider {
    fetcher: Arc<UpstreamFetcher>,
}

impl NytProvider {
    /// Build a provider wrapping the given fetcher.
    #[must_use]
    pub fn new(fetcher: Arc<UpstreamFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl BasketProvider for NytProvider {
    fn provider_id(&self) -> &'static str {
        "nyt"
    }

    fn source_name(&self) -> &'static str {
        "NYT"
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        let query = ticker.company_name.as_deref().unwrap_or(&ticker.symbol).replace(' ', "%20");
        let url = format!(
            "https://api.nytimes.com/svc/search/v2/articlesearch.json?q={query}&sort=newest"
        );
        let body = self
            .fetcher
            .get(ProviderId::Nyt, &url, &[], Duration::from_secs(15), false)
            .await?;
        let json = match body {
            FetchedBody::Json(v) => v,
            FetchedBody::Text(_) => return Err(ResearchError::parse_error("nyt", "expected JSON body")),
        };

        let docs = json
            .get("response")
            .and_then(|r| r.get("docs"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let items: Vec<ContentItem> = docs
            .iter()
            .filter_map(|doc| {
                let title = doc.get("headline").and_then(|h| h.get("main")).and_then(Value::as_str)?.to_string();
                let pub_date = doc.get("pub_date").and_then(Value::as_str)?;
                let datetime = NaiveDate::parse_from_str(&pub_date[..10], "%Y-%m-%d").ok()?;
                Some(ContentItem {
                    title,
                    content: doc.get("abstract").and_then(Value::as_str).unwrap_or_default().to_string(),
                    url: doc.get("web_url").and_then(Value::as_str).unwrap_or_default().to_string(),
                    datetime,
                    source: "NYT".to_string(),
                    subreddit: None,
                })
            })
            .collect();

        let mut data = HashMap::new();
        data.insert("items".to_string(), MetricValue::Items(items));

        Ok(BasketResult {
            group: BasketGroup::ContentAnalysis,
            ticker: ticker.symbol.clone(),
            sources: HashMap::from([("nyt".to_string(), envelope("NYT", data))]),
            source: BasketId::News,
            as_of: chrono::Utc::now(),
        })
    }
}
