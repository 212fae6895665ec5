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

/// Finnhub `/company-news` provider, serving raw article headlines for the
/// sentiment basket alongside Reddit.
pub struct FinnhubProvider {
    fetcher: Arc<UpstreamFetcher>,
}

impl FinnhubProvider {
    /// Build a provider wrapping the given fetcher.
    #[must_use]
    pub fn new(fetcher: Arc<UpstreamFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl BasketProvider for FinnhubProvider {
    fn provider_id(&self) -> &'static str {
        "finnhub"
    }

    fn source_name(&self) -> &'static str {
        "Finnhub"
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        let today = chrono::Utc::now().date_naive();
        let month_ago = today - chrono::Duration::days(30);
        let url = format!(
            "https://finnhub.io/api/v1/company-news?symbol={}&from={month_ago}&to={today}",
            ticker.symbol
        );
        let body = self
            .fetcher
            .get(ProviderId::Finnhub, &url, &[], Duration::from_secs(15), false)
            .await?;
        let json = match body {
            FetchedBody::Json(v) => v,
            FetchedBody::Text(_) => return Err(ResearchError::parse_error("finnhub", "expected JSON body")),
        };

        let articles = json.as_array().cloned().unwrap_or_default();
        let items: Vec<ContentItem> = articles
            .iter()
            .filter_map(|article| {
                let title = article.get("headline").and_then(Value::as_str)?.to_string();
                let datetime = article.get("datetime").and_then(Value::as_i64)?;
                let datetime = DateTime::from_timestamp(datetime, 0)?.date_naive();
                Some(ContentItem {
                    title,
                    content: article.get("summary").and_then(Value::as_str).unwrap_or_default().to_string(),
                    url: article.get("url").and_then(Value::as_str).unwrap_or_default().to_string(),
                    datetime,
                    source: "Finnhub".to_string(),
                    subreddit: None,
                })
            })
            .collect();

        let mut data = HashMap::new();
        data.insert("items".to_string(), MetricValue::Items(items));

        Ok(BasketResult {
            group: BasketGroup::ContentAnalysis,
            ticker: ticker.symbol.clone(),
            sources: HashMap::from([("finnhub".to_string(), envelope("Finnhub", data))]),
            source: BasketId::Sentiment,
            as_of: chrono::Utc::now(),
        })
    }
}
