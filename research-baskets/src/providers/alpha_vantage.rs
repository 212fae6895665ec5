use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use research_core::provider::BasketProvider;
use research_core::types::{BasketGroup, BasketResult, MetricValue, Ticker};
use research_fetch::{FetchedBody, UpstreamFetcher};
use research_types::{BasketId, ProviderId, ResearchError};
use serde_json::Value;

use super::{as_f64, envelope, scalar};

/// Alpha Vantage `OVERVIEW` provider, serving valuation as a secondary
/// source and volatility's beta/historical-volatility figures.
pub struct AlphaVantageProvider {
    fetcher: Arc<UpstreamFetcher>,
    basket: BasketId,
}

impl AlphaVantageProvider {
    /// Build a provider serving whichever field set `basket` needs.
    #[must_use]
    pub fn for_basket(fetcher: Arc<UpstreamFetcher>, basket: BasketId) -> Self {
        Self { fetcher, basket }
    }

    async fn fetch_overview(&self, symbol: &str) -> Result<Value, ResearchError> {
        let url = format!("https://www.alphavantage.co/query?function=OVERVIEW&symbol={symbol}");
        let body = self
            .fetcher
            .get(ProviderId::AlphaVantage, &url, &[], Duration::from_secs(15), false)
            .await?;
        match body {
            FetchedBody::Json(v) => Ok(v),
            FetchedBody::Text(_) => Err(ResearchError::parse_error("alpha_vantage", "expected JSON body")),
        }
    }

    fn parse_valuation(json: &Value) -> HashMap<String, MetricValue> {
        let mut data = HashMap::new();
        for (field, key) in [
            ("pe_ratio", "PERatio"),
            ("market_cap", "MarketCapitalization"),
            ("price_to_book", "PriceToBookRatio"),
            ("ev_to_ebitda", "EVToEBITDA"),
        ] {
            if let Some(value) = json.get(key).and_then(as_f64) {
                data.insert(field.to_string(), scalar(Some(value)));
            }
        }
        data
    }

    fn parse_volatility(json: &Value) -> HashMap<String, MetricValue> {
        let mut data = HashMap::new();
        if let Some(beta) = json.get("Beta").and_then(as_f64) {
            data.insert("beta".to_string(), scalar(Some(beta)));
        }
        if let Some(hv) = json.get("52WeekHigh").and_then(as_f64) {
            data.insert("historical_volatility_52w_high".to_string(), scalar(Some(hv)));
        }
        data
    }
}

#[async_trait]
impl BasketProvider for AlphaVantageProvider {
    fn provider_id(&self) -> &'static str {
        "alpha_vantage"
    }

    fn source_name(&self) -> &'static str {
        "Alpha Vantage"
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        let json = self.fetch_overview(&ticker.symbol).await?;
        let data = match self.basket {
            BasketId::Volatility => Self::parse_volatility(&json),
            _ => Self::parse_valuation(&json),
        };

        Ok(BasketResult {
            group: BasketGroup::SourceComparison,
            ticker: ticker.symbol.clone(),
            sources: HashMap::from([("alpha_vantage".to_string(), envelope("Alpha Vantage", data))]),
            source: self.basket,
            as_of: chrono::Utc::now(),
        })
    }
}
