use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use research_core::provider::BasketProvider;
use research_core::types::{BasketGroup, BasketResult, MetricValue, Ticker};
use research_fetch::{FetchedBody, UpstreamFetcher};
use research_types::{BasketId, ProviderId, ResearchError};
use serde_json::Value;

use super::{as_f64, envelope, path, scalar};

/// Yahoo Finance `quoteSummary` provider, serving fundamentals (supplementary),
/// valuation, and volatility baskets depending on how it is constructed.
pub struct YahooFinanceProvider {
    fetcher: Arc<UpstreamFetcher>,
    basket: BasketId,
}

impl YahooFinanceProvider {
    /// Build a provider that parses its response for the given basket.
    #[must_use]
    pub fn for_basket(fetcher: Arc<UpstreamFetcher>, basket: BasketId) -> Self {
        Self { fetcher, basket }
    }

    fn modules(&self) -> &'static str {
        match self.basket {
            BasketId::Fundamentals => "financialData,incomeStatementHistory",
            BasketId::Valuation => "defaultKeyStatistics,summaryDetail,financialData",
            BasketId::Volatility => "defaultKeyStatistics,summaryDetail",
            _ => "summaryDetail",
        }
    }

    async fn fetch_quote_summary(&self, symbol: &str) -> Result<Value, ResearchError> {
        let url = format!(
            "https://query2.finance.yahoo.com/v10/finance/quoteSummary/{symbol}?modules={}",
            self.modules()
        );
        let body = self
            .fetcher
            .get(ProviderId::YahooFinance, &url, &[], Duration::from_secs(15), false)
            .await?;
        match body {
            FetchedBody::Json(v) => Ok(v),
            FetchedBody::Text(_) => Err(ResearchError::parse_error("yahoo_finance", "expected JSON body")),
        }
    }

    fn result_root<'a>(json: &'a Value) -> Option<&'a Value> {
        path(json, &["quoteSummary", "result", "0"])
    }

    fn parse_fundamentals(&self, json: &Value) -> HashMap<String, MetricValue> {
        let root = Self::result_root(json);
        let mut data = HashMap::new();
        if let Some(margin) = root.and_then(|r| path(r, &["financialData", "operatingMargins", "raw"])).and_then(as_f64) {
            data.insert("operating_margin_pct".to_string(), scalar(Some(margin * 100.0)));
        }
        if let Some(fcf) = root.and_then(|r| path(r, &["financialData", "freeCashflow", "raw"])).and_then(as_f64) {
            data.insert("free_cash_flow".to_string(), scalar(Some(fcf)));
        }
        data
    }

    fn parse_valuation(&self, json: &Value) -> HashMap<String, MetricValue> {
        let root = Self::result_root(json);
        let mut data = HashMap::new();
        let fields: [(&str, &[&str]); 4] = [
            ("pe_ratio", &["summaryDetail", "trailingPE", "raw"]),
            ("market_cap", &["summaryDetail", "marketCap", "raw"]),
            ("price_to_book", &["defaultKeyStatistics", "priceToBook", "raw"]),
            ("ev_to_ebitda", &["defaultKeyStatistics", "enterpriseToEbitda", "raw"]),
        ];
        for (field, p) in fields {
            if let Some(value) = root.and_then(|r| path(r, p)).and_then(as_f64) {
                data.insert(field.to_string(), scalar(Some(value)));
            }
        }
        data
    }

    fn parse_volatility(&self, json: &Value) -> HashMap<String, MetricValue> {
        let root = Self::result_root(json);
        let mut data = HashMap::new();
        if let Some(beta) = root.and_then(|r| path(r, &["defaultKeyStatistics", "beta", "raw"])).and_then(as_f64) {
            data.insert("beta".to_string(), scalar(Some(beta)));
        }
        if let Some(hv) = root.and_then(|r| path(r, &["summaryDetail", "fiftyTwoWeekHigh", "raw"])).and_then(as_f64) {
            // 52-week range is used as a historical-volatility proxy when the
            // options-chain basket member hasn't supplied implied volatility.
            data.insert("historical_volatility_52w_high".to_string(), scalar(Some(hv)));
        }
        data
    }
}

#[async_trait]
impl BasketProvider for YahooFinanceProvider {
    fn provider_id(&self) -> &'static str {
        "yahoo_finance"
    }

    fn source_name(&self) -> &'static str {
        "Yahoo Finance"
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        let json = self.fetch_quote_summary(&ticker.symbol).await?;
        let data = match self.basket {
            BasketId::Fundamentals => self.parse_fundamentals(&json),
            BasketId::Valuation => self.parse_valuation(&json),
            BasketId::Volatility => self.parse_volatility(&json),
            _ => HashMap::new(),
        };
        let group = match self.basket {
            BasketId::Volatility => BasketGroup::RawMetrics,
            _ => BasketGroup::SourceComparison,
        };
        Ok(BasketResult {
            group,
            ticker: ticker.symbol.clone(),
            sources: HashMap::from([("yahoo_finance".to_string(), envelope("Yahoo Finance", data))]),
            source: self.basket,
            as_of: chrono::Utc::now(),
        })
    }
}
