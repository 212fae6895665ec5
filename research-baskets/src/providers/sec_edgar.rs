use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use research_core::provider::BasketProvider;
use research_core::types::{BasketGroup, BasketResult, MetricValue, TemporalMetric, Ticker};
use research_fetch::{FetchedBody, UpstreamFetcher};
use research_types::{BasketId, ProviderId, ResearchError};
use serde_json::Value;

use super::{envelope, path};

const USER_AGENT: (&str, &str) = ("User-Agent", "research-aggregator/0.1 (contact@borsa.rs)");
const TICKER_MAP_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// SEC EDGAR XBRL company-facts provider. Only serves the fundamentals basket.
pub struct SecEdgarProvider {
    fetcher: Arc<UpstreamFetcher>,
}

impl SecEdgarProvider {
    /// Build a provider wrapping the given fetcher.
    #[must_use]
    pub fn new(fetcher: Arc<UpstreamFetcher>) -> Self {
        Self { fetcher }
    }

    async fn lookup_cik(&self, symbol: &str) -> Result<String, ResearchError> {
        let body = self
            .fetcher
            .get(ProviderId::SecEdgar, TICKER_MAP_URL, &[USER_AGENT], Duration::from_secs(15), false)
            .await?;
        let json = as_json(body, ProviderId::SecEdgar)?;
        let entries = json.as_object().ok_or_else(|| {
            ResearchError::parse_error("sec_edgar", "ticker map is not an object")
        })?;
        for entry in entries.values() {
            if entry.get("ticker").and_then(Value::as_str).map(|s| s.eq_ignore_ascii_case(symbol)) == Some(true) {
                let cik = entry.get("cik_str").and_then(Value::as_u64).ok_or_else(|| {
                    ResearchError::parse_error("sec_edgar", "missing cik_str")
                })?;
                return Ok(format!("{cik:010}"));
            }
        }
        Err(ResearchError::parse_error("sec_edgar", format!("no CIK found for {symbol}")))
    }

    async fn fetch_facts(&self, cik: &str) -> Result<Value, ResearchError> {
        let url = format!("https://data.sec.gov/api/xbrl/companyfacts/CIK{cik}.json");
        let body = self
            .fetcher
            .get(ProviderId::SecEdgar, &url, &[USER_AGENT], Duration::from_secs(30), false)
            .await?;
        as_json(body, ProviderId::SecEdgar)
    }
}

fn as_json(body: FetchedBody, provider: ProviderId) -> Result<Value, ResearchError> {
    match body {
        FetchedBody::Json(v) => Ok(v),
        FetchedBody::Text(_) => Err(ResearchError::parse_error(provider.as_str(), "expected JSON body")),
    }
}

/// Pull the most recent annual (`10-K`) value reported for a `us-gaap` tag.
fn latest_annual_fact(facts: &Value, tag: &str) -> Option<TemporalMetric> {
    let units = path(facts, &["facts", "us-gaap", tag, "units", "USD"])?.as_array()?;
    units
        .iter()
        .filter(|entry| entry.get("form").and_then(Value::as_str) == Some("10-K"))
        .filter_map(|entry| {
            let value = entry.get("val").and_then(super::as_f64)?;
            let end_date = entry.get("end").and_then(Value::as_str).and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())?;
            let filed = entry.get("filed").and_then(Value::as_str).and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
            let fiscal_year = entry.get("fy").and_then(Value::as_i64).map(|fy| fy as i32);
            Some(TemporalMetric {
                value: Some(value),
                data_type: Some(research_core::types::DataType::FiscalYear),
                end_date: Some(end_date),
                filed,
                fiscal_year,
                form: Some("10-K".to_string()),
            })
        })
        .max_by_key(|m| m.end_date)
}

#[async_trait]
impl BasketProvider for SecEdgarProvider {
    fn provider_id(&self) -> &'static str {
        "sec_edgar"
    }

    fn source_name(&self) -> &'static str {
        "SEC EDGAR"
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        let cik = self.lookup_cik(&ticker.symbol).await?;
        let facts = self.fetch_facts(&cik).await?;

        let mut data: HashMap<String, MetricValue> = HashMap::new();
        for (field, tag) in [
            ("revenue", "Revenues"),
            ("net_income", "NetIncomeLoss"),
            ("total_assets", "Assets"),
            ("total_liabilities", "Liabilities"),
            ("stockholders_equity", "StockholdersEquity"),
        ] {
            if let Some(metric) = latest_annual_fact(&facts, tag) {
                data.insert(field.to_string(), MetricValue::Metric(metric));
            }
        }

        Ok(BasketResult {
            group: BasketGroup::SourceComparison,
            ticker: ticker.symbol.clone(),
            sources: HashMap::from([("sec_edgar".to_string(), envelope("SEC EDGAR", data))]),
            source: BasketId::Fundamentals,
            as_of: chrono::Utc::now(),
        })
    }
}
