use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use research_core::provider::BasketProvider;
use research_core::types::{BasketGroup, BasketResult, DataType, MetricValue, TemporalMetric, Ticker};
use research_fetch::{FetchedBody, UpstreamFetcher};
use research_types::{BasketId, ProviderId, ResearchError};
use serde_json::Value;

use super::{as_f64, envelope};

/// Bureau of Labor Statistics timeseries provider, primary source for CPI
/// (feeding `inflation_rate`) and unemployment in the macro basket.
pub struct BlsProvider {
    fetcher: Arc<UpstreamFetcher>,
}

impl BlsProvider {
    /// Build a provider wrapping the given fetcher.
    #[must_use]
    pub fn new(fetcher: Arc<UpstreamFetcher>) -> Self {
        Self { fetcher }
    }

    async fn latest_value(&self, series_id: &str) -> Result<Option<f64>, ResearchError> {
        let url = format!("https://api.bls.gov/publicAPI/v2/timeseries/data/{series_id}");
        let body = self
            .fetcher
            .get(ProviderId::Bls, &url, &[], Duration::from_secs(15), false)
            .await?;
        let json = match body {
            FetchedBody::Json(v) => v,
            FetchedBody::Text(_) => return Err(ResearchError::parse_error("bls", "expected JSON body")),
        };
        let series = json.pointer("/Results/series/0/data").and_then(Value::as_array);
        Ok(series.and_then(|rows| rows.first()).and_then(|row| row.get("value")).and_then(as_f64))
    }
}

#[async_trait]
impl BasketProvider for BlsProvider {
    fn provider_id(&self) -> &'static str {
        "bls"
    }

    fn source_name(&self) -> &'static str {
        "BLS"
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        let mut data: HashMap<String, MetricValue> = HashMap::new();

        if let Some(value) = self.latest_value("CUUR0000SA0").await? {
            data.insert(
                "inflation_rate".to_string(),
                MetricValue::Metric(TemporalMetric { value: Some(value), data_type: Some(DataType::Monthly), ..Default::default() }),
            );
        }
        if let Some(value) = self.latest_value("LNS14000000").await? {
            data.insert(
                "unemployment_rate".to_string(),
                MetricValue::Metric(TemporalMetric { value: Some(value), data_type: Some(DataType::Monthly), ..Default::default() }),
            );
        }

        Ok(BasketResult {
            group: BasketGroup::RawMetrics,
            ticker: ticker.symbol.clone(),
            sources: HashMap::from([("bls".to_string(), envelope("BLS", data))]),
            source: BasketId::Macro,
            as_of: chrono::Utc::now(),
        })
    }
}
