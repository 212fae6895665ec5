use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use research_core::provider::BasketProvider;
use research_core::types::{BasketGroup, BasketResult, DataType, MetricValue, TemporalMetric, Ticker};
use research_fetch::{FetchedBody, UpstreamFetcher};
use research_types::{BasketId, ProviderId, ResearchError};
use serde_json::Value;

use super::{as_f64, envelope, path};

/// Bureau of Economic Analysis national-accounts provider, primary source
/// for GDP growth in the macro basket.
pub struct BeaProvider {
    fetcher: Arc<UpstreamFetcher>,
}

impl BeaProvider {
    /// Build a provider wrapping the given fetcher.
    #[must_use]
    pub fn new(fetcher: Arc<UpstreamFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl BasketProvider for BeaProvider {
    fn provider_id(&self) -> &'static str {
        "bea"
    }

    fn source_name(&self) -> &'static str {
        "BEA"
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        let url = "https://apps.bea.gov/api/data/?method=GetData&datasetname=NIPA&TableName=T10101&Frequency=Q&Year=X&ResultFormat=JSON";
        let body = self
            .fetcher
            .get(ProviderId::Bea, url, &[], Duration::from_secs(15), false)
            .await?;
        let json = match body {
            FetchedBody::Json(v) => v,
            FetchedBody::Text(_) => return Err(ResearchError::parse_error("bea", "expected JSON body")),
        };

        let mut data: HashMap<String, MetricValue> = HashMap::new();
        let latest = path(&json, &["BEAAPI", "Results", "Data"])
            .and_then(Value::as_array)
            .and_then(|rows| rows.first());
        if let Some(value) = latest.and_then(|row| row.get("DataValue")).and_then(as_f64) {
            data.insert(
                "gdp_growth".to_string(),
                MetricValue::Metric(TemporalMetric { value: Some(value), data_type: Some(DataType::Quarterly), ..Default::default() }),
            );
        }

        Ok(BasketResult {
            group: BasketGroup::RawMetrics,
            ticker: ticker.symbol.clone(),
            sources: HashMap::from([("bea".to_string(), envelope("BEA", data))]),
            source: BasketId::Macro,
            as_of: chrono::Utc::now(),
        })
    }
}
