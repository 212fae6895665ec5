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

/// FRED series provider. Serves the macro basket as a fallback behind BEA/BLS,
/// and the volatility basket's VIX market-context figure when built `for_basket`.
pub struct FredProvider {
    fetcher: Arc<UpstreamFetcher>,
    basket: BasketId,
}

impl FredProvider {
    /// Build a provider serving the macro basket's series.
    #[must_use]
    pub fn new(fetcher: Arc<UpstreamFetcher>) -> Self {
        Self::for_basket(fetcher, BasketId::Macro)
    }

    /// Build a provider serving whichever series set `basket` needs.
    #[must_use]
    pub fn for_basket(fetcher: Arc<UpstreamFetcher>, basket: BasketId) -> Self {
        Self { fetcher, basket }
    }

    fn series(&self) -> &'static [(&'static str, &'static str, Option<DataType>)] {
        match self.basket {
            BasketId::Volatility => &[("vix", "VIXCLS", Some(DataType::Daily))],
            _ => &[
                ("gdp_growth", "A191RL1Q225SBEA", Some(DataType::Quarterly)),
                ("unemployment_rate", "UNRATE", Some(DataType::Monthly)),
                ("fed_funds_rate", "DFF", Some(DataType::Daily)),
                ("inflation_rate", "FPCPITOTLZGUSA", None),
            ],
        }
    }

    async fn latest_observation(&self, series_id: &str) -> Result<Option<f64>, ResearchError> {
        let url = format!(
            "https://api.stlouisfed.org/fred/series/observations?series_id={series_id}&sort_order=desc&limit=1&file_type=json"
        );
        let body = self
            .fetcher
            .get(ProviderId::Fred, &url, &[], Duration::from_secs(15), false)
            .await?;
        let json = match body {
            FetchedBody::Json(v) => v,
            FetchedBody::Text(_) => return Err(ResearchError::parse_error("fred", "expected JSON body")),
        };
        let observations = json.get("observations").and_then(Value::as_array);
        Ok(observations.and_then(|obs| obs.first()).and_then(|o| o.get("value")).and_then(as_f64))
    }
}

#[async_trait]
impl BasketProvider for FredProvider {
    fn provider_id(&self) -> &'static str {
        "fred"
    }

    fn source_name(&self) -> &'static str {
        "FRED"
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        let mut data: HashMap<String, MetricValue> = HashMap::new();
        for (field, series_id, cadence) in self.series() {
            if let Some(value) = self.latest_observation(series_id).await? {
                data.insert(
                    (*field).to_string(),
                    MetricValue::Metric(TemporalMetric { value: Some(value), data_type: *cadence, ..Default::default() }),
                );
            }
        }

        Ok(BasketResult {
            group: BasketGroup::RawMetrics,
            ticker: ticker.symbol.clone(),
            sources: HashMap::from([("fred".to_string(), envelope("FRED", data))]),
            source: self.basket,
            as_of: chrono::Utc::now(),
        })
    }
}
