//! Real upstream providers: one [`BasketProvider`](research_core::provider::BasketProvider)
//! impl per upstream API, parsing that API's payload into canonical
//! [`BasketResult`](research_core::types::BasketResult) data for whichever
//! basket it was constructed for.

pub mod alpha_vantage;
pub mod bea;
pub mod bls;
pub mod finnhub;
pub mod fred;
pub mod newsapi;
pub mod nyt;
pub mod reddit;
pub mod sec_edgar;
pub mod tavily;
pub mod yahoo_finance;

use chrono::Utc;
use research_core::types::{MetricValue, SourceEnvelope, TemporalMetric};
use serde_json::Value;
use std::collections::HashMap;

/// Navigate a chain of object keys, returning `None` the moment any segment
/// is missing or not an object — the fallback-to-null rule for every leaf read.
pub(crate) fn path<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in keys {
        current = current.get(key)?;
    }
    Some(current)
}

pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    value.as_f64().or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

/// A scalar metric with no temporal provenance, for quote-style payloads.
pub(crate) fn scalar(value: Option<f64>) -> MetricValue {
    MetricValue::Metric(TemporalMetric {
        value,
        ..TemporalMetric::default()
    })
}

pub(crate) fn envelope(source: &str, data: HashMap<String, MetricValue>) -> SourceEnvelope {
    SourceEnvelope {
        source: source.to_string(),
        as_of: Utc::now(),
        data,
    }
}
