//! Deterministic per-basket fixture data, keyed by ticker symbol.

pub mod fundamentals;
pub mod macro_data;
pub mod news;
pub mod sentiment;
pub mod valuation;
pub mod volatility;

use chrono::{NaiveDate, Utc};
use research_core::types::{DataType, MetricValue, SourceEnvelope, TemporalMetric};

pub(crate) fn metric(value: f64, end_date: NaiveDate, fiscal_year: i32, form: &str) -> MetricValue {
    MetricValue::Metric(TemporalMetric {
        value: Some(value),
        data_type: Some(DataType::FiscalYear),
        end_date: Some(end_date),
        filed: Some(end_date),
        fiscal_year: Some(fiscal_year),
        form: Some(form.to_string()),
    })
}

pub(crate) fn raw_metric(value: f64, data_type: DataType) -> MetricValue {
    MetricValue::Metric(TemporalMetric {
        value: Some(value),
        data_type: Some(data_type),
        ..TemporalMetric::default()
    })
}

pub(crate) fn envelope(source: &str, data: Vec<(&str, MetricValue)>) -> SourceEnvelope {
    SourceEnvelope {
        source: source.to_string(),
        as_of: Utc::now(),
        data: data.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
    }
}
