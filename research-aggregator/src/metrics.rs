//! Metric extraction and emission: the small, per-basket projection of
//! user-visible metrics that get pushed into a task's progress sink.

use chrono::Utc;
use research_core::types::{BasketResult, MetricEvent, MetricValue};
use research_types::BasketId;
use serde_json::Value;

const PROJECTIONS: &[(BasketId, &[&str])] = &[
    (BasketId::Fundamentals, &["revenue", "net_income", "total_assets", "total_liabilities", "stockholders_equity"]),
    (BasketId::Valuation, &["pe_ratio", "market_cap", "price_to_book", "ev_to_ebitda"]),
    (BasketId::Volatility, &["vix", "beta", "historical_volatility_52w_high"]),
    (BasketId::Macro, &["gdp_growth", "unemployment_rate", "fed_funds_rate", "inflation_rate"]),
    (BasketId::News, &["items"]),
    (BasketId::Sentiment, &["items"]),
];

/// Project a basket's normalized result into the small set of metric events
/// worth streaming to a client watching progress.
#[must_use]
pub fn extract(basket: BasketId, result: &BasketResult) -> Vec<MetricEvent> {
    let Some((_, fields)) = PROJECTIONS.iter().find(|(b, _)| *b == basket) else {
        return Vec::new();
    };

    let mut events = Vec::new();
    for field in *fields {
        let Some(value) = find_first(result, field) else {
            continue;
        };
        events.push(match value {
            MetricValue::Metric(m) => MetricEvent {
                source: basket,
                metric: (*field).to_string(),
                value: m.value.map_or(Value::Null, |v| serde_json::json!(v)),
                timestamp: Utc::now(),
                end_date: m.end_date,
                fiscal_year: m.fiscal_year,
                form: m.form.clone(),
            },
            MetricValue::Items(items) => MetricEvent {
                source: basket,
                metric: (*field).to_string(),
                value: if items.is_empty() {
                    Value::String(format!("No recent {} found", category_label(basket)))
                } else {
                    serde_json::json!(items.len())
                },
                timestamp: Utc::now(),
                end_date: None,
                fiscal_year: None,
                form: None,
            },
        });
    }
    events
}

fn find_first<'a>(result: &'a BasketResult, field: &str) -> Option<&'a MetricValue> {
    result.sources.values().find_map(|envelope| envelope.data.get(field))
}

fn category_label(basket: BasketId) -> &'static str {
    match basket {
        BasketId::News => "news",
        BasketId::Sentiment => "sentiment",
        _ => "data",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc as ChronoUtc;
    use research_core::types::{BasketGroup, SourceEnvelope, TemporalMetric};
    use std::collections::HashMap;

    #[test]
    fn extracts_populated_scalar_metrics() {
        let mut data = HashMap::new();
        data.insert("gdp_growth".to_string(), MetricValue::Metric(TemporalMetric { value: Some(0.02), ..Default::default() }));
        let result = BasketResult {
            group: BasketGroup::RawMetrics,
            ticker: "AAPL".to_string(),
            sources: HashMap::from([("fred".to_string(), SourceEnvelope { source: "FRED".to_string(), as_of: ChronoUtc::now(), data })]),
            source: BasketId::Macro,
            as_of: ChronoUtc::now(),
        };
        let events = extract(BasketId::Macro, &result);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].metric, "gdp_growth");
        assert_eq!(events[0].value, serde_json::json!(0.02));
    }

    #[test]
    fn empty_items_emit_a_placeholder_string() {
        let mut data = HashMap::new();
        data.insert("items".to_string(), MetricValue::Items(Vec::new()));
        let result = BasketResult {
            group: BasketGroup::ContentAnalysis,
            ticker: "AAPL".to_string(),
            sources: HashMap::from([("nyt".to_string(), SourceEnvelope { source: "NYT".to_string(), as_of: ChronoUtc::now(), data })]),
            source: BasketId::News,
            as_of: ChronoUtc::now(),
        };
        let events = extract(BasketId::News, &result);
        assert_eq!(events[0].value, Value::String("No recent news found".to_string()));
    }
}
