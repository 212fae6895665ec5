//! Cross-source conflict detection for multi-source baskets.

use research_core::types::{BasketResult, ConflictRecord, MetricValue};
use research_types::BasketId;

const RELATIVE_TOLERANCE: f64 = 0.005;

/// The source id declared authoritative for a basket's multi-source tiebreak.
fn primary_source(basket: BasketId) -> Option<&'static str> {
    match basket {
        BasketId::Fundamentals => Some("sec_edgar"),
        BasketId::Valuation => Some("yahoo_finance"),
        BasketId::Macro => Some("bea"),
        BasketId::Volatility => Some("yahoo_finance"),
        _ => None,
    }
}

fn relative_diff(a: f64, b: f64) -> f64 {
    let denom = a.abs().max(b.abs());
    if denom == 0.0 {
        0.0
    } else {
        (a - b).abs() / denom
    }
}

/// Compare every metric present in both the primary source and any other
/// source of a multi-source basket, recording a conflict when they diverge
/// by more than [`RELATIVE_TOLERANCE`].
#[must_use]
pub fn detect(basket: BasketId, result: &BasketResult) -> Vec<ConflictRecord> {
    let Some(primary_id) = primary_source(basket) else {
        return Vec::new();
    };
    let Some(primary) = result.sources.get(primary_id) else {
        return Vec::new();
    };

    let mut conflicts = Vec::new();
    for (source_id, envelope) in &result.sources {
        if source_id == primary_id {
            continue;
        }
        for (metric, secondary_value) in &envelope.data {
            let Some(primary_value) = primary.data.get(metric) else {
                continue;
            };
            if let (MetricValue::Metric(p), MetricValue::Metric(s)) = (primary_value, secondary_value) {
                if let (Some(pv), Some(sv)) = (p.value, s.value) {
                    if relative_diff(pv, sv) > RELATIVE_TOLERANCE {
                        conflicts.push(ConflictRecord {
                            metric: metric.clone(),
                            primary_value: pv,
                            secondary_value: sv,
                            used: "primary".to_string(),
                        });
                    }
                }
            }
        }
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use research_core::types::{BasketGroup, SourceEnvelope, TemporalMetric};

    fn envelope(source: &str, value: f64) -> SourceEnvelope {
        let mut data = HashMap::new();
        data.insert("pe_ratio".to_string(), MetricValue::Metric(TemporalMetric { value: Some(value), ..Default::default() }));
        SourceEnvelope { source: source.to_string(), as_of: Utc::now(), data }
    }

    fn result(sources: HashMap<String, SourceEnvelope>) -> BasketResult {
        BasketResult {
            group: BasketGroup::SourceComparison,
            ticker: "AAPL".to_string(),
            sources,
            source: BasketId::Valuation,
            as_of: Utc::now(),
        }
    }

    #[test]
    fn flags_divergence_beyond_tolerance() {
        let sources = HashMap::from([
            ("yahoo_finance".to_string(), envelope("Yahoo Finance", 20.0)),
            ("alpha_vantage".to_string(), envelope("Alpha Vantage", 25.0)),
        ]);
        let conflicts = detect(BasketId::Valuation, &result(sources));
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].metric, "pe_ratio");
    }

    #[test]
    fn agreement_within_tolerance_produces_no_conflict() {
        let sources = HashMap::from([
            ("yahoo_finance".to_string(), envelope("Yahoo Finance", 20.0)),
            ("alpha_vantage".to_string(), envelope("Alpha Vantage", 20.05)),
        ]);
        let conflicts = detect(BasketId::Valuation, &result(sources));
        assert!(conflicts.is_empty());
    }

    #[test]
    fn basket_with_no_declared_primary_never_conflicts() {
        let sources = HashMap::from([
            ("nyt".to_string(), envelope("NYT", 20.0)),
            ("newsapi".to_string(), envelope("NewsAPI", 25.0)),
        ]);
        let conflicts = detect(BasketId::News, &result(sources));
        assert!(conflicts.is_empty());
    }

    #[test]
    fn missing_primary_source_in_result_never_conflicts() {
        let sources = HashMap::from([("fred".to_string(), envelope("FRED", 20.0))]);
        let conflicts = detect(BasketId::Macro, &result(sources));
        assert!(conflicts.is_empty());
    }
}
