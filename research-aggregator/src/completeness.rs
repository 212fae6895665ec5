//! Completeness scoring: a single declarative required-field table per
//! basket, replacing the original's several partially-overlapping lists.

use std::collections::HashMap;

use research_core::types::{BasketResult, CompletenessReport, MetricValue};
use research_types::BasketId;

const REQUIRED_FIELDS: &[(BasketId, &[&str])] = &[
    (BasketId::Fundamentals, &["revenue", "net_income", "total_assets", "total_liabilities", "stockholders_equity"]),
    (BasketId::Valuation, &["pe_ratio", "market_cap", "price_to_book", "ev_to_ebitda"]),
    (BasketId::Volatility, &["vix", "beta", "historical_volatility_52w_high"]),
    (BasketId::Macro, &["gdp_growth", "unemployment_rate", "fed_funds_rate", "inflation_rate"]),
    (BasketId::News, &["items"]),
    (BasketId::Sentiment, &["items"]),
];

fn field_is_present(result: &BasketResult, field: &str) -> bool {
    result.sources.values().any(|envelope| match envelope.data.get(field) {
        Some(MetricValue::Metric(m)) => m.value.is_some(),
        Some(MetricValue::Items(_)) => true,
        None => false,
    })
}

/// Score an artifact's collected baskets against the required-field table.
#[must_use]
pub fn score(metrics: &HashMap<BasketId, BasketResult>) -> CompletenessReport {
    let mut found = 0usize;
    let mut total = 0usize;
    let mut missing: HashMap<BasketId, Vec<String>> = HashMap::new();

    for (basket, fields) in REQUIRED_FIELDS {
        total += fields.len();
        let Some(result) = metrics.get(basket) else {
            missing.insert(*basket, fields.iter().map(|f| (*f).to_string()).collect());
            continue;
        };
        let mut basket_missing = Vec::new();
        for field in *fields {
            if field_is_present(result, field) {
                found += 1;
            } else {
                basket_missing.push((*field).to_string());
            }
        }
        if !basket_missing.is_empty() {
            missing.insert(*basket, basket_missing);
        }
    }

    let pct = if total == 0 { 0.0 } else { 100.0 * found as f64 / total as f64 };
    CompletenessReport { pct, found, total, missing }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use research_core::types::{BasketGroup, SourceEnvelope, TemporalMetric};

    fn result_with(basket: BasketId, fields: &[(&str, Option<f64>)]) -> BasketResult {
        let mut data = HashMap::new();
        for (name, value) in fields {
            data.insert((*name).to_string(), MetricValue::Metric(TemporalMetric { value: *value, ..Default::default() }));
        }
        BasketResult {
            group: BasketGroup::RawMetrics,
            ticker: "AAPL".to_string(),
            sources: HashMap::from([("test".to_string(), SourceEnvelope { source: "Test".to_string(), as_of: Utc::now(), data })]),
            source: basket,
            as_of: Utc::now(),
        }
    }

    #[test]
    fn fully_populated_basket_counts_every_field_as_found() {
        let mut metrics = HashMap::new();
        metrics.insert(
            BasketId::Macro,
            result_with(
                BasketId::Macro,
                &[("gdp_growth", Some(0.02)), ("unemployment_rate", Some(4.0)), ("fed_funds_rate", Some(5.0)), ("inflation_rate", Some(3.0))],
            ),
        );
        let report = score(&metrics);
        assert_eq!(report.missing.get(&BasketId::Macro), None);
        assert!(report.found >= 4);
    }

    #[test]
    fn missing_basket_contributes_every_field_to_missing() {
        let metrics = HashMap::new();
        let report = score(&metrics);
        assert_eq!(report.found, 0);
        assert_eq!(report.found + report.missing.values().map(Vec::len).sum::<usize>(), report.total);
    }

    #[test]
    fn null_valued_metric_counts_as_missing() {
        let mut metrics = HashMap::new();
        metrics.insert(BasketId::Macro, result_with(BasketId::Macro, &[("gdp_growth", None)]));
        let report = score(&metrics);
        let missing = &report.missing[&BasketId::Macro];
        assert!(missing.contains(&"gdp_growth".to_string()));
    }

    proptest! {
        #[test]
        fn found_plus_missing_always_equals_total(
            present in proptest::collection::vec(proptest::bool::ANY, BasketId::ALL.len())
        ) {
            let mut metrics = HashMap::new();
            for (present, basket) in present.iter().zip(BasketId::ALL) {
                let fields = REQUIRED_FIELDS.iter().find(|(b, _)| *b == basket).unwrap().1;
                let values: Vec<(&str, Option<f64>)> = fields.iter().map(|f| (*f, if *present { Some(1.0) } else { None })).collect();
                metrics.insert(basket, result_with(basket, &values));
            }
            let report = score(&metrics);
            prop_assert_eq!(report.found + report.missing.values().map(Vec::len).sum::<usize>(), report.total);
        }
    }
}
