use std::collections::HashMap;

use chrono::Utc;
use proptest::prelude::*;
use research_core::types::{BasketGroup, BasketResult, SourceEnvelope};
use research_types::BasketId;

fn arb_source_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Minimal Fallback".to_string()),
        Just("Historical Average".to_string()),
        "[A-Za-z ]{1,12}".prop_map(|s| s),
    ]
}

fn arb_envelope() -> impl Strategy<Value = SourceEnvelope> {
    arb_source_name().prop_map(|source| SourceEnvelope {
        source,
        as_of: Utc::now(),
        data: HashMap::new(),
    })
}

fn arb_result() -> impl Strategy<Value = BasketResult> {
    proptest::collection::hash_map("[a-z_]{1,8}", arb_envelope(), 0..5).prop_map(|sources| BasketResult {
        group: BasketGroup::RawMetrics,
        ticker: "AAPL".to_string(),
        sources,
        source: BasketId::Macro,
        as_of: Utc::now(),
    })
}

proptest! {
    #[test]
    fn is_all_fallback_matches_every_source_name_prefix(result in arb_result()) {
        let expected = !result.sources.is_empty()
            && result.sources.values().all(|e| {
                e.source.starts_with("Minimal Fallback") || e.source.starts_with("Historical Average")
            });
        prop_assert_eq!(result.is_all_fallback(), expected);
    }

    #[test]
    fn a_single_non_fallback_source_always_disqualifies(result in arb_result()) {
        let mut result = result;
        result.sources.insert(
            "definitely_live".to_string(),
            SourceEnvelope { source: "Yahoo Finance".to_string(), as_of: Utc::now(), data: HashMap::new() },
        );
        prop_assert!(!result.is_all_fallback());
    }
}
