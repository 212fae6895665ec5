use std::collections::HashMap;

use chrono::Utc;
use research_core::types::{BasketGroup, BasketResult, DataType};
use research_types::BasketId;

use super::{envelope, raw_metric};

/// Macro fixture: national indicators, not ticker-specific but keyed by symbol
/// for basket-invocation consistency.
pub fn by_symbol(symbol: &str) -> Option<BasketResult> {
    if !matches!(symbol, "AAPL" | "MSFT" | "NVDA" | "GOOGL" | "KO" | "PEP") {
        return None;
    }

    let mut sources = HashMap::new();
    sources.insert(
        "fred".to_string(),
        envelope(
            "FRED",
            vec![
                ("gdp_growth", raw_metric(0.028, DataType::Quarterly)),
                ("unemployment_rate", raw_metric(0.041, DataType::Monthly)),
                ("fed_funds_rate", raw_metric(0.0525, DataType::Daily)),
            ],
        ),
    );

    Some(BasketResult {
        group: BasketGroup::RawMetrics,
        ticker: symbol.to_string(),
        sources,
        source: BasketId::Macro,
        as_of: Utc::now(),
    })
}
