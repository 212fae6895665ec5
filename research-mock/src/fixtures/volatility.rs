use std::collections::HashMap;

use chrono::Utc;
use research_core::types::{BasketGroup, BasketResult, DataType};
use research_types::BasketId;

use super::{envelope, raw_metric};

/// Volatility fixture: a single authoritative source, no cross-checking.
pub fn by_symbol(symbol: &str) -> Option<BasketResult> {
    let (beta, hv_30d, iv) = match symbol {
        "AAPL" => (1.24, 0.21, 0.24),
        "MSFT" => (0.90, 0.18, 0.20),
        _ => return None,
    };

    let mut sources = HashMap::new();
    sources.insert(
        "yahoo_finance".to_string(),
        envelope(
            "Yahoo Finance",
            vec![
                ("beta", raw_metric(beta, DataType::PointInTime)),
                ("historical_volatility_30d", raw_metric(hv_30d, DataType::ThirtyDay)),
                ("implied_volatility", raw_metric(iv, DataType::PointInTime)),
            ],
        ),
    );

    Some(BasketResult {
        group: BasketGroup::RawMetrics,
        ticker: symbol.to_string(),
        sources,
        source: BasketId::Volatility,
        as_of: Utc::now(),
    })
}
