use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use research_core::types::{BasketGroup, BasketResult};
use research_types::BasketId;

use super::{envelope, metric};

/// Valuation fixture: Yahoo Finance and Finnhub multiples for the same quarter.
pub fn by_symbol(symbol: &str) -> Option<BasketResult> {
    let (pe_ratio, market_cap, price_to_book) = match symbol {
        "AAPL" => (31.5, 2_950_000_000_000.0, 48.2),
        "MSFT" => (35.2, 3_100_000_000_000.0, 11.4),
        _ => return None,
    };
    let end_date = NaiveDate::from_ymd_opt(2024, 9, 28)?;

    let mut sources = HashMap::new();
    sources.insert(
        "yahoo_finance".to_string(),
        envelope(
            "Yahoo Finance",
            vec![
                ("pe_ratio", metric(pe_ratio, end_date, 2024, "10-K")),
                ("market_cap", metric(market_cap, end_date, 2024, "10-K")),
                (
                    "price_to_book",
                    metric(price_to_book, end_date, 2024, "10-K"),
                ),
            ],
        ),
    );
    sources.insert(
        "finnhub".to_string(),
        envelope(
            "Finnhub",
            vec![("pe_ratio", metric(pe_ratio * 0.998, end_date, 2024, "10-K"))],
        ),
    );

    Some(BasketResult {
        group: BasketGroup::SourceComparison,
        ticker: symbol.to_string(),
        sources,
        source: BasketId::Valuation,
        as_of: Utc::now(),
    })
}
