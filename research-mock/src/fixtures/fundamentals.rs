use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use research_core::types::{BasketGroup, BasketResult};
use research_types::BasketId;

use super::{envelope, metric};

/// Fundamentals fixture: SEC EDGAR and Yahoo Finance reporting the same filing year.
pub fn by_symbol(symbol: &str) -> Option<BasketResult> {
    let (revenue, net_income, eps) = match symbol {
        "AAPL" => (391_035_000_000.0, 93_736_000_000.0, 6.11),
        "MSFT" => (245_122_000_000.0, 88_136_000_000.0, 11.80),
        _ => return None,
    };
    let end_date = NaiveDate::from_ymd_opt(2024, 9, 28)?;

    let mut sources = HashMap::new();
    sources.insert(
        "sec_edgar".to_string(),
        envelope(
            "SEC EDGAR",
            vec![
                ("revenue", metric(revenue, end_date, 2024, "10-K")),
                ("net_income", metric(net_income, end_date, 2024, "10-K")),
                ("eps_diluted", metric(eps, end_date, 2024, "10-K")),
            ],
        ),
    );
    sources.insert(
        "yahoo_finance".to_string(),
        envelope(
            "Yahoo Finance",
            vec![
                ("revenue", metric(revenue * 1.001, end_date, 2024, "10-K")),
                ("net_income", metric(net_income, end_date, 2024, "10-K")),
            ],
        ),
    );

    Some(BasketResult {
        group: BasketGroup::SourceComparison,
        ticker: symbol.to_string(),
        sources,
        source: BasketId::Fundamentals,
        as_of: Utc::now(),
    })
}
