use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use research_core::types::{BasketGroup, BasketResult, ContentItem, MetricValue};
use research_types::BasketId;

use super::envelope;

/// Sentiment fixture: retail chatter from Reddit.
pub fn by_symbol(symbol: &str) -> Option<BasketResult> {
    if !matches!(symbol, "AAPL" | "MSFT") {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(2024, 11, 2)?;

    let mut sources = HashMap::new();
    sources.insert(
        "reddit".to_string(),
        envelope(
            "Reddit",
            vec![(
                "items",
                MetricValue::Items(vec![ContentItem {
                    title: format!("Discussion thread: {symbol}"),
                    content: "Community sentiment leans cautiously positive.".to_string(),
                    url: format!("https://reddit.com/r/stocks/{symbol}"),
                    datetime: date,
                    source: "Reddit".to_string(),
                    subreddit: Some("stocks".to_string()),
                }]),
            )],
        ),
    );

    Some(BasketResult {
        group: BasketGroup::ContentAnalysis,
        ticker: symbol.to_string(),
        sources,
        source: BasketId::Sentiment,
        as_of: Utc::now(),
    })
}
