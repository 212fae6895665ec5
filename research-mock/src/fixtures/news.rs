use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use research_core::types::{BasketGroup, BasketResult, ContentItem, MetricValue};
use research_types::BasketId;

use super::envelope;

/// News fixture: a couple of headlines per known symbol, one per provider.
pub fn by_symbol(symbol: &str) -> Option<BasketResult> {
    if !matches!(symbol, "AAPL" | "MSFT") {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(2024, 11, 1)?;

    let mut sources = HashMap::new();
    sources.insert(
        "nyt".to_string(),
        envelope(
            "NYT",
            vec![(
                "items",
                MetricValue::Items(vec![ContentItem {
                    title: format!("{symbol} reports quarterly results"),
                    content: "Summary of the latest earnings call.".to_string(),
                    url: format!("https://example.com/{symbol}/earnings"),
                    datetime: date,
                    source: "NYT".to_string(),
                    subreddit: None,
                }]),
            )],
        ),
    );
    sources.insert(
        "newsapi".to_string(),
        envelope(
            "NewsAPI",
            vec![(
                "items",
                MetricValue::Items(vec![ContentItem {
                    title: format!("Analysts weigh in on {symbol}"),
                    content: "Roundup of analyst commentary.".to_string(),
                    url: format!("https://example.com/{symbol}/analysts"),
                    datetime: date,
                    source: "NewsAPI".to_string(),
                    subreddit: None,
                }]),
            )],
        ),
    );

    Some(BasketResult {
        group: BasketGroup::ContentAnalysis,
        ticker: symbol.to_string(),
        sources,
        source: BasketId::News,
        as_of: Utc::now(),
    })
}
