//! News/sentiment trimming: sort content items descending by date and cap
//! the list at ten, recording the original count alongside it.

use research_core::types::{BasketResult, MetricValue};

const MAX_ITEMS: usize = 10;

/// Trim every `items` field across a content-bearing basket's sources in
/// place, leaving `total_items` for each trimmed source as a count field.
pub fn trim_in_place(result: &mut BasketResult) {
    for envelope in result.sources.values_mut() {
        let Some(MetricValue::Items(items)) = envelope.data.get("items").cloned() else {
            continue;
        };
        let total = items.len();
        let mut sorted = items;
        sorted.sort_by(|a, b| b.datetime.cmp(&a.datetime));
        sorted.truncate(MAX_ITEMS);
        envelope.data.insert("items".to_string(), MetricValue::Items(sorted));
        envelope.data.insert(
            "total_items".to_string(),
            MetricValue::Metric(research_core::types::TemporalMetric {
                value: Some(total as f64),
                ..Default::default()
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use proptest::prelude::*;
    use research_core::types::{BasketGroup, ContentItem, SourceEnvelope};
    use research_types::BasketId;
    use std::collections::HashMap;

    fn item(day: u32) -> ContentItem {
        ContentItem {
            title: format!("story {day}"),
            content: String::new(),
            url: String::new(),
            datetime: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
            source: "Test".to_string(),
            subreddit: None,
        }
    }

    #[test]
    fn trims_to_ten_and_sorts_descending() {
        let items: Vec<ContentItem> = (1..=15).map(item).collect();
        let mut data = HashMap::new();
        data.insert("items".to_string(), MetricValue::Items(items));
        let mut result = BasketResult {
            group: BasketGroup::ContentAnalysis,
            ticker: "AAPL".to_string(),
            sources: HashMap::from([("nyt".to_string(), SourceEnvelope { source: "NYT".to_string(), as_of: Utc::now(), data })]),
            source: BasketId::News,
            as_of: Utc::now(),
        };

        trim_in_place(&mut result);

        let envelope = &result.sources["nyt"];
        let Some(MetricValue::Items(items)) = envelope.data.get("items") else {
            panic!("expected items");
        };
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].title, "story 15");
        assert!(items.windows(2).all(|w| w[0].datetime >= w[1].datetime));
    }

    fn arb_item() -> impl Strategy<Value = ContentItem> {
        (2020i32..2030, 1u32..13, 1u32..28).prop_map(|(y, m, d)| ContentItem {
            title: format!("{y}-{m}-{d}"),
            content: String::new(),
            url: String::new(),
            datetime: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            source: "Test".to_string(),
            subreddit: None,
        })
    }

    proptest! {
        #[test]
        fn trimmed_items_never_exceed_ten_and_stay_sorted_descending(items in proptest::collection::vec(arb_item(), 0..30)) {
            let total = items.len();
            let mut data = HashMap::new();
            data.insert("items".to_string(), MetricValue::Items(items));
            let mut result = BasketResult {
                group: BasketGroup::ContentAnalysis,
                ticker: "AAPL".to_string(),
                sources: HashMap::from([("nyt".to_string(), SourceEnvelope { source: "NYT".to_string(), as_of: Utc::now(), data })]),
                source: BasketId::News,
                as_of: Utc::now(),
            };

            trim_in_place(&mut result);

            let envelope = &result.sources["nyt"];
            let Some(MetricValue::Items(trimmed)) = envelope.data.get("items") else {
                panic!("expected items");
            };
            prop_assert!(trimmed.len() <= 10);
            prop_assert!(trimmed.windows(2).all(|w| w[0].datetime >= w[1].datetime));

            let Some(MetricValue::Metric(total_metric)) = envelope.data.get("total_items") else {
                panic!("expected total_items");
            };
            prop_assert_eq!(total_metric.value, Some(total as f64));
        }
    }
}
