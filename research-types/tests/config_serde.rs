use research_types::{BasketId, ProviderId, RateLimiterConfig};

#[test]
fn default_rate_limiter_configs_match_registered_provider_table() {
    assert!(matches!(
        RateLimiterConfig::default_for(ProviderId::SecEdgar),
        RateLimiterConfig::TokenBucket {
            rate,
            capacity: 10
        } if rate == 10.0
    ));
    assert!(matches!(
        RateLimiterConfig::default_for(ProviderId::Nyt),
        RateLimiterConfig::DailyQuota { daily_limit: 500 }
    ));
    assert!(matches!(
        RateLimiterConfig::default_for(ProviderId::Fred),
        RateLimiterConfig::SlidingWindow {
            max_requests: 120,
            ..
        }
    ));
}

#[test]
fn basket_id_round_trips_through_json() {
    for basket in BasketId::ALL {
        let json = serde_json::to_string(&basket).unwrap();
        let back: BasketId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), basket.as_str());
    }
}

#[test]
fn basket_ids_preserve_fixed_invocation_order() {
    let order: Vec<&str> = BasketId::ALL.iter().map(|b| b.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "fundamentals",
            "valuation",
            "volatility",
            "macro",
            "news",
            "sentiment"
        ]
    );
}
