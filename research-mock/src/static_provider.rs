use async_trait::async_trait;
use research_core::provider::BasketProvider;
use research_core::types::{BasketResult, Ticker};
use research_types::ResearchError;

type FixtureFn = fn(&str) -> Option<BasketResult>;

/// A provider backed by a static, deterministic fixture table.
///
/// The sentinel symbols `"FAIL"` and `"TIMEOUT"` trigger a forced error or a
/// brief simulated delay respectively, for exercising fallback chains and
/// deadline handling without a live network dependency.
pub struct StaticMockProvider {
    provider_id: &'static str,
    source_name: &'static str,
    fixture: FixtureFn,
}

impl StaticMockProvider {
    /// Fundamentals fixture, backed by the SEC EDGAR identity.
    #[must_use]
    pub fn fundamentals() -> Self {
        Self {
            provider_id: "sec_edgar",
            source_name: "SEC EDGAR",
            fixture: crate::fixtures::fundamentals::by_symbol,
        }
    }

    /// Valuation fixture, backed by the Yahoo Finance identity.
    #[must_use]
    pub fn valuation() -> Self {
        Self {
            provider_id: "yahoo_finance",
            source_name: "Yahoo Finance",
            fixture: crate::fixtures::valuation::by_symbol,
        }
    }

    /// Volatility fixture, backed by the Yahoo Finance identity.
    #[must_use]
    pub fn volatility() -> Self {
        Self {
            provider_id: "yahoo_finance",
            source_name: "Yahoo Finance",
            fixture: crate::fixtures::volatility::by_symbol,
        }
    }

    /// Macro fixture, backed by the FRED identity.
    #[must_use]
    pub fn macro_data() -> Self {
        Self {
            provider_id: "fred",
            source_name: "FRED",
            fixture: crate::fixtures::macro_data::by_symbol,
        }
    }

    /// News fixture, backed by the NYT identity.
    #[must_use]
    pub fn news() -> Self {
        Self {
            provider_id: "nyt",
            source_name: "NYT",
            fixture: crate::fixtures::news::by_symbol,
        }
    }

    /// Sentiment fixture, backed by the Reddit identity.
    #[must_use]
    pub fn sentiment() -> Self {
        Self {
            provider_id: "reddit",
            source_name: "Reddit",
            fixture: crate::fixtures::sentiment::by_symbol,
        }
    }
}

#[async_trait]
impl BasketProvider for StaticMockProvider {
    fn provider_id(&self) -> &'static str {
        self.provider_id
    }

    fn source_name(&self) -> &'static str {
        self.source_name
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        let symbol = ticker.symbol.as_str();
        if symbol == "FAIL" {
            return Err(ResearchError::http_error(self.provider_id, 503));
        }
        if symbol == "TIMEOUT" {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        }
        (self.fixture)(symbol)
            .ok_or_else(|| ResearchError::Other(format!("no fixture data for {symbol}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fail_sentinel_returns_an_http_error() {
        let provider = StaticMockProvider::fundamentals();
        let ticker = Ticker::new("FAIL", None);
        let err = provider.fetch(&ticker).await.unwrap_err();
        assert!(matches!(err, ResearchError::HttpError { .. }));
    }

    #[tokio::test]
    async fn known_symbol_returns_fixture_data() {
        let provider = StaticMockProvider::fundamentals();
        let ticker = Ticker::new("AAPL", None);
        let result = provider.fetch(&ticker).await.unwrap();
        assert_eq!(result.ticker, "AAPL");
        assert!(result.sources.contains_key("sec_edgar"));
    }

    #[tokio::test]
    async fn unknown_symbol_errors() {
        let provider = StaticMockProvider::fundamentals();
        let ticker = Ticker::new("ZZZZ", None);
        assert!(provider.fetch(&ticker).await.is_err());
    }
}
