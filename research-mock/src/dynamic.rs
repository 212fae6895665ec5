use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use research_core::provider::BasketProvider;
use research_core::types::{BasketResult, Ticker};
use research_types::ResearchError;

/// Instruction for how `fetch` should behave for a given ticker symbol.
#[derive(Clone)]
pub enum MockBehavior {
    /// Return the provided result immediately.
    Return(BasketResult),
    /// Fail immediately with the provided error.
    Fail(ResearchError),
    /// Hang indefinitely (simulate a stalled upstream call).
    Hang,
}

#[derive(Default)]
struct InternalState {
    rules: HashMap<String, MockBehavior>,
}

/// Controller handle used by tests to drive a [`DynamicMockProvider`].
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior `fetch` should exhibit for `symbol`.
    pub async fn set_behavior(&self, symbol: impl Into<String>, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard.rules.insert(symbol.into(), behavior);
    }

    /// Clear all configured behaviors.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.rules.clear();
    }
}

/// A provider that defers all behavior to an external controller, for tests
/// exercising fallback chains, retries, and breaker/limiter interaction.
pub struct DynamicMockProvider {
    provider_id: &'static str,
    source_name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockProvider {
    /// Create a new dynamic mock provider and its controller.
    #[must_use]
    pub fn new_with_controller(
        provider_id: &'static str,
        source_name: &'static str,
    ) -> (Arc<dyn BasketProvider>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self {
            provider_id,
            source_name,
            state,
        });
        (me as Arc<dyn BasketProvider>, controller)
    }
}

#[async_trait]
impl BasketProvider for DynamicMockProvider {
    fn provider_id(&self) -> &'static str {
        self.provider_id
    }

    fn source_name(&self) -> &'static str {
        self.source_name
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<BasketResult, ResearchError> {
        let behavior = {
            let guard = self.state.lock().await;
            guard.rules.get(&ticker.symbol).cloned()
        };
        match behavior {
            Some(MockBehavior::Return(result)) => Ok(result),
            Some(MockBehavior::Fail(err)) => Err(err),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Err(ResearchError::Other(format!(
                "no behavior configured for {}",
                ticker.symbol
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_core::types::BasketGroup;
    use research_types::BasketId;
    use std::collections::HashMap as StdHashMap;

    fn sample_result(symbol: &str) -> BasketResult {
        BasketResult {
            group: BasketGroup::RawMetrics,
            ticker: symbol.to_string(),
            sources: StdHashMap::new(),
            source: BasketId::Volatility,
            as_of: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn returns_configured_result() {
        let (provider, controller) = DynamicMockProvider::new_with_controller("mock", "Mock");
        controller
            .set_behavior("AAPL", MockBehavior::Return(sample_result("AAPL")))
            .await;
        let result = provider.fetch(&Ticker::new("AAPL", None)).await.unwrap();
        assert_eq!(result.ticker, "AAPL");
    }

    #[tokio::test]
    async fn returns_configured_failure() {
        let (provider, controller) = DynamicMockProvider::new_with_controller("mock", "Mock");
        controller
            .set_behavior("AAPL", MockBehavior::Fail(ResearchError::timeout("mock")))
            .await;
        let err = provider.fetch(&Ticker::new("AAPL", None)).await.unwrap_err();
        assert!(matches!(err, ResearchError::Timeout { .. }));
    }

    #[tokio::test]
    async fn unconfigured_symbol_errors() {
        let (provider, _controller) = DynamicMockProvider::new_with_controller("mock", "Mock");
        assert!(provider.fetch(&Ticker::new("ZZZZ", None)).await.is_err());
    }
}
