use std::time::Duration;

use async_trait::async_trait;
use research_types::ResearchError;
use serde_json::Value;

use crate::{ChildProcessTransport, WorkerTransport};

/// `POST /tools/<name>` transport for the fundamentals basket's load-balanced
/// worker pool. Falls back to a child-process transport transparently when
/// the HTTP connection itself fails (not on an upstream error response).
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    fallback: Option<ChildProcessTransport>,
}

impl HttpTransport {
    /// Build a transport posting to `base_url` with the given per-call timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder().timeout(timeout).build().unwrap_or_default(),
            base_url: base_url.into(),
            fallback: None,
        }
    }

    /// Attach a child-process transport used when the HTTP connection fails.
    #[must_use]
    pub fn with_fallback(mut self, fallback: ChildProcessTransport) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

#[async_trait]
impl WorkerTransport for HttpTransport {
    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ResearchError> {
        let url = format!("{}/tools/{tool}", self.base_url);
        let response = self.client.post(&url).json(&arguments).send().await;

        let response = match response {
            Ok(response) => response,
            Err(err) if err.is_connect() || err.is_timeout() => {
                return match &self.fallback {
                    Some(fallback) => fallback.call_tool(tool, arguments).await,
                    None => Err(ResearchError::TransportError(format!("worker HTTP transport unreachable: {err}"))),
                };
            }
            Err(err) => return Err(ResearchError::TransportError(format!("worker HTTP request failed: {err}"))),
        };

        if !response.status().is_success() {
            return Err(ResearchError::http_error("worker_http", response.status().as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ResearchError::parse_error("worker_http", format!("invalid tool response body: {e}")))
    }
}
