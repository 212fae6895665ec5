//! research-server
//!
//! Thin axum binary exposing the task manager over JSON-RPC 2.0, delegating
//! every method directly to it.

use std::sync::Arc;

use research_aggregator::TaskManager;
use research_baskets::BasketRegistry;
use research_fetch::UpstreamFetcher;
use research_server::config::ServerConfig;
use research_server::routes::{router, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))).init();

    let config = ServerConfig::from_env();
    if config.use_http_financials {
        tracing::warn!(
            "USE_HTTP_FINANCIALS is set but the in-process basket registry does not yet route \
             through an out-of-process worker; financials_http_url is parsed but unused"
        );
    }

    let fetcher = Arc::new(UpstreamFetcher::new());
    let registry = Arc::new(BasketRegistry::new(fetcher)?);
    let task_manager = Arc::new(TaskManager::new(registry));

    let app = router(AppState { task_manager });
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "research-server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
