//! HTTP surface: the JSON-RPC endpoint, the agent capability descriptor, and
//! a liveness probe.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use research_aggregator::TaskManager;
use research_types::ProviderId;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::rpc::{dispatch, RpcResponse};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub task_manager: Arc<TaskManager>,
}

/// Build the full router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(rpc_handler))
        .route("/.well-known/agent.json", get(agent_card))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn rpc_handler(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    let response = match serde_json::from_slice(&body) {
        Ok(request) => dispatch(&state.task_manager, request),
        Err(_) => RpcResponse::parse_error(),
    };
    Json(serde_json::json!(response))
}

async fn agent_card() -> Json<Value> {
    let data_sources: Vec<&str> = ProviderId::ALL.iter().map(|p| p.as_str()).collect();
    Json(json!({
        "name": "research-aggregator",
        "description": "Task-oriented financial research aggregation over SEC EDGAR, Yahoo Finance, Finnhub, FRED, BEA, BLS, Alpha Vantage, NYT, NewsAPI, Tavily, and Reddit",
        "version": env!("CARGO_PKG_VERSION"),
        "capabilities": {
            "streaming": false,
            "pushNotifications": false,
            "partialResults": true,
            "dataSources": data_sources
        },
        "methods": ["message/send", "tasks/get", "tasks/cancel"]
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "task_count": state.task_manager.task_count(),
    }))
}
