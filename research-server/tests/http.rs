use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use research_aggregator::TaskManager;
use research_baskets::BasketRegistry;
use research_fetch::UpstreamFetcher;
use research_server::routes::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> axum::Router {
    let registry = Arc::new(BasketRegistry::new(Arc::new(UpstreamFetcher::new())).expect("registry"));
    let task_manager = Arc::new(TaskManager::new(registry));
    router(AppState { task_manager })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body readable");
    serde_json::from_slice(&bytes).expect("valid json")
}

#[tokio::test]
async fn agent_card_lists_the_three_rpc_methods() {
    let response = app()
        .oneshot(Request::builder().uri("/.well-known/agent.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["methods"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn health_reports_zero_tasks_before_any_submission() {
    let response = app().oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["task_count"], 0);
}

#[tokio::test]
async fn malformed_json_body_reports_parse_error() {
    let response = app()
        .oneshot(Request::builder().method("POST").uri("/").body(Body::from("not json")).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], -32700);
}

#[tokio::test]
async fn message_send_then_tasks_get_round_trips_a_task_id() {
    let app = app();
    let send_request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "message/send",
                "params": {"message": {"parts": [{"type": "text", "text": "Research Tesla"}]}}
            })
            .to_string(),
        ))
        .unwrap();
    let send_response = app.clone().oneshot(send_request).await.unwrap();
    let send_body = body_json(send_response).await;
    let task_id = send_body["result"]["task"]["id"].as_str().expect("task id present").to_string();
    assert_eq!(send_body["result"]["task"]["status"], "SUBMITTED");

    let get_request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(json!({"jsonrpc": "2.0", "id": 2, "method": "tasks/get", "params": {"taskId": task_id}}).to_string()))
        .unwrap();
    let get_response = app.oneshot(get_request).await.unwrap();
    let get_body = body_json(get_response).await;
    assert_eq!(get_body["result"]["task"]["id"], task_id);
}
