//! JSON-RPC 2.0 request/response framing for the HTTP front door.

use std::sync::Arc;

use research_aggregator::{Task, TaskManager};
use research_types::ResearchError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON-RPC 2.0 request, as received over HTTP POST.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub id: Option<Value>,
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcResponse {
    fn ok(id: Value, result: Value) -> Self {
        Self { jsonrpc: "2.0", id, result: Some(result), error: None }
    }

    fn err(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self { jsonrpc: "2.0", id, result: None, error: Some(RpcError { code, message: message.into() }) }
    }

    /// A `-32700 Parse error` response for a body that isn't valid JSON.
    /// Per JSON-RPC 2.0, the id is always `null` here since the request
    /// could not be parsed far enough to read one.
    #[must_use]
    pub fn parse_error() -> Self {
        Self::err(Value::Null, -32700, "parse error")
    }
}

#[derive(Debug, Deserialize)]
struct SendParams {
    message: MessagePayload,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    parts: Vec<MessagePart>,
}

#[derive(Debug, Deserialize)]
struct MessagePart {
    #[serde(rename = "type")]
    kind: String,
    text: String,
}

impl MessagePayload {
    /// Join every `text`-typed part into the free-form string the ticker
    /// resolver expects.
    fn text(&self) -> String {
        self.parts.iter().filter(|part| part.kind == "text").map(|part| part.text.as_str()).collect::<Vec<_>>().join(" ")
    }
}

#[derive(Debug, Deserialize)]
struct TaskIdParams {
    #[serde(rename = "taskId")]
    task_id: String,
}

/// Dispatch a parsed JSON-RPC request to the task manager and build its response.
pub fn dispatch(task_manager: &Arc<TaskManager>, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone().unwrap_or(Value::Null);

    if request.jsonrpc.as_deref() != Some("2.0") || request.method.is_none() {
        return RpcResponse::err(id, -32600, "invalid request");
    }

    let method = request.method.unwrap();
    let params = request.params.unwrap_or(Value::Null);

    let outcome = match method.as_str() {
        "message/send" => serde_json::from_value::<SendParams>(params)
            .map_err(|e| ResearchError::invalid_params(e.to_string()))
            .and_then(|p| task_manager.submit(&p.message.text())),
        "tasks/get" => serde_json::from_value::<TaskIdParams>(params)
            .map_err(|e| ResearchError::invalid_params(e.to_string()))
            .and_then(|p| task_manager.get(&p.task_id)),
        "tasks/cancel" => serde_json::from_value::<TaskIdParams>(params)
            .map_err(|e| ResearchError::invalid_params(e.to_string()))
            .and_then(|p| task_manager.cancel(&p.task_id)),
        _ => return RpcResponse::err(id, -32601, format!("method not found: {method}")),
    };

    to_response(id, outcome)
}

fn to_response(id: Value, outcome: Result<Task, ResearchError>) -> RpcResponse {
    match outcome {
        Ok(task) => RpcResponse::ok(id, serde_json::json!({ "task": task })),
        Err(err) => RpcResponse::err(id, err.json_rpc_code(), err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_baskets::BasketRegistry;
    use research_fetch::UpstreamFetcher;

    fn manager() -> Arc<TaskManager> {
        let registry = Arc::new(BasketRegistry::new(Arc::new(UpstreamFetcher::new())).expect("registry"));
        Arc::new(TaskManager::new(registry))
    }

    #[test]
    fn rejects_requests_missing_the_jsonrpc_version() {
        let request = RpcRequest { jsonrpc: None, id: Some(serde_json::json!(1)), method: Some("tasks/get".to_string()), params: None };
        let response = dispatch(&manager(), request);
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[test]
    fn unknown_method_reports_method_not_found() {
        let request = RpcRequest {
            jsonrpc: Some("2.0".to_string()),
            id: Some(serde_json::json!(1)),
            method: Some("tasks/frobnicate".to_string()),
            params: None,
        };
        let response = dispatch(&manager(), request);
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[test]
    fn tasks_get_for_unknown_id_reports_task_not_found() {
        let request = RpcRequest {
            jsonrpc: Some("2.0".to_string()),
            id: Some(serde_json::json!(1)),
            method: Some("tasks/get".to_string()),
            params: Some(serde_json::json!({"taskId": "ghost"})),
        };
        let response = dispatch(&manager(), request);
        assert_eq!(response.error.unwrap().code, -32001);
    }

    #[test]
    fn message_send_with_unresolvable_ticker_reports_invalid_params() {
        let request = RpcRequest {
            jsonrpc: Some("2.0".to_string()),
            id: Some(serde_json::json!(1)),
            method: Some("message/send".to_string()),
            params: Some(serde_json::json!({"message": {"parts": [{"type": "text", "text": "###"}]}})),
        };
        let response = dispatch(&manager(), request);
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[test]
    fn message_send_wraps_the_task_under_a_task_key() {
        let request = RpcRequest {
            jsonrpc: Some("2.0".to_string()),
            id: Some(serde_json::json!(1)),
            method: Some("message/send".to_string()),
            params: Some(serde_json::json!({"message": {"parts": [{"type": "text", "text": "Research Tesla"}]}})),
        };
        let response = dispatch(&manager(), request);
        let result = response.result.unwrap();
        assert!(result.get("task").is_some());
        assert_eq!(result["task"]["status"], "SUBMITTED");
    }
}
