use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use research_types::ResearchError;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout;

use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse};

const INITIALIZE_TIMEOUT: Duration = Duration::from_secs(20);
const GRACEFUL_EXIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Spawns a worker executable per tool call and speaks the newline-delimited
/// JSON-RPC 2.0 handshake: `initialize` → `notifications/initialized` →
/// `tools/call`.
pub struct ChildProcessTransport {
    executable: PathBuf,
    tool_deadline: Duration,
}

impl ChildProcessTransport {
    /// Build a transport that launches `executable` for every call.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>, tool_deadline: Duration) -> Self {
        Self {
            executable: executable.into(),
            tool_deadline,
        }
    }

    async fn spawn(&self) -> Result<Child, ResearchError> {
        Command::new(&self.executable)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ResearchError::TransportError(format!("failed to spawn worker: {e}")))
    }

    async fn write_request(stdin: &mut tokio::process::ChildStdin, request: &JsonRpcRequest) -> Result<(), ResearchError> {
        let line = request
            .to_line()
            .map_err(|e| ResearchError::TransportError(format!("failed to encode request: {e}")))?;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| ResearchError::TransportError(format!("failed to write to worker stdin: {e}")))
    }

    /// Read stdout lines until one parses as a JSON-RPC response matching `id`.
    async fn await_response(
        lines: &mut tokio::io::Lines<BufReader<tokio::process::ChildStdout>>,
        id: u64,
        deadline: Duration,
    ) -> Result<JsonRpcResponse, ResearchError> {
        timeout(deadline, async {
            loop {
                let line = lines
                    .next_line()
                    .await
                    .map_err(|e| ResearchError::TransportError(format!("failed to read worker stdout: {e}")))?
                    .ok_or_else(|| ResearchError::TransportError("worker closed stdout before responding".to_string()))?;
                if line.trim().is_empty() {
                    continue;
                }
                let response: JsonRpcResponse = match serde_json::from_str(&line) {
                    Ok(r) => r,
                    Err(_) => continue,
                };
                if response.id == Some(id) {
                    return Ok(response);
                }
            }
        })
        .await
        .map_err(|_| ResearchError::timeout("worker_transport"))?
    }
}

#[async_trait]
impl crate::WorkerTransport for ChildProcessTransport {
    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ResearchError> {
        let mut child = self.spawn().await?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ResearchError::TransportError("worker stdin not piped".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ResearchError::TransportError("worker stdout not piped".to_string()))?;
        let mut lines = BufReader::new(stdout).lines();

        let init = JsonRpcRequest::call(
            1,
            "initialize",
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "research-aggregator", "version": env!("CARGO_PKG_VERSION") },
            }),
        );
        Self::write_request(&mut stdin, &init).await?;
        let response = Self::await_response(&mut lines, 1, INITIALIZE_TIMEOUT).await?;
        if let Some(error) = response.error {
            return Err(ResearchError::TransportError(format!("worker initialize failed: {}", error.message)));
        }

        let initialized = JsonRpcRequest::notification("notifications/initialized");
        Self::write_request(&mut stdin, &initialized).await?;

        let call = JsonRpcRequest::call(2, "tools/call", json!({ "name": tool, "arguments": arguments }));
        Self::write_request(&mut stdin, &call).await?;
        let response = Self::await_response(&mut lines, 2, self.tool_deadline).await?;

        // Stdin is dropped here, closing the pipe; the child is expected to
        // exit on EOF.
        drop(stdin);

        let result = match response.error {
            Some(error) => return Err(ResearchError::TransportError(format!("tool call failed: {}", error.message))),
            None => response.result.unwrap_or(Value::Null),
        };

        let decoded = decode_tool_result(&result);

        match timeout(GRACEFUL_EXIT_TIMEOUT, child.wait()).await {
            Ok(_) => {}
            Err(_) => {
                let _ = child.kill().await;
            }
        }

        Ok(decoded)
    }
}

/// Extract the first `{"type":"text"}` part of a tool result's `content[]`
/// array and JSON-decode it, falling back to `{raw_text: ...}` on failure.
fn decode_tool_result(result: &Value) -> Value {
    let text = result
        .get("content")
        .and_then(Value::as_array)
        .and_then(|parts| parts.iter().find(|p| p.get("type").and_then(Value::as_str) == Some("text")))
        .and_then(|part| part.get("text"))
        .and_then(Value::as_str);

    match text {
        Some(text) => serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw_text": text })),
        None => result.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_well_formed_text_part() {
        let result = json!({ "content": [{ "type": "text", "text": "{\"revenue\": 100}" }] });
        assert_eq!(decode_tool_result(&result), json!({ "revenue": 100 }));
    }

    #[test]
    fn falls_back_to_raw_text_on_decode_failure() {
        let result = json!({ "content": [{ "type": "text", "text": "not json" }] });
        assert_eq!(decode_tool_result(&result), json!({ "raw_text": "not json" }));
    }
}
