//! research-transport
//!
//! Bridges to out-of-process basket workers: a default child-process
//! JSON-RPC transport, and an alternate HTTP transport that falls back to
//! the child-process path on connection failure.
//!
//! Every basket worker shipped in `research-baskets` runs in-process and
//! never goes through this crate; it exists for operators who still run a
//! basket as a standalone worker binary speaking the same protocol.

mod child_process;
mod http;
mod jsonrpc;

pub use child_process::ChildProcessTransport;
pub use http::HttpTransport;
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};

use async_trait::async_trait;
use research_types::ResearchError;
use serde_json::Value;

/// A bridge to an out-of-process worker that serves `tools/call`.
#[async_trait]
pub trait WorkerTransport: Send + Sync {
    /// Invoke `tool` with `arguments`, returning its decoded JSON result.
    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ResearchError>;
}
