//! research-server
//!
//! Thin axum binary exposing the task manager over JSON-RPC 2.0, delegating
//! every method directly to it. Split into a library so the HTTP surface
//! can be exercised by in-process integration tests.

pub mod config;
pub mod routes;
pub mod rpc;
