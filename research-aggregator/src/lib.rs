//! research-aggregator
//!
//! Resolves a free-form research request to a ticker, drives basket workers
//! in a fixed order, normalizes and cross-checks their output, and tracks
//! the whole run as a polled [`Task`](research_core::types::Task).

mod aggregator;
mod completeness;
mod conflict;
mod metrics;
mod task;
mod ticker;
mod trim;

pub use aggregator::Aggregator;
pub use task::TaskManager;
pub use ticker::resolve as resolve_ticker;

pub use research_core::types::{Artifact, ResearchArtifact, Task, TaskStatus};
pub use research_types::ResearchError;
