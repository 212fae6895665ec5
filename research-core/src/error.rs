//! Re-export of the workspace-wide error type.

pub use research_types::{ResearchError, Result};
