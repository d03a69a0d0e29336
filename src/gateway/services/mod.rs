//! Gateway orchestration services: bring-up, tool caching, and dispatch.

mod bring_up;
mod call;
mod dispatch;
mod tool_cache;

pub use bring_up::{
    BringUpError, BringUpOrchestrator, BringUpReport, DiscoveryOutcome, SkippedServer,
};
pub use dispatch::{DispatchError, DispatchService, ServerSummary};
pub use tool_cache::{CachedTools, ToolCache, ToolCacheError};
