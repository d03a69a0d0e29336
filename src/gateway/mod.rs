//! MCP gateway core: bring-up, tool caching, and request dispatch.
//!
//! Configured MCP servers are connected once at startup, their tool lists
//! cached, and HTTP requests dispatched onto the live connections. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
