//! MCP gateway: one HTTP API in front of many MCP tool servers.
//!
//! Each configured server is launched and connected at startup, its tools
//! discovered and cached, and exposed through three routes: list servers,
//! list a server's tools, and invoke a tool.
//!
//! # Architecture
//!
//! The gateway follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for backend connections
//! - **Adapters**: Concrete implementations of ports (stdio MCP, in-memory)
//!
//! # Modules
//!
//! - [`config`]: Server configuration file loading
//! - [`gateway`]: Bring-up, tool cache, and dispatch
//! - [`http`]: Axum router and JSON envelope

pub mod config;
pub mod gateway;
pub mod http;
