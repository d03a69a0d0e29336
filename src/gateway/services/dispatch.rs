//! Request dispatch onto backend connections.

use super::call::bounded;
use super::tool_cache::{CachedTools, ToolCache, ToolCacheError};
use crate::gateway::{
    domain::{
        BackendOperation, Deadline, GatewayTimeouts, ServerCatalog, ServerName, ToolArguments,
    },
    ports::{BackendCallError, ConnectionRegistry},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors returned to gateway callers.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// No live connection exists for the server.
    #[error("MCP server '{server}' does not exist")]
    UnknownServer {
        /// Requested server name.
        server: String,
    },

    /// The server's tools are not cached and could not be fetched.
    #[error("failed to get tools for MCP server '{server}': {source}")]
    ServerUnavailable {
        /// Requested server name.
        server: String,
        /// Why the refresh failed.
        source: ToolCacheError,
    },

    /// The server reported an empty tool list.
    #[error("MCP server '{server}' has no available tools")]
    NoToolsAvailable {
        /// Requested server name.
        server: String,
    },

    /// The tool call failed, timed out, or the tool reported an error.
    #[error("failed to call tool '{tool}' on MCP server '{server}': {source}")]
    InvocationFailed {
        /// Requested server name.
        server: String,
        /// Requested tool name.
        tool: String,
        /// Underlying failure.
        source: BackendCallError,
    },
}

/// One configured server as shown in the server listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerSummary {
    /// Server name.
    pub name: ServerName,
    /// Configured description, possibly empty.
    pub description: String,
    /// Number of cached tools, when discovery has succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_tools: Option<usize>,
    /// When the cached tool list was fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_refreshed_at: Option<DateTime<Utc>>,
}

/// Maps gateway operations onto the tool cache and connection registry.
pub struct DispatchService<R, C>
where
    R: ConnectionRegistry,
    C: Clock + Send + Sync,
{
    catalog: Arc<ServerCatalog>,
    registry: Arc<R>,
    cache: Arc<ToolCache<R, C>>,
    timeouts: GatewayTimeouts,
}

impl<R, C> DispatchService<R, C>
where
    R: ConnectionRegistry,
    C: Clock + Send + Sync,
{
    /// Creates a dispatch service.
    #[must_use]
    pub const fn new(
        catalog: Arc<ServerCatalog>,
        registry: Arc<R>,
        cache: Arc<ToolCache<R, C>>,
        timeouts: GatewayTimeouts,
    ) -> Self {
        Self {
            catalog,
            registry,
            cache,
            timeouts,
        }
    }

    /// Lists every configured server in name order, whether or not it
    /// connected.
    #[must_use]
    pub fn list_servers(&self) -> Vec<ServerSummary> {
        self.catalog
            .iter()
            .map(|server| {
                let cached = self.cache.get(server.name().as_str());
                ServerSummary {
                    name: server.name().clone(),
                    description: server.description().to_owned(),
                    cached_tools: cached.as_ref().map(|entry| entry.len()),
                    tools_refreshed_at: cached.as_ref().map(|entry| entry.refreshed_at()),
                }
            })
            .collect()
    }

    /// Returns the tools of `server`, refreshing the cache once on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::ServerUnavailable`] when nothing is cached
    /// and the refresh fails, and [`DispatchError::NoToolsAvailable`] when
    /// the resolved list is empty.
    pub async fn list_tools(&self, server: &str) -> Result<Arc<CachedTools>, DispatchError> {
        if let Some(entry) = self.cache.get(server) {
            return non_empty(server, entry);
        }

        debug!(server, "tool cache miss");
        self.cache
            .refresh(server, self.timeouts.discovery)
            .await
            .map_err(|source| DispatchError::ServerUnavailable {
                server: server.to_owned(),
                source,
            })?;
        let entry = self
            .cache
            .get(server)
            .ok_or_else(|| DispatchError::NoToolsAvailable {
                server: server.to_owned(),
            })?;
        non_empty(server, entry)
    }

    /// Invokes `tool` on `server` and returns the backend's raw result.
    ///
    /// The tool cache is not consulted; the backend decides whether the tool
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownServer`] when `server` is not exactly
    /// a configured name or has no live connection and [`DispatchError::InvocationFailed`] when the call
    /// fails, reports an error, or outlives the invocation timeout.
    pub async fn invoke(
        &self,
        server: &str,
        tool: &str,
        arguments: ToolArguments,
    ) -> Result<Value, DispatchError> {
        let connection = self
            .catalog
            .get(server)
            .and_then(|descriptor| self.registry.lookup(descriptor.name()))
            .ok_or_else(|| DispatchError::UnknownServer {
                server: server.to_owned(),
            })?;

        let deadline = Deadline::after(self.timeouts.invocation);
        let result = bounded(
            deadline,
            BackendOperation::Invoke,
            connection.invoke(tool, arguments, deadline),
        )
        .await
        .map_err(|source| DispatchError::InvocationFailed {
            server: server.to_owned(),
            tool: tool.to_owned(),
            source,
        })?;
        debug!(server, tool, "tool call succeeded");
        Ok(result)
    }
}

fn non_empty(server: &str, entry: Arc<CachedTools>) -> Result<Arc<CachedTools>, DispatchError> {
    if entry.is_empty() {
        return Err(DispatchError::NoToolsAvailable {
            server: server.to_owned(),
        });
    }
    Ok(entry)
}
