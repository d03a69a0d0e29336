//! Port for a live connection to one backend MCP server.

use crate::gateway::domain::{
    Deadline, DeadlineExceeded, GatewayDomainError, ServerName, ToolArguments, ToolDescriptor,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for backend connection operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Opaque handle to a registered connection.
///
/// The gateway never looks inside; it only lists tools and invokes them.
pub type ConnectionHandle = Arc<dyn BackendConnection>;

/// Operations available on a connected backend server.
///
/// Both calls receive the caller's [`Deadline`]. Callers also race the
/// returned future against it, so an adapter may ignore the deadline and
/// rely on the future being dropped.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackendConnection: Send + Sync {
    /// Lists every tool the server exposes.
    async fn list_tools(&self, deadline: Deadline) -> BackendResult<Vec<ToolDescriptor>>;

    /// Invokes `tool` with `arguments` and returns the raw result.
    async fn invoke(
        &self,
        tool: &str,
        arguments: ToolArguments,
        deadline: Deadline,
    ) -> BackendResult<Value>;
}

/// Errors reported by backend connection adapters.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The connection could not be established.
    #[error("failed to connect to MCP server '{server}': {reason}")]
    Connect {
        /// Server name.
        server: ServerName,
        /// Adapter-supplied reason.
        reason: String,
    },

    /// The tool ran and the backend flagged its result as an error.
    #[error("tool '{tool}' reported an error: {detail}")]
    ToolReported {
        /// Tool name.
        tool: String,
        /// Result payload the backend returned.
        detail: Value,
    },

    /// The backend described a tool the gateway cannot represent.
    #[error("MCP server returned a malformed tool descriptor: {0}")]
    MalformedTool(#[from] GatewayDomainError),

    /// Transport or protocol failure.
    #[error("MCP protocol error: {0}")]
    Protocol(Arc<dyn std::error::Error + Send + Sync>),
}

impl BackendError {
    /// Builds a connection failure for `server`.
    pub fn connect(server: &ServerName, reason: impl ToString) -> Self {
        Self::Connect {
            server: server.clone(),
            reason: reason.to_string(),
        }
    }

    /// Wraps a transport or protocol error from the adapter.
    pub fn protocol(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Protocol(Arc::new(err))
    }
}

/// Failure of a deadline-bounded collaborator call.
///
/// Deadline expiry is kept apart from errors the collaborator reported.
#[derive(Debug, Clone, Error)]
pub enum BackendCallError {
    /// The call did not finish before its deadline.
    #[error(transparent)]
    DeadlineExceeded(#[from] DeadlineExceeded),

    /// The collaborator reported a failure.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl BackendCallError {
    /// Returns whether the call was abandoned at its deadline.
    #[must_use]
    pub const fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded(_))
    }
}
