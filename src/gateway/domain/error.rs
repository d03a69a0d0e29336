//! Error types for gateway domain validation.

use thiserror::Error;

/// Errors returned while constructing gateway domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayDomainError {
    /// The server name is empty after trimming.
    #[error("MCP server name must not be empty")]
    EmptyServerName,

    /// The server name contains whitespace, control characters, or `/`.
    #[error("MCP server name '{0}' contains characters that cannot appear in a URL path segment")]
    InvalidServerName(String),

    /// Two configured entries resolve to the same server name.
    #[error("duplicate MCP server name: {0}")]
    DuplicateServerName(String),

    /// The server name exceeds the 100-character limit.
    #[error("MCP server name exceeds 100 character limit: {0}")]
    ServerNameTooLong(String),

    /// The STDIO command is empty.
    #[error("STDIO command for MCP server '{0}' must not be empty")]
    EmptyStdioCommand(String),

    /// The server uses a transport the gateway cannot connect to.
    #[error("MCP server '{server}' uses unsupported transport type '{kind}'")]
    UnsupportedTransport {
        /// Server name.
        server: String,
        /// Transport type as written in configuration.
        kind: String,
    },

    /// A tool descriptor has no name.
    #[error("tool name must not be empty")]
    EmptyToolName,
}
