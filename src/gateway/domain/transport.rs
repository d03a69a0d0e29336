//! Transport kinds and connection descriptors for backend MCP servers.

use super::{GatewayDomainError, ServerName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Transport kind declared for a configured server.
///
/// Only `stdio` is connectable today. Any other value is kept verbatim so
/// bring-up can skip the server and report what was configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransportKind {
    /// MCP over a child process's stdin/stdout.
    Stdio,
    /// A transport kind this gateway does not connect to yet.
    Unsupported(String),
}

impl TransportKind {
    /// Returns the canonical configuration representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stdio => "stdio",
            Self::Unsupported(raw) => raw,
        }
    }
}

impl From<String> for TransportKind {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("stdio") {
            Self::Stdio
        } else {
            Self::Unsupported(value)
        }
    }
}

impl From<&str> for TransportKind {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<TransportKind> for String {
    fn from(value: TransportKind) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Launch settings for an MCP server hosted over STDIO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdioTransportConfig {
    command: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
}

impl StdioTransportConfig {
    /// Creates a new STDIO transport configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayDomainError::EmptyStdioCommand`] when `command` is
    /// empty after trimming.
    pub fn new(
        server: &ServerName,
        command: impl Into<String>,
    ) -> Result<Self, GatewayDomainError> {
        let normalized_command = command.into().trim().to_owned();
        if normalized_command.is_empty() {
            return Err(GatewayDomainError::EmptyStdioCommand(
                server.as_str().to_owned(),
            ));
        }

        Ok(Self {
            command: normalized_command,
            args: Vec::new(),
            env: BTreeMap::new(),
        })
    }

    /// Replaces command-line arguments.
    #[must_use]
    pub fn with_args(mut self, values: impl IntoIterator<Item = String>) -> Self {
        self.args = values.into_iter().collect();
        self
    }

    /// Replaces process environment variables.
    #[must_use]
    pub fn with_env(mut self, values: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env = values.into_iter().collect();
        self
    }

    /// Returns the executable command.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns command-line arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns environment variables passed to the child process.
    #[must_use]
    pub const fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }
}

/// Everything the connection registry needs to bring one server online.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    name: ServerName,
    transport: StdioTransportConfig,
}

impl ConnectionDescriptor {
    /// Creates a descriptor for a STDIO server.
    #[must_use]
    pub const fn stdio(name: ServerName, transport: StdioTransportConfig) -> Self {
        Self { name, transport }
    }

    /// Returns the server name the connection is registered under.
    #[must_use]
    pub const fn name(&self) -> &ServerName {
        &self.name
    }

    /// Returns the STDIO launch settings.
    #[must_use]
    pub const fn transport(&self) -> &StdioTransportConfig {
        &self.transport
    }
}
