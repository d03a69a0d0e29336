//! Configured MCP server descriptors and the catalog that holds them.

use super::{
    ConnectionDescriptor, GatewayDomainError, ServerName, StdioTransportConfig, TransportKind,
};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// One configured backend server. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDescriptor {
    name: ServerName,
    transport_kind: TransportKind,
    command: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    description: String,
}

impl ServerDescriptor {
    /// Creates a descriptor with no arguments, environment, or description.
    #[must_use]
    pub fn new(
        name: ServerName,
        transport_kind: TransportKind,
        command: impl Into<String>,
    ) -> Self {
        Self {
            name,
            transport_kind,
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            description: String::new(),
        }
    }

    /// Creates a `stdio` descriptor.
    #[must_use]
    pub fn stdio(name: ServerName, command: impl Into<String>) -> Self {
        Self::new(name, TransportKind::Stdio, command)
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

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the server name.
    #[must_use]
    pub const fn name(&self) -> &ServerName {
        &self.name
    }

    /// Returns the declared transport kind.
    #[must_use]
    pub const fn transport_kind(&self) -> &TransportKind {
        &self.transport_kind
    }

    /// Returns the launch command.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns command-line arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns environment variables.
    #[must_use]
    pub const fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Builds the connection descriptor handed to the connection registry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayDomainError::UnsupportedTransport`] for non-`stdio`
    /// servers and [`GatewayDomainError::EmptyStdioCommand`] when the
    /// command is blank.
    pub fn connection_descriptor(&self) -> Result<ConnectionDescriptor, GatewayDomainError> {
        match &self.transport_kind {
            TransportKind::Stdio => {
                let transport = StdioTransportConfig::new(&self.name, self.command.as_str())?
                    .with_args(self.args.iter().cloned())
                    .with_env(
                        self.env
                            .iter()
                            .map(|(key, value)| (key.clone(), value.clone())),
                    );
                Ok(ConnectionDescriptor::stdio(self.name.clone(), transport))
            }
            TransportKind::Unsupported(kind) => Err(GatewayDomainError::UnsupportedTransport {
                server: self.name.as_str().to_owned(),
                kind: kind.clone(),
            }),
        }
    }
}

/// Validated set of configured servers, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerCatalog {
    servers: BTreeMap<ServerName, ServerDescriptor>,
}

impl ServerCatalog {
    /// Builds a catalog from descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayDomainError::DuplicateServerName`] when two
    /// descriptors share a name.
    pub fn new(
        descriptors: impl IntoIterator<Item = ServerDescriptor>,
    ) -> Result<Self, GatewayDomainError> {
        let mut servers = BTreeMap::new();
        for descriptor in descriptors {
            match servers.entry(descriptor.name().clone()) {
                btree_map::Entry::Occupied(entry) => {
                    let name: &ServerName = entry.key();
                    return Err(GatewayDomainError::DuplicateServerName(
                        name.as_str().to_owned(),
                    ));
                }
                btree_map::Entry::Vacant(entry) => {
                    entry.insert(descriptor);
                }
            }
        }
        Ok(Self { servers })
    }

    /// Looks up a descriptor by raw name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ServerDescriptor> {
        self.servers.get(name)
    }

    /// Iterates descriptors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ServerDescriptor> {
        self.servers.values()
    }

    /// Iterates server names in order.
    pub fn names(&self) -> impl Iterator<Item = &ServerName> {
        self.servers.keys()
    }

    /// Returns the number of configured servers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Returns whether no servers are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
