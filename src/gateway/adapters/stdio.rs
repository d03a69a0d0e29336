//! Connection registry backed by `rmcp` stdio child processes.

use crate::gateway::{
    domain::{ConnectionDescriptor, Deadline, ServerName, ToolArguments, ToolDescriptor},
    ports::{
        BackendConnection, BackendError, BackendResult, ConnectionHandle, ConnectionRegistry,
        RegistrationOutcome,
    },
};
use async_trait::async_trait;
use rmcp::{
    ServiceExt,
    model::CallToolRequestParam,
    service::{Peer, RoleClient, RunningService},
    transport::TokioChildProcess,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::{process::Command, task::JoinSet};
use tracing::{debug, warn};

type McpClient = RunningService<RoleClient, ()>;

/// Connection registry that launches each server as a child process and
/// speaks MCP to it over stdin/stdout.
///
/// Child processes live as long as the registry, or until
/// [`StdioConnectionRegistry::shutdown`] is called.
#[derive(Default)]
pub struct StdioConnectionRegistry {
    connections: RwLock<HashMap<ServerName, Arc<StdioConnection>>>,
    clients: Mutex<Vec<McpClient>>,
}

impl StdioConnectionRegistry {
    /// Creates a registry with no connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels every client session and waits for it to finish.
    pub async fn shutdown(&self) {
        let clients = std::mem::take(
            &mut *self
                .clients
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        for client in clients {
            if let Err(err) = client.cancel().await {
                warn!(error = %err, "MCP client did not shut down cleanly");
            }
        }
    }

    fn insert(&self, server: ServerName, client: McpClient) {
        let connection = Arc::new(StdioConnection {
            peer: client.peer().clone(),
        });
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(server, connection);
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(client);
    }
}

async fn connect(descriptor: &ConnectionDescriptor) -> BackendResult<McpClient> {
    let transport_config = descriptor.transport();
    let mut command = Command::new(transport_config.command());
    command
        .args(transport_config.args())
        .envs(transport_config.env());

    let transport = TokioChildProcess::new(command)
        .map_err(|err| BackendError::connect(descriptor.name(), err))?;
    ().serve(transport)
        .await
        .map_err(|err| BackendError::connect(descriptor.name(), err))
}

fn protocol_error(err: impl ToString) -> BackendError {
    BackendError::protocol(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ConnectionRegistry for StdioConnectionRegistry {
    /// Connects all descriptors concurrently.
    ///
    /// The deadline is enforced by the caller, which aborts this future on
    /// expiry; clients that connected before then stay registered.
    async fn register(
        &self,
        descriptors: Vec<ConnectionDescriptor>,
        _deadline: Deadline,
    ) -> Vec<RegistrationOutcome> {
        let mut pending = JoinSet::new();
        let mut servers = HashMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let server = descriptor.name().clone();
            let task = pending.spawn(async move { connect(&descriptor).await });
            servers.insert(task.id(), server);
        }

        let mut outcomes = Vec::with_capacity(servers.len());
        while let Some(joined) = pending.join_next_with_id().await {
            let (id, result) = match joined {
                Ok((id, result)) => (id, result),
                Err(err) => (err.id(), Err(protocol_error(&err))),
            };
            let Some(server) = servers.remove(&id) else {
                continue;
            };
            match result {
                Ok(client) => {
                    debug!(server = %server, "MCP client session established");
                    self.insert(server.clone(), client);
                    outcomes.push(RegistrationOutcome::connected(server));
                }
                Err(err) => outcomes.push(RegistrationOutcome::failed(server, err)),
            }
        }
        outcomes
    }

    fn lookup(&self, name: &ServerName) -> Option<ConnectionHandle> {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|connection| Arc::clone(connection) as ConnectionHandle)
    }
}

/// A connected MCP client session.
struct StdioConnection {
    peer: Peer<RoleClient>,
}

#[async_trait]
impl BackendConnection for StdioConnection {
    async fn list_tools(&self, _deadline: Deadline) -> BackendResult<Vec<ToolDescriptor>> {
        let tools = self.peer.list_all_tools().await.map_err(protocol_error)?;
        tools
            .into_iter()
            .map(|tool| {
                let value = serde_json::to_value(&tool).map_err(BackendError::protocol)?;
                Ok(ToolDescriptor::from_json(value)?)
            })
            .collect()
    }

    async fn invoke(
        &self,
        tool: &str,
        arguments: ToolArguments,
        _deadline: Deadline,
    ) -> BackendResult<Value> {
        let request = CallToolRequestParam {
            name: tool.to_owned().into(),
            arguments: Some(arguments),
        };
        let result = self.peer.call_tool(request).await.map_err(protocol_error)?;
        let reported_error = result.is_error.unwrap_or(false);
        let payload = serde_json::to_value(&result).map_err(BackendError::protocol)?;
        if reported_error {
            return Err(BackendError::ToolReported {
                tool: tool.to_owned(),
                detail: payload,
            });
        }
        Ok(payload)
    }
}
