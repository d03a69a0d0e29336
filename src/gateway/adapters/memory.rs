//! In-memory connection registry for gateway tests.

use crate::gateway::{
    domain::{
        BackendOperation, ConnectionDescriptor, Deadline, ServerName, ToolArguments,
        ToolDescriptor,
    },
    ports::{
        BackendConnection, BackendError, BackendResult, ConnectionHandle, ConnectionRegistry,
        RegistrationOutcome,
    },
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};
use std::time::Duration;

/// In-memory connection registry with scriptable backends.
///
/// No processes are spawned. Each server's behaviour (connection failure,
/// tool catalog, latency, tool errors) is scripted up front or changed while
/// connected. Tools that have no scripted error echo their arguments back.
///
/// Every call is appended to an observation log until it is drained with
/// [`Self::take_observed_calls`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryConnectionRegistry {
    state: Arc<RwLock<InMemoryRegistryState>>,
}

#[derive(Debug, Default)]
struct InMemoryRegistryState {
    scripts: HashMap<ServerName, BackendScript>,
    connected: HashMap<ServerName, Arc<InMemoryConnection>>,
    observed_calls: Vec<ObservedCall>,
}

#[derive(Debug, Clone, Default)]
struct BackendScript {
    connect_failure: Option<String>,
    discovery_failure: Option<String>,
    tools: Vec<ToolDescriptor>,
    tool_errors: HashMap<String, Value>,
    latency: HashMap<BackendOperation, Duration>,
}

/// A collaborator call seen by the in-memory registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedCall {
    /// Server the call targeted.
    pub server: ServerName,
    /// Operation performed.
    pub operation: BackendOperation,
    /// Deadline budget the caller passed.
    pub budget: Duration,
}

fn lock_error(err: impl ToString) -> BackendError {
    BackendError::protocol(std::io::Error::other(err.to_string()))
}

impl InMemoryConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn update_script(
        &self,
        server: &ServerName,
        update: impl FnOnce(&mut BackendScript),
    ) -> BackendResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        update(state.scripts.entry(server.clone()).or_default());
        Ok(())
    }

    /// Replaces the tool catalog a server reports.
    ///
    /// Takes effect for connected servers on their next discovery call.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Protocol`] when lock acquisition fails.
    pub fn set_tool_catalog(
        &self,
        server: &ServerName,
        tools: Vec<ToolDescriptor>,
    ) -> BackendResult<()> {
        self.update_script(server, |script| script.tools = tools)
    }

    /// Makes registration of `server` fail with `reason`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Protocol`] when lock acquisition fails.
    pub fn fail_connection(&self, server: &ServerName, reason: impl Into<String>) -> BackendResult<()> {
        let reason = reason.into();
        self.update_script(server, |script| script.connect_failure = Some(reason))
    }

    /// Makes tool discovery on `server` fail with `reason`, or succeed again
    /// when `reason` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Protocol`] when lock acquisition fails.
    pub fn fail_discovery(&self, server: &ServerName, reason: Option<String>) -> BackendResult<()> {
        self.update_script(server, |script| script.discovery_failure = reason)
    }

    /// Makes `tool` on `server` return a backend-reported error.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Protocol`] when lock acquisition fails.
    pub fn set_tool_error(
        &self,
        server: &ServerName,
        tool: impl Into<String>,
        detail: Value,
    ) -> BackendResult<()> {
        let tool_name = tool.into();
        self.update_script(server, |script| {
            script.tool_errors.insert(tool_name, detail);
        })
    }

    /// Delays every `operation` on `server` by `latency`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Protocol`] when lock acquisition fails.
    pub fn set_latency(
        &self,
        server: &ServerName,
        operation: BackendOperation,
        latency: Duration,
    ) -> BackendResult<()> {
        self.update_script(server, |script| {
            script.latency.insert(operation, latency);
        })
    }

    /// Returns every call observed so far, in arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Protocol`] when lock acquisition fails.
    pub fn observed_calls(&self) -> BackendResult<Vec<ObservedCall>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.observed_calls.clone())
    }

    /// Returns every call observed so far and clears the log.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Protocol`] when lock acquisition fails.
    pub fn take_observed_calls(&self) -> BackendResult<Vec<ObservedCall>> {
        let mut state = self.state.write().map_err(lock_error)?;
        Ok(std::mem::take(&mut state.observed_calls))
    }
}

fn observe(
    state: &RwLock<InMemoryRegistryState>,
    server: &ServerName,
    operation: BackendOperation,
    deadline: Deadline,
) -> BackendResult<BackendScript> {
    let mut guard = state.write().map_err(lock_error)?;
    guard.observed_calls.push(ObservedCall {
        server: server.clone(),
        operation,
        budget: deadline.budget(),
    });
    Ok(guard.scripts.get(server).cloned().unwrap_or_default())
}

async fn simulate_latency(script: &BackendScript, operation: BackendOperation) {
    if let Some(latency) = script.latency.get(&operation) {
        tokio::time::sleep(*latency).await;
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(
        &self,
        descriptors: Vec<ConnectionDescriptor>,
        deadline: Deadline,
    ) -> Vec<RegistrationOutcome> {
        let mut scripts = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            match observe(&self.state, descriptor.name(), BackendOperation::Register, deadline) {
                Ok(script) => scripts.push((descriptor.name().clone(), Ok(script))),
                Err(err) => scripts.push((descriptor.name().clone(), Err(err))),
            }
        }

        // Connections come up concurrently, so the batch takes as long as
        // its slowest member.
        let slowest = scripts
            .iter()
            .filter_map(|(_, script)| script.as_ref().ok())
            .filter_map(|script| script.latency.get(&BackendOperation::Register))
            .max()
            .copied();
        if let Some(latency) = slowest {
            tokio::time::sleep(latency).await;
        }

        let mut outcomes = Vec::with_capacity(scripts.len());
        for (server, script) in scripts {
            let outcome = match script {
                Err(err) => RegistrationOutcome::failed(server, err),
                Ok(BackendScript {
                    connect_failure: Some(reason),
                    ..
                }) => {
                    let error = BackendError::connect(&server, reason);
                    RegistrationOutcome::failed(server, error)
                }
                Ok(_) => match self.state.write() {
                    Ok(mut state) => {
                        let connection = Arc::new(InMemoryConnection {
                            name: server.clone(),
                            state: Arc::downgrade(&self.state),
                        });
                        state.connected.insert(server.clone(), connection);
                        RegistrationOutcome::connected(server)
                    }
                    Err(err) => RegistrationOutcome::failed(server, lock_error(err)),
                },
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    fn lookup(&self, name: &ServerName) -> Option<ConnectionHandle> {
        let state = self.state.read().ok()?;
        state
            .connected
            .get(name)
            .map(|connection| Arc::clone(connection) as ConnectionHandle)
    }
}

/// Connection handle issued by [`InMemoryConnectionRegistry`].
///
/// Holds the registry state weakly; once the registry is dropped every call
/// fails as if the server had gone away.
#[derive(Debug)]
struct InMemoryConnection {
    name: ServerName,
    state: Weak<RwLock<InMemoryRegistryState>>,
}

impl InMemoryConnection {
    fn observe(
        &self,
        operation: BackendOperation,
        deadline: Deadline,
    ) -> BackendResult<BackendScript> {
        let state = self.state.upgrade().ok_or_else(|| {
            BackendError::protocol(std::io::Error::other(format!(
                "MCP server '{}' is no longer registered",
                self.name
            )))
        })?;
        observe(&state, &self.name, operation, deadline)
    }
}

#[async_trait]
impl BackendConnection for InMemoryConnection {
    async fn list_tools(&self, deadline: Deadline) -> BackendResult<Vec<ToolDescriptor>> {
        let script = self.observe(BackendOperation::ListTools, deadline)?;
        simulate_latency(&script, BackendOperation::ListTools).await;

        if let Some(reason) = script.discovery_failure {
            return Err(BackendError::protocol(std::io::Error::other(reason)));
        }
        Ok(script.tools)
    }

    async fn invoke(
        &self,
        tool: &str,
        arguments: ToolArguments,
        deadline: Deadline,
    ) -> BackendResult<Value> {
        let script = self.observe(BackendOperation::Invoke, deadline)?;
        simulate_latency(&script, BackendOperation::Invoke).await;

        if let Some(detail) = script.tool_errors.get(tool) {
            return Err(BackendError::ToolReported {
                tool: tool.to_owned(),
                detail: detail.clone(),
            });
        }
        if !script.tools.iter().any(|known| known.name() == tool) {
            return Err(BackendError::ToolReported {
                tool: tool.to_owned(),
                detail: json!({"error": format!("unknown tool '{tool}'")}),
            });
        }
        Ok(Value::Object(arguments))
    }
}
