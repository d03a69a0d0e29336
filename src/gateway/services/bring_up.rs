//! Startup bring-up of configured backend servers.

use super::tool_cache::{ToolCache, ToolCacheError};
use crate::gateway::{
    domain::{
        BackendOperation, ConnectionDescriptor, Deadline, GatewayDomainError, GatewayTimeouts,
        ServerCatalog, ServerName,
    },
    ports::{ConnectionRegistry, RegistrationOutcome},
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Fatal bring-up failures. The gateway must not serve after one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BringUpError {
    /// The registration batch did not finish in time and was cancelled.
    #[error("registering MCP servers did not complete within {timeout:?}")]
    RegistrationTimeout {
        /// Registration budget that elapsed.
        timeout: Duration,
    },

    /// The registration task panicked or was cancelled.
    #[error("MCP server registration task failed: {0}")]
    RegistrationTaskFailed(String),
}

/// A configured server that was not handed to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedServer {
    /// Server name.
    pub server: ServerName,
    /// Why no connection descriptor could be built.
    pub reason: GatewayDomainError,
}

/// Result of the initial tool discovery for one server.
#[derive(Debug, Clone)]
pub struct DiscoveryOutcome {
    /// Server name.
    pub server: ServerName,
    /// Number of tools cached, or why discovery failed.
    pub result: Result<usize, ToolCacheError>,
}

/// Everything that happened during bring-up, per server.
#[derive(Debug, Clone, Default)]
pub struct BringUpReport {
    /// Servers skipped before registration.
    pub skipped: Vec<SkippedServer>,
    /// One outcome per submitted connection descriptor.
    pub registrations: Vec<RegistrationOutcome>,
    /// One outcome per configured server, ordered by name.
    pub discoveries: Vec<DiscoveryOutcome>,
}

impl BringUpReport {
    /// Returns the servers that connected successfully.
    pub fn connected(&self) -> impl Iterator<Item = &ServerName> {
        self.registrations
            .iter()
            .filter(|outcome| outcome.is_connected())
            .map(RegistrationOutcome::server)
    }

    /// Returns the servers whose tools were cached.
    pub fn discovered(&self) -> impl Iterator<Item = &ServerName> {
        self.discoveries
            .iter()
            .filter(|outcome| outcome.result.is_ok())
            .map(|outcome| &outcome.server)
    }
}

/// Connects every configured server and primes the tool cache.
pub struct BringUpOrchestrator<R, C>
where
    R: ConnectionRegistry,
    C: Clock + Send + Sync + 'static,
{
    registry: Arc<R>,
    cache: Arc<ToolCache<R, C>>,
    timeouts: GatewayTimeouts,
}

impl<R, C> BringUpOrchestrator<R, C>
where
    R: ConnectionRegistry,
    C: Clock + Send + Sync + 'static,
{
    /// Creates an orchestrator that fills `cache` through `registry`.
    #[must_use]
    pub const fn new(
        registry: Arc<R>,
        cache: Arc<ToolCache<R, C>>,
        timeouts: GatewayTimeouts,
    ) -> Self {
        Self {
            registry,
            cache,
            timeouts,
        }
    }

    /// Registers every server in `catalog`, then discovers each one's tools.
    ///
    /// Per-server failures are logged and recorded in the report. Discovery
    /// is attempted for every configured name, each under its own deadline.
    ///
    /// # Errors
    ///
    /// Returns [`BringUpError::RegistrationTimeout`] when the registration
    /// batch outlives its deadline, and
    /// [`BringUpError::RegistrationTaskFailed`] when the batch task dies.
    pub async fn bring_up(&self, catalog: &ServerCatalog) -> Result<BringUpReport, BringUpError> {
        let mut report = BringUpReport::default();
        let mut descriptors = Vec::with_capacity(catalog.len());
        for server in catalog.iter() {
            match server.connection_descriptor() {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(reason) => {
                    warn!(server = %server.name(), error = %reason, "skipping MCP server");
                    report.skipped.push(SkippedServer {
                        server: server.name().clone(),
                        reason,
                    });
                }
            }
        }

        if descriptors.is_empty() {
            info!(skipped = report.skipped.len(), "no MCP servers to register");
            return Ok(report);
        }

        report.registrations = self.register_all(descriptors).await?;
        report.discoveries = self.discover_all(catalog).await;
        info!(
            configured = catalog.len(),
            connected = report.connected().count(),
            discovered = report.discovered().count(),
            "MCP gateway bring-up finished"
        );
        Ok(report)
    }

    async fn register_all(
        &self,
        descriptors: Vec<ConnectionDescriptor>,
    ) -> Result<Vec<RegistrationOutcome>, BringUpError> {
        let deadline = Deadline::after(self.timeouts.registration);
        let registry = Arc::clone(&self.registry);
        let submitted = descriptors.len();
        let mut task =
            tokio::spawn(async move { registry.register(descriptors, deadline).await });
        info!(servers = submitted, "registering MCP servers");

        let outcomes = match deadline.race(BackendOperation::Register, &mut task).await {
            Ok(Ok(outcomes)) => outcomes,
            Ok(Err(join_error)) => {
                return Err(BringUpError::RegistrationTaskFailed(join_error.to_string()));
            }
            Err(expired) => {
                task.abort();
                return Err(BringUpError::RegistrationTimeout {
                    timeout: expired.timeout,
                });
            }
        };

        for outcome in &outcomes {
            match outcome.result() {
                Ok(()) => info!(server = %outcome.server(), "MCP server connected"),
                Err(err) => warn!(
                    server = %outcome.server(),
                    error = %err,
                    "failed to register MCP server"
                ),
            }
        }
        Ok(outcomes)
    }

    async fn discover_all(&self, catalog: &ServerCatalog) -> Vec<DiscoveryOutcome> {
        let mut pending = JoinSet::new();
        for server in catalog.names() {
            let cache = Arc::clone(&self.cache);
            let name = server.clone();
            let timeout = self.timeouts.discovery;
            pending.spawn(async move {
                let result = cache.refresh(name.as_str(), timeout).await;
                DiscoveryOutcome { server: name, result }
            });
        }

        let mut discoveries = Vec::with_capacity(pending.len());
        while let Some(joined) = pending.join_next().await {
            match joined {
                Ok(outcome) => {
                    match &outcome.result {
                        Ok(count) => {
                            info!(server = %outcome.server, tools = count, "cached MCP server tools");
                        }
                        Err(err) => {
                            warn!(server = %outcome.server, error = %err, "tool discovery failed");
                        }
                    }
                    discoveries.push(outcome);
                }
                Err(err) => warn!(error = %err, "tool discovery task failed"),
            }
        }
        discoveries.sort_by(|left, right| left.server.cmp(&right.server));
        discoveries
    }
}
