//! Shared fixtures for gateway integration tests.

use std::sync::Arc;

use mcp_gateway::gateway::{
    adapters::InMemoryConnectionRegistry,
    domain::{GatewayTimeouts, ServerCatalog, ServerDescriptor, ServerName, ToolDescriptor},
    services::{BringUpOrchestrator, BringUpReport, DispatchService, ToolCache},
};
use mockable::DefaultClock;
use serde_json::{Map, json};

/// Dispatch service wired to the in-memory registry.
pub type TestDispatch = DispatchService<InMemoryConnectionRegistry, DefaultClock>;

/// Tool cache wired to the in-memory registry.
pub type TestCache = ToolCache<InMemoryConnectionRegistry, DefaultClock>;

/// A catalog of stdio servers plus the components built over it.
pub struct GatewayHarness {
    pub registry: Arc<InMemoryConnectionRegistry>,
    pub catalog: Arc<ServerCatalog>,
    pub cache: Arc<TestCache>,
    pub timeouts: GatewayTimeouts,
}

impl GatewayHarness {
    /// Builds a harness with one stdio server per name.
    pub fn with_servers(names: &[&str]) -> Self {
        let descriptors = names
            .iter()
            .map(|name| ServerDescriptor::stdio(server_name(name), format!("mcp-{name}")));
        Self::with_descriptors(descriptors)
    }

    /// Builds a harness over arbitrary descriptors.
    pub fn with_descriptors(descriptors: impl IntoIterator<Item = ServerDescriptor>) -> Self {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let catalog = Arc::new(ServerCatalog::new(descriptors).expect("unique server names"));
        let cache = Arc::new(ToolCache::new(
            Arc::clone(&registry),
            Arc::new(DefaultClock),
            catalog.names().cloned(),
        ));
        Self {
            registry,
            catalog,
            cache,
            timeouts: GatewayTimeouts::default(),
        }
    }

    /// Scripts `server` to expose `tools`.
    pub fn offer_tools(&self, server: &str, tools: &[&str]) {
        self.registry
            .set_tool_catalog(&server_name(server), tools.iter().map(|name| tool(name)).collect())
            .expect("catalog setup should succeed");
    }

    /// Scripts `server` to fail at connection time.
    pub fn fail_to_start(&self, server: &str) {
        self.registry
            .fail_connection(&server_name(server), "executable not found")
            .expect("failure setup should succeed");
    }

    /// Returns a bring-up orchestrator over the harness components.
    pub fn orchestrator(&self) -> BringUpOrchestrator<InMemoryConnectionRegistry, DefaultClock> {
        BringUpOrchestrator::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.cache),
            self.timeouts,
        )
    }

    /// Runs bring-up, failing the test on a fatal error.
    pub async fn bring_up(&self) -> BringUpReport {
        self.orchestrator()
            .bring_up(&self.catalog)
            .await
            .expect("bring-up should succeed")
    }

    /// Returns a dispatch service over the harness components.
    pub fn dispatch(&self) -> TestDispatch {
        DispatchService::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.registry),
            Arc::clone(&self.cache),
            self.timeouts,
        )
    }
}

pub fn server_name(value: &str) -> ServerName {
    ServerName::new(value).expect("valid server name")
}

pub fn tool(name: &str) -> ToolDescriptor {
    let mut metadata = Map::new();
    metadata.insert("description".to_owned(), json!(format!("Tool {name}")));
    metadata.insert("inputSchema".to_owned(), json!({"type": "object"}));
    ToolDescriptor::new(name, metadata).expect("valid tool descriptor")
}

pub fn tool_names(tools: &[ToolDescriptor]) -> Vec<&str> {
    tools.iter().map(ToolDescriptor::name).collect()
}
