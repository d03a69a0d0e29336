//! Per-server cache of discovered tool metadata.
//!
//! Every configured server gets one slot when the cache is built. A slot
//! holds the last successful discovery result behind its own lock, so
//! readers of one server never contend with a refresh of another. Entries
//! are replaced whole; a reader sees the previous list or the next one,
//! never a mix.

use super::call::bounded;
use crate::gateway::{
    domain::{BackendOperation, Deadline, ServerName, ToolDescriptor},
    ports::{BackendCallError, BackendError, ConnectionRegistry},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

/// Tool list captured by one successful discovery call.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedTools {
    tools: Vec<ToolDescriptor>,
    refreshed_at: DateTime<Utc>,
}

impl CachedTools {
    /// Returns the tools in the order the backend listed them.
    #[must_use]
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Returns when the list was fetched.
    #[must_use]
    pub const fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at
    }

    /// Returns the number of cached tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns whether the backend reported no tools.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Errors returned by [`ToolCache::refresh`].
#[derive(Debug, Clone, Error)]
pub enum ToolCacheError {
    /// The server is not configured or has no live connection.
    #[error("MCP server '{0}' is not registered")]
    UnknownServer(String),

    /// Discovery failed or ran out of time.
    #[error("tool discovery failed for MCP server '{server}': {source}")]
    Discovery {
        /// Server whose discovery failed.
        server: ServerName,
        /// Underlying failure.
        source: BackendCallError,
    },
}

#[derive(Debug, Default)]
struct CacheSlot {
    entry: RwLock<Option<Arc<CachedTools>>>,
    refresh_gate: Mutex<()>,
}

impl CacheSlot {
    fn load(&self) -> Option<Arc<CachedTools>> {
        self.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, tools: CachedTools) {
        *self.entry.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(tools));
    }
}

/// Lazily populated tool metadata, keyed by server name.
pub struct ToolCache<R, C>
where
    R: ConnectionRegistry,
    C: Clock + Send + Sync,
{
    registry: Arc<R>,
    clock: Arc<C>,
    slots: HashMap<ServerName, CacheSlot>,
}

impl<R, C> ToolCache<R, C>
where
    R: ConnectionRegistry,
    C: Clock + Send + Sync,
{
    /// Creates an empty cache with one slot per server in `servers`.
    #[must_use]
    pub fn new(
        registry: Arc<R>,
        clock: Arc<C>,
        servers: impl IntoIterator<Item = ServerName>,
    ) -> Self {
        let slots = servers
            .into_iter()
            .map(|server| (server, CacheSlot::default()))
            .collect();
        Self {
            registry,
            clock,
            slots,
        }
    }

    /// Returns the cached tools for `server`, if discovery ever succeeded.
    #[must_use]
    pub fn get(&self, server: &str) -> Option<Arc<CachedTools>> {
        self.slots.get(server).and_then(CacheSlot::load)
    }

    /// Fetches the tool list for `server` and replaces its cache entry.
    ///
    /// Concurrent refreshes of the same server run one after another; the
    /// wait for the gate counts against `timeout`. Returns the number of
    /// tools cached.
    ///
    /// # Errors
    ///
    /// Returns [`ToolCacheError::UnknownServer`] when the server has no slot
    /// or no registered connection, and [`ToolCacheError::Discovery`] when
    /// the backend fails or `timeout` elapses. On error the existing entry is
    /// left as it was.
    pub async fn refresh(&self, server: &str, timeout: Duration) -> Result<usize, ToolCacheError> {
        let (name, slot) = self
            .slots
            .get_key_value(server)
            .ok_or_else(|| ToolCacheError::UnknownServer(server.to_owned()))?;
        let connection = self
            .registry
            .lookup(name)
            .ok_or_else(|| ToolCacheError::UnknownServer(server.to_owned()))?;

        let deadline = Deadline::after(timeout);
        let discovery = async {
            let _gate = slot.refresh_gate.lock().await;
            let tools = connection.list_tools(deadline).await?;
            let count = tools.len();
            slot.store(CachedTools {
                tools,
                refreshed_at: self.clock.utc(),
            });
            Ok::<_, BackendError>(count)
        };
        let count = bounded(deadline, BackendOperation::ListTools, discovery)
            .await
            .map_err(|source| ToolCacheError::Discovery {
                server: name.clone(),
                source,
            })?;

        debug!(server = %name, tools = count, "refreshed tool cache");
        Ok(count)
    }
}
