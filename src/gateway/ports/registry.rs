//! Port for the registry that owns live backend connections.

use super::{BackendResult, ConnectionHandle};
use crate::gateway::domain::{ConnectionDescriptor, Deadline, ServerName};
use async_trait::async_trait;

/// Connection registry contract.
///
/// Implementations must be safe to share across request tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionRegistry: Send + Sync + 'static {
    /// Connects every descriptor and returns one outcome per descriptor.
    ///
    /// A failed connection is reported in its outcome; it never prevents the
    /// other descriptors from being registered.
    async fn register(
        &self,
        descriptors: Vec<ConnectionDescriptor>,
        deadline: Deadline,
    ) -> Vec<RegistrationOutcome>;

    /// Returns the handle for a registered server.
    fn lookup(&self, name: &ServerName) -> Option<ConnectionHandle>;
}

/// Result of registering one server.
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    server: ServerName,
    result: BackendResult<()>,
}

impl RegistrationOutcome {
    /// Records a successful registration.
    #[must_use]
    pub const fn connected(server: ServerName) -> Self {
        Self {
            server,
            result: Ok(()),
        }
    }

    /// Records a failed registration.
    #[must_use]
    pub const fn failed(server: ServerName, error: super::BackendError) -> Self {
        Self {
            server,
            result: Err(error),
        }
    }

    /// Returns the server the outcome belongs to.
    #[must_use]
    pub const fn server(&self) -> &ServerName {
        &self.server
    }

    /// Returns the registration result.
    #[must_use]
    pub const fn result(&self) -> &BackendResult<()> {
        &self.result
    }

    /// Returns whether the server connected.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.result.is_ok()
    }
}
