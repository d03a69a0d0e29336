//! Port contracts for backend connections.

mod connection;
mod registry;

#[cfg(test)]
pub(crate) use connection::MockBackendConnection;
pub use connection::{
    BackendCallError, BackendConnection, BackendError, BackendResult, ConnectionHandle,
};
#[cfg(test)]
pub(crate) use registry::MockConnectionRegistry;
pub use registry::{ConnectionRegistry, RegistrationOutcome};
