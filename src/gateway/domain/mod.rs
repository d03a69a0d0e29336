//! Domain model for the gateway.
//!
//! Server identity and configuration, connection descriptors, tool metadata,
//! and call deadlines. Infrastructure concerns remain outside this boundary.

mod deadline;
mod error;
mod ids;
mod server;
mod tool;
mod transport;

pub use deadline::{BackendOperation, Deadline, DeadlineExceeded, GatewayTimeouts};
pub use error::GatewayDomainError;
pub use ids::ServerName;
pub use server::{ServerCatalog, ServerDescriptor};
pub use tool::{ToolArguments, ToolDescriptor};
pub use transport::{ConnectionDescriptor, StdioTransportConfig, TransportKind};
