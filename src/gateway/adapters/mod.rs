//! Adapter implementations of the gateway connection ports.

mod memory;
mod stdio;

pub use memory::{InMemoryConnectionRegistry, ObservedCall};
pub use stdio::StdioConnectionRegistry;
