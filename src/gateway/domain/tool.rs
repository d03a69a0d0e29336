//! Tool descriptors reported by backend servers.

use super::GatewayDomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Arguments for a tool invocation: an open JSON object passed through to
/// the backend without schema validation.
pub type ToolArguments = Map<String, Value>;

/// Metadata for a tool exposed by a backend server.
///
/// Only the name is interpreted by the gateway. Everything else the backend
/// reported (description, input schema, annotations) is carried through
/// untouched and serialised alongside the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    name: String,
    #[serde(flatten)]
    metadata: Map<String, Value>,
}

impl ToolDescriptor {
    /// Creates a tool descriptor.
    ///
    /// A `name` key inside `metadata` is discarded in favour of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayDomainError::EmptyToolName`] when the name is empty
    /// after trimming.
    pub fn new(
        name: impl Into<String>,
        mut metadata: Map<String, Value>,
    ) -> Result<Self, GatewayDomainError> {
        let normalized_name = name.into().trim().to_owned();
        if normalized_name.is_empty() {
            return Err(GatewayDomainError::EmptyToolName);
        }
        metadata.remove("name");

        Ok(Self {
            name: normalized_name,
            metadata,
        })
    }

    /// Builds a descriptor from a backend's JSON tool object.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayDomainError::EmptyToolName`] when the object has no
    /// string `name`, or is not an object at all.
    pub fn from_json(value: Value) -> Result<Self, GatewayDomainError> {
        let Value::Object(mut object) = value else {
            return Err(GatewayDomainError::EmptyToolName);
        };
        let name = match object.remove("name") {
            Some(Value::String(name)) => name,
            _ => return Err(GatewayDomainError::EmptyToolName),
        };
        Self::new(name, object)
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tool description, when the backend supplied one.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.metadata.get("description").and_then(Value::as_str)
    }

    /// Returns the backend-supplied metadata other than the name.
    #[must_use]
    pub const fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }
}
