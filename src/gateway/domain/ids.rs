//! Validated-name type for MCP servers.

use super::GatewayDomainError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Maximum length for an MCP server name.
const MAX_SERVER_NAME_LENGTH: usize = 100;

/// Validated MCP server name.
///
/// Names key every gateway structure and appear verbatim as a URL path
/// segment, so case is preserved and `/` is rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerName(String);

impl ServerName {
    /// Creates a validated MCP server name.
    ///
    /// The input is trimmed. Whitespace, control characters, and `/` are
    /// rejected inside the name.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayDomainError`] when validation fails.
    pub fn new(value: impl Into<String>) -> Result<Self, GatewayDomainError> {
        let normalized = value.into().trim().to_owned();

        if normalized.is_empty() {
            return Err(GatewayDomainError::EmptyServerName);
        }

        let is_valid = normalized.chars().all(|character| {
            !character.is_whitespace() && !character.is_control() && character != '/'
        });
        if !is_valid {
            return Err(GatewayDomainError::InvalidServerName(normalized));
        }

        if normalized.chars().count() > MAX_SERVER_NAME_LENGTH {
            return Err(GatewayDomainError::ServerNameTooLong(normalized));
        }

        Ok(Self(normalized))
    }

    /// Returns the MCP server name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ServerName {
    type Error = GatewayDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServerName> for String {
    fn from(value: ServerName) -> Self {
        value.0
    }
}

impl AsRef<str> for ServerName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for ServerName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ServerName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
