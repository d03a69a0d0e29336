//! Server configuration file loading.
//!
//! The file is JSON with a single `mcpServers` object keyed by server name:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "files": {
//!       "description": "Local file access",
//!       "type": "stdio",
//!       "command": "npx",
//!       "args": ["-y", "@modelcontextprotocol/server-filesystem", "/srv"],
//!       "env": {"LOG_LEVEL": "warn"}
//!     }
//!   }
//! }
//! ```
//!
//! Every entry field is optional. Transport support is not checked here;
//! unsupported entries are skipped during bring-up.

use crate::gateway::domain::{GatewayDomainError, ServerCatalog, ServerDescriptor, ServerName};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "mcp-servers-config.json";

/// Errors raised while loading the server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The path does not name a file.
    #[error("configuration path '{0}' has no file name")]
    MissingFileName(Utf8PathBuf),

    /// The file could not be read.
    #[error("failed to read configuration file '{path}': {source}")]
    Read {
        /// Path that was read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The contents are not valid configuration JSON.
    #[error("failed to parse MCP server configuration: {0}")]
    Parse(#[source] serde_json::Error),

    /// A server entry failed validation.
    #[error("invalid MCP server configuration: {0}")]
    InvalidServer(#[from] GatewayDomainError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(default)]
    mcp_servers: BTreeMap<String, ServerEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerEntry {
    description: String,
    #[serde(rename = "type")]
    kind: String,
    command: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
}

impl ServerEntry {
    fn into_descriptor(self, name: ServerName) -> ServerDescriptor {
        ServerDescriptor::new(name, self.kind.as_str().into(), self.command)
            .with_args(self.args)
            .with_env(self.env)
            .with_description(self.description)
    }
}

/// Reads and validates the configuration file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read or parsed, or when
/// a server name is invalid or duplicated.
pub fn load_catalog(path: &Utf8Path) -> Result<ServerCatalog, ConfigError> {
    info!(path = %path, "reading MCP server configuration");
    let contents = read_config_file(path)?;
    debug!(path = %path, bytes = contents.len(), "read configuration file");
    parse_catalog(&contents)
}

/// Parses configuration JSON into a validated catalog.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed JSON and
/// [`ConfigError::InvalidServer`] for invalid or duplicated server names.
pub fn parse_catalog(contents: &str) -> Result<ServerCatalog, ConfigError> {
    let file: ConfigFile = serde_json::from_str(contents).map_err(ConfigError::Parse)?;

    let mut descriptors = Vec::with_capacity(file.mcp_servers.len());
    for (raw_name, entry) in file.mcp_servers {
        let name = ServerName::new(raw_name)?;
        debug!(
            server = %name,
            transport = %entry.kind,
            command = %entry.command,
            "configured MCP server"
        );
        descriptors.push(entry.into_descriptor(name));
    }
    let catalog = ServerCatalog::new(descriptors)?;
    info!(servers = catalog.len(), "loaded MCP server configuration");
    Ok(catalog)
}

fn read_config_file(path: &Utf8Path) -> Result<String, ConfigError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| ConfigError::MissingFileName(path.to_owned()))?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let read_error = |source| ConfigError::Read {
        path: path.to_owned(),
        source,
    };
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    dir.read_to_string(file_name).map_err(read_error)
}
