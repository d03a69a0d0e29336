//! Route handlers.

use super::envelope::{ApiError, Envelope};
use super::router::GatewayState;
use crate::gateway::{
    domain::{ToolArguments, ToolDescriptor},
    ports::ConnectionRegistry,
    services::ServerSummary,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
};
use mockable::Clock;
use serde_json::Value;

/// Health text for `GET /`.
pub(super) async fn root() -> &'static str {
    "MCP Gateway is running"
}

/// `GET /api/servers`
pub(super) async fn list_servers<R, C>(
    State(dispatch): State<GatewayState<R, C>>,
) -> Envelope<Vec<ServerSummary>>
where
    R: ConnectionRegistry,
    C: Clock + Send + Sync + 'static,
{
    Envelope::success(dispatch.list_servers())
}

/// `GET /api/servers/{server}/tools`
pub(super) async fn list_tools<R, C>(
    State(dispatch): State<GatewayState<R, C>>,
    Path(server): Path<String>,
) -> Result<Envelope<Vec<ToolDescriptor>>, ApiError>
where
    R: ConnectionRegistry,
    C: Clock + Send + Sync + 'static,
{
    let cached = dispatch.list_tools(&server).await?;
    Ok(Envelope::success(cached.tools().to_vec()))
}

/// `POST /api/servers/{server}/tools/{tool}`
pub(super) async fn invoke_tool<R, C>(
    State(dispatch): State<GatewayState<R, C>>,
    Path((server, tool)): Path<(String, String)>,
    body: Bytes,
) -> Result<Envelope<Value>, ApiError>
where
    R: ConnectionRegistry,
    C: Clock + Send + Sync + 'static,
{
    let arguments = parse_arguments(&body)?;
    let result = dispatch.invoke(&server, &tool, arguments).await?;
    Ok(Envelope::success(result))
}

fn parse_arguments(body: &[u8]) -> Result<ToolArguments, ApiError> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(arguments)) => Ok(arguments),
        Ok(_) => Err(ApiError::InvalidBody(
            "expected a JSON object of tool arguments".to_owned(),
        )),
        Err(err) => Err(ApiError::InvalidBody(err.to_string())),
    }
}
