//! HTTP surface of the gateway.
//!
//! Routes:
//!
//! - `GET /`: liveness text
//! - `GET /api/servers`: configured servers
//! - `GET /api/servers/{server}/tools`: a server's tools
//! - `POST /api/servers/{server}/tools/{tool}`: invoke a tool with a JSON
//!   object of arguments
//!
//! Every `/api` response is wrapped in an [`Envelope`].

mod envelope;
mod handlers;
mod router;

pub use envelope::{ApiError, Envelope};
pub use router::{GatewayState, router};
