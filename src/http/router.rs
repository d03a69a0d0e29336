//! Axum router for the gateway API.

use super::handlers;
use crate::gateway::{ports::ConnectionRegistry, services::DispatchService};
use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use mockable::Clock;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared state handed to every handler.
pub type GatewayState<R, C> = Arc<DispatchService<R, C>>;

/// Builds the gateway router with CORS and request logging.
#[must_use]
pub fn router<R, C>(dispatch: GatewayState<R, C>) -> Router
where
    R: ConnectionRegistry,
    C: Clock + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/", get(handlers::root))
        .route("/api/servers", get(handlers::list_servers::<R, C>))
        .route(
            "/api/servers/{server}/tools",
            get(handlers::list_tools::<R, C>),
        )
        .route(
            "/api/servers/{server}/tools/{tool}",
            post(handlers::invoke_tool::<R, C>),
        )
        .with_state(dispatch)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
