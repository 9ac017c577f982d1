//! HTTP API
//!
//! # Structure
//!
//! - [`health`] - liveness endpoint
//! - [`events`] - SSE change feed
//! - [`qr`] - QR generation / validation / deactivation (staff)
//! - [`guest`] - guest registration and session context
//! - [`orders`] - tab commands and views
//! - [`kitchen`] - kitchen queue view
//! - [`songs`] - song requests
//! - [`tables`] - table registry view

pub mod convert;

pub mod events;
pub mod guest;
pub mod health;
pub mod kitchen;
pub mod orders;
pub mod qr;
pub mod songs;
pub mod tables;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(events::router())
        .merge(qr::router())
        .merge(guest::router())
        .merge(orders::router())
        .merge(kitchen::router())
        .merge(songs::router())
        .merge(tables::router())
}

/// Build the fully configured application with middleware and state
pub fn build_app(state: ServerState) -> Router {
    build_router()
        // CORS - guest devices hit the API from the captive web app origin
        .layer(CorsLayer::permissive())
        // Compression - gzip responses
        .layer(CompressionLayer::new())
        // Trace - request tracing at INFO level
        .layer(TraceLayer::new_for_http())
        // Request ID - generate + propagate x-request-id
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        .with_state(state)
}
