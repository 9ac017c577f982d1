//! Liveness endpoint
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/health | GET | liveness + instance epoch |
//!
//! The epoch changes on every server start; clients that cached the change
//! feed position resync when it differs.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    /// Server instance epoch (changes on restart)
    epoch: String,
    /// Current global event sequence
    sequence: u64,
}

async fn health(State(state): State<ServerState>) -> AppResult<Json<HealthResponse>> {
    let sequence = state.orders.current_sequence()?;
    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        epoch: state.orders.epoch().to_string(),
        sequence,
    }))
}
