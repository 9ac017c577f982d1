//! Song Request API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/songs/eligibility/{table_id} | GET | spend gate check |
//! | /api/songs | POST | create a request (gate re-checked server-side) |
//! | /api/songs | GET | list requests, optional ?table_id= |
//! | /api/songs/{id}/status | POST | DJ/staff transition |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/songs", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::request).get(handler::list))
        .route("/eligibility/{table_id}", get(handler::eligibility))
        .route("/{id}/status", post(handler::update_status))
}
