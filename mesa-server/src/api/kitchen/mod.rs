//! Kitchen API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/kitchen/queue | GET | undelivered lines across all open tabs |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/kitchen/queue", get(handler::queue))
}
