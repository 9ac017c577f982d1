//! Table Registry API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/tables | GET | every active table with its live state |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/tables", get(handler::list))
}
