//! Guest Session API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/guest/register | POST | mint a guest session against a QR token |
//! | /api/guest/session/{token} | GET | session context for the guest UI |
//! | /api/guest/{guest_id}/items | GET | the guest's own lines on the open tab |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/guest", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/session/{token}", get(handler::session_info))
        .route("/{guest_id}/items", get(handler::my_items))
}
