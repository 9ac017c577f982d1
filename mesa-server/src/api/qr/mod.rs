//! QR Token API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/qr/generate | POST | issue a new QR generation for a table |
//! | /api/qr/validate | POST | check a QR token |
//! | /api/qr/deactivate | POST | retire the table's QR and guest sessions |
//!
//! Staff-facing; guests only ever see the access URL the QR encodes.

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/qr", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/generate", post(handler::generate))
        .route("/validate", post(handler::validate))
        .route("/deactivate", post(handler::deactivate))
}
