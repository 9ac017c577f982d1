//! Tab API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/orders/guest | POST | open (or join) the tab for the guest's table |
//! | /api/orders/{order_id} | GET | full tab view |
//! | /api/orders/{order_id}/items | POST | guest adds items (session required) |
//! | /api/orders/{order_id}/items/staff | POST | staff adds items |
//! | /api/orders/{order_id}/items/{item_id}/status | POST | kitchen advance |
//! | /api/orders/{order_id}/items/{item_id}/quantity | POST | staff quantity override |
//! | /api/orders/{order_id}/close | POST | close account + payment snapshot |
//!
//! All mutations go through the command pipeline; handlers only shape
//! requests into commands and snapshots into views.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/guest", post(handler::create_guest))
        .route("/{order_id}", get(handler::get_order))
        .route("/{order_id}/items", post(handler::add_items_guest))
        .route("/{order_id}/items/staff", post(handler::add_items_staff))
        .route(
            "/{order_id}/items/{item_id}/status",
            post(handler::update_item_status),
        )
        .route(
            "/{order_id}/items/{item_id}/quantity",
            post(handler::adjust_item_quantity),
        )
        .route("/{order_id}/close", post(handler::close_account))
}
