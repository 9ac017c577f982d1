//! Kitchen API Handlers

use axum::{Json, extract::State};
use serde::Serialize;
use shared::order::{ItemStatus, ItemView};

use crate::core::ServerState;
use crate::utils::AppResult;

/// One open tab on the kitchen screen
#[derive(Debug, Serialize)]
pub struct KitchenTicket {
    pub order_id: String,
    pub table_id: i64,
    pub table_name: String,
    pub opened_at: i64,
    /// Lines still owed to the table, with the derived "new" flag
    pub items: Vec<ItemView>,
}

/// Undelivered lines across all open tabs, oldest tab first
pub async fn queue(State(state): State<ServerState>) -> AppResult<Json<Vec<KitchenTicket>>> {
    let mut tabs = state.orders.get_open_tabs()?;
    tabs.sort_by_key(|t| t.opened_at);

    let tickets = tabs
        .into_iter()
        .filter_map(|snapshot| {
            let items: Vec<ItemView> = snapshot
                .item_views()
                .into_iter()
                .filter(|v| v.status != ItemStatus::Delivered)
                .collect();
            if items.is_empty() {
                return None;
            }
            Some(KitchenTicket {
                order_id: snapshot.order_id,
                table_id: snapshot.table_id,
                table_name: snapshot.table_name,
                opened_at: snapshot.opened_at,
                items,
            })
        })
        .collect();

    Ok(Json(tickets))
}
