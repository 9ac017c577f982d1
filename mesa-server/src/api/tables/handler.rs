//! Table Registry API Handlers

use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::AppResult;

/// One table on the floor overview
#[derive(Debug, Serialize)]
pub struct TableView {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    /// Open tab on this table, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_order_id: Option<String>,
    /// Whether a QR generation currently accepts registrations
    pub qr_active: bool,
}

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<TableView>>> {
    let storage = state.orders.storage();
    let mut views = Vec::new();

    for table in state.catalog.get_tables() {
        let open_order_id = storage.find_open_tab_for_table(table.id)?;
        let qr_active = storage
            .current_qr_for_table(table.id)?
            .is_some_and(|qr| qr.is_active);
        views.push(TableView {
            id: table.id,
            name: table.name,
            capacity: table.capacity,
            open_order_id,
            qr_active,
        });
    }

    Ok(Json(views))
}
