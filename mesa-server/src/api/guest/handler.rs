//! Guest Session API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::order::ItemView;
use shared::session::SessionInfo;

use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub qr_token: String,
    pub guest_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub session_token: String,
    pub guest_id: String,
    pub guest_name: String,
    pub table_id: i64,
    pub table_number: String,
    pub expires_at: i64,
}

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<RegisterResponse>> {
    let session = state
        .sessions
        .register(&payload.qr_token, &payload.guest_name, payload.phone)?;

    let table_number = state
        .catalog
        .table_name(session.table_id)
        .unwrap_or_else(|| session.table_id.to_string());

    Ok(Json(RegisterResponse {
        session_token: session.token,
        guest_id: session.guest_id,
        guest_name: session.guest_name,
        table_id: session.table_id,
        table_number,
        expires_at: session.expires_at,
    }))
}

pub async fn session_info(
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> AppResult<Json<SessionInfo>> {
    let info = state.sessions.session_info(&token)?;
    Ok(Json(info))
}

#[derive(Debug, Deserialize)]
pub struct MyItemsQuery {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MyItemsResponse {
    /// None when the table has no open tab
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub items: Vec<ItemView>,
    /// Sum over the guest's own lines
    pub total: i64,
}

/// The guest's own lines on their table's open tab
pub async fn my_items(
    State(state): State<ServerState>,
    Path(guest_id): Path<String>,
    Query(query): Query<MyItemsQuery>,
) -> AppResult<Json<MyItemsResponse>> {
    let session = state.sessions.authorize_guest(&query.token, &guest_id)?;

    let Some(order_id) = state.orders.find_open_tab_for_table(session.table_id)? else {
        return Ok(Json(MyItemsResponse {
            order_id: None,
            items: vec![],
            total: 0,
        }));
    };

    let Some(snapshot) = state.orders.get_snapshot(&order_id)? else {
        return Ok(Json(MyItemsResponse {
            order_id: None,
            items: vec![],
            total: 0,
        }));
    };

    let items: Vec<ItemView> = snapshot
        .item_views()
        .into_iter()
        .filter(|v| v.guest_id.as_deref() == Some(guest_id.as_str()))
        .collect();

    Ok(Json(MyItemsResponse {
        order_id: Some(order_id),
        total: snapshot.guest_total(&guest_id),
        items,
    }))
}
