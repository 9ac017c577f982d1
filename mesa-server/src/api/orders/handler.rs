//! Tab API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shared::order::{
    CommandErrorCode, ItemInput, ItemStatus, ItemView, PaymentSnapshot, TabCommand,
    TabCommandPayload, TabSnapshot, TabStatus,
};
use shared::session::SessionInfo;

use crate::api::convert;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Tab view returned by every order endpoint
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub order_id: String,
    pub table_id: i64,
    pub table_name: String,
    pub status: TabStatus,
    pub items: Vec<ItemView>,
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentSnapshot>,
    pub opened_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<i64>,
    pub last_sequence: u64,
}

impl From<TabSnapshot> for OrderView {
    fn from(snapshot: TabSnapshot) -> Self {
        Self {
            items: snapshot.item_views(),
            order_id: snapshot.order_id,
            table_id: snapshot.table_id,
            table_name: snapshot.table_name,
            status: snapshot.status,
            total: snapshot.total,
            payment: snapshot.payment,
            opened_at: snapshot.opened_at,
            closed_at: snapshot.closed_at,
            last_sequence: snapshot.last_sequence,
        }
    }
}

fn load_view(state: &ServerState, order_id: &str) -> AppResult<OrderView> {
    let snapshot = state
        .orders
        .get_snapshot(order_id)?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
    Ok(snapshot.into())
}

/// Resolve a session token into an active session context
fn active_session(state: &ServerState, token: &str) -> AppResult<SessionInfo> {
    let info = state.sessions.session_info(token)?;
    if !info.is_active {
        return Err(AppError::SessionClosed);
    }
    Ok(info)
}

// ========== Guest path ==========

#[derive(Debug, Deserialize)]
pub struct CreateGuestRequest {
    pub session_token: String,
}

/// Open the tab for the guest's table, or join the one already open
pub async fn create_guest(
    State(state): State<ServerState>,
    Json(payload): Json<CreateGuestRequest>,
) -> AppResult<Json<OrderView>> {
    let session = active_session(&state, &payload.session_token)?;

    let cmd = TabCommand::from_guest(
        session.guest_name,
        session.guest_id,
        TabCommandPayload::OpenTab {
            table_id: session.table_id,
            session_token: Some(payload.session_token),
        },
    );
    let response = convert::execute(&state, cmd).await?;

    let order_id = response
        .order_id
        .ok_or_else(|| AppError::Internal("open tab returned no order id".into()))?;
    Ok(Json(load_view(&state, &order_id)?))
}

#[derive(Debug, Deserialize)]
pub struct GuestAddItemsRequest {
    pub session_token: String,
    pub items: Vec<ItemInput>,
}

pub async fn add_items_guest(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
    Json(payload): Json<GuestAddItemsRequest>,
) -> AppResult<Json<OrderView>> {
    let session = active_session(&state, &payload.session_token)?;

    let cmd = TabCommand::from_guest(
        session.guest_name,
        session.guest_id,
        TabCommandPayload::AddItems {
            order_id: order_id.clone(),
            items: payload.items,
            session_token: Some(payload.session_token),
        },
    );
    convert::execute(&state, cmd).await?;

    Ok(Json(load_view(&state, &order_id)?))
}

// ========== Staff path ==========

#[derive(Debug, Deserialize)]
pub struct StaffAddItemsRequest {
    pub operator_name: String,
    pub items: Vec<ItemInput>,
}

pub async fn add_items_staff(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
    Json(payload): Json<StaffAddItemsRequest>,
) -> AppResult<Json<OrderView>> {
    let cmd = TabCommand::new(
        payload.operator_name,
        TabCommandPayload::AddItems {
            order_id: order_id.clone(),
            items: payload.items,
            session_token: None,
        },
    );
    convert::execute(&state, cmd).await?;

    Ok(Json(load_view(&state, &order_id)?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemStatusRequest {
    pub next_status: ItemStatus,
    #[serde(default = "default_kitchen_operator")]
    pub operator_name: String,
}

fn default_kitchen_operator() -> String {
    "kitchen".to_string()
}

pub async fn update_item_status(
    State(state): State<ServerState>,
    Path((order_id, item_id)): Path<(String, String)>,
    Json(payload): Json<UpdateItemStatusRequest>,
) -> AppResult<Json<OrderView>> {
    let cmd = TabCommand::new(
        payload.operator_name,
        TabCommandPayload::UpdateItemStatus {
            order_id: order_id.clone(),
            item_id,
            next_status: payload.next_status,
        },
    );
    convert::execute(&state, cmd).await?;

    Ok(Json(load_view(&state, &order_id)?))
}

#[derive(Debug, Deserialize)]
pub struct AdjustQuantityRequest {
    pub quantity: i32,
    pub operator_name: String,
}

pub async fn adjust_item_quantity(
    State(state): State<ServerState>,
    Path((order_id, item_id)): Path<(String, String)>,
    Json(payload): Json<AdjustQuantityRequest>,
) -> AppResult<Json<OrderView>> {
    let cmd = TabCommand::new(
        payload.operator_name,
        TabCommandPayload::AdjustItemQuantity {
            order_id: order_id.clone(),
            item_id,
            quantity: payload.quantity,
        },
    );
    convert::execute(&state, cmd).await?;

    Ok(Json(load_view(&state, &order_id)?))
}

// ========== Closure ==========

#[derive(Debug, Deserialize)]
pub struct CloseAccountRequest {
    pub payment_method: String,
    /// Optimistic concurrency anchor from the cashier's last read
    #[serde(default)]
    pub expected_sequence: Option<u64>,
    pub operator_name: String,
}

/// Close the account
///
/// A sequence conflict means somebody appended to the tab after the
/// cashier's read; the handler refreshes the sequence and retries once so
/// the retry closes over the full total.
pub async fn close_account(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
    Json(payload): Json<CloseAccountRequest>,
) -> AppResult<Json<OrderView>> {
    let cmd = TabCommand::new(
        payload.operator_name.clone(),
        TabCommandPayload::CloseAccount {
            order_id: order_id.clone(),
            payment_method: payload.payment_method.clone(),
            expected_sequence: payload.expected_sequence,
        },
    );

    let response = convert::run(&state, cmd).await?;
    if !response.success {
        let err = response
            .error
            .ok_or_else(|| AppError::Internal("command rejected without error".into()))?;

        if err.code != CommandErrorCode::ConcurrencyConflict {
            return Err(convert::command_error(err));
        }

        tracing::info!(order_id = %order_id, "Close conflicted on sequence, retrying once");
        let refreshed = state
            .orders
            .get_snapshot(&order_id)?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?
            .last_sequence;

        let retry = TabCommand::new(
            payload.operator_name,
            TabCommandPayload::CloseAccount {
                order_id: order_id.clone(),
                payment_method: payload.payment_method,
                expected_sequence: Some(refreshed),
            },
        );
        convert::execute(&state, retry).await?;
    }

    Ok(Json(load_view(&state, &order_id)?))
}

// ========== Views ==========

pub async fn get_order(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<OrderView>> {
    Ok(Json(load_view(&state, &order_id)?))
}
