//! QR Token API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::sessions::QrIssued;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub table_id: i64,
}

pub async fn generate(
    State(state): State<ServerState>,
    Json(payload): Json<GenerateRequest>,
) -> AppResult<Json<QrIssued>> {
    let issued = state.sessions.generate(payload.table_id)?;
    Ok(Json(issued))
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub table_id: i64,
    pub expires_at: i64,
}

pub async fn validate(
    State(state): State<ServerState>,
    Json(payload): Json<ValidateRequest>,
) -> AppResult<Json<ValidateResponse>> {
    let qr = state.sessions.validate(&payload.token)?;
    Ok(Json(ValidateResponse {
        valid: true,
        table_id: qr.table_id,
        expires_at: qr.expires_at,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DeactivateRequest {
    pub table_id: i64,
}

#[derive(Debug, Serialize)]
pub struct DeactivateResponse {
    pub table_id: i64,
    pub deactivated: bool,
}

pub async fn deactivate(
    State(state): State<ServerState>,
    Json(payload): Json<DeactivateRequest>,
) -> AppResult<Json<DeactivateResponse>> {
    state.sessions.deactivate(payload.table_id)?;
    Ok(Json(DeactivateResponse {
        table_id: payload.table_id,
        deactivated: true,
    }))
}
