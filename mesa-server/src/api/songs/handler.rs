//! Song Request API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{SongInput, SongRequest, SongStatus};

use crate::core::ServerState;
use crate::services::SongEligibility;
use crate::utils::{AppError, AppResult};

pub async fn eligibility(
    State(state): State<ServerState>,
    Path(table_id): Path<i64>,
) -> AppResult<Json<SongEligibility>> {
    Ok(Json(state.songs.eligibility(table_id)?))
}

#[derive(Debug, Deserialize)]
pub struct SongRequestBody {
    /// Guest path: table and guest are taken from the session
    #[serde(default)]
    pub session_token: Option<String>,
    /// Staff path: table given directly
    #[serde(default)]
    pub table_id: Option<i64>,
    pub song_name: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

pub async fn request(
    State(state): State<ServerState>,
    Json(payload): Json<SongRequestBody>,
) -> AppResult<Json<SongRequest>> {
    let (table_id, guest_id) = match &payload.session_token {
        Some(token) => {
            let info = state.sessions.session_info(token)?;
            if !info.is_active {
                return Err(AppError::SessionClosed);
            }
            (info.table_id, Some(info.guest_id))
        }
        None => {
            let table_id = payload.table_id.ok_or_else(|| {
                AppError::Validation("either session_token or table_id is required".into())
            })?;
            (table_id, None)
        }
    };

    let song = state.songs.request(
        table_id,
        guest_id,
        SongInput {
            song_name: payload.song_name,
            artist: payload.artist,
            url: payload.url,
        },
    )?;
    Ok(Json(song))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: SongStatus,
}

pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<SongRequest>> {
    Ok(Json(state.songs.update_status(&id, payload.status)?))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub table_id: Option<i64>,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<SongRequest>>> {
    Ok(Json(state.songs.list(query.table_id)?))
}
