//! Song Request Model
//!
//! Song requests are gated on table spend: a request is only creatable
//! when the owning table's aggregate total meets the configured minimum,
//! checked server-side at request time.

use serde::{Deserialize, Serialize};

/// Song request status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SongStatus {
    #[default]
    Pending,
    Playing,
    Played,
    Skipped,
    Rejected,
}

impl SongStatus {
    /// Whether the DJ/staff may move a request from `self` to `next`
    ///
    /// Played, Skipped and Rejected are terminal.
    pub fn can_transition_to(self, next: SongStatus) -> bool {
        matches!(
            (self, next),
            (SongStatus::Pending, SongStatus::Playing)
                | (SongStatus::Pending, SongStatus::Rejected)
                | (SongStatus::Pending, SongStatus::Skipped)
                | (SongStatus::Playing, SongStatus::Played)
                | (SongStatus::Playing, SongStatus::Skipped)
        )
    }
}

/// Song request input (from the guest UI)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongInput {
    pub song_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Song request entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongRequest {
    pub id: String,
    pub table_id: i64,
    /// None when requested by staff on the guest's behalf
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<String>,
    pub song_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub status: SongStatus,
    pub requested_at: i64,
}
