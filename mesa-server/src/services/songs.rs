//! Song requests gated on table spend
//!
//! Eligibility is recomputed server-side at request time from the table's
//! open tab; the read endpoint only advises the UI.

use serde::Serialize;
use shared::models::{SongInput, SongRequest, SongStatus};
use shared::util::{new_token, now_millis};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::core::ChangeFeedEvent;
use crate::orders::{StorageError, TabStorage};

#[derive(Debug, Error)]
pub enum SongError {
    #[error("song request {0} not found")]
    SongNotFound(String),

    #[error("table total {table_total} is below the song request minimum {minimum_amount}")]
    EligibilityNotMet {
        table_total: i64,
        minimum_amount: i64,
    },

    #[error("song request cannot move {from:?} -> {to:?}")]
    IllegalTransition { from: SongStatus, to: SongStatus },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type SongResult<T> = Result<T, SongError>;

/// Eligibility answer for the guest UI
#[derive(Debug, Clone, Serialize)]
pub struct SongEligibility {
    pub can_request: bool,
    pub table_total: i64,
    pub minimum_amount: i64,
}

#[derive(Clone)]
pub struct SongService {
    storage: TabStorage,
    /// Spend gate in currency minor units; total == minimum passes
    min_song_spend: i64,
    change_tx: broadcast::Sender<ChangeFeedEvent>,
}

impl SongService {
    pub fn new(
        storage: TabStorage,
        min_song_spend: i64,
        change_tx: broadcast::Sender<ChangeFeedEvent>,
    ) -> Self {
        Self {
            storage,
            min_song_spend,
            change_tx,
        }
    }

    /// Aggregate spend on the table's open tab, 0 with no open tab
    ///
    /// Every item counts regardless of kitchen status; ordering is the
    /// commitment, not delivery.
    pub fn table_total(&self, table_id: i64) -> SongResult<i64> {
        let Some(order_id) = self.storage.find_open_tab_for_table(table_id)? else {
            return Ok(0);
        };
        Ok(self
            .storage
            .get_snapshot(&order_id)?
            .map(|s| s.total)
            .unwrap_or(0))
    }

    pub fn eligibility(&self, table_id: i64) -> SongResult<SongEligibility> {
        let table_total = self.table_total(table_id)?;
        Ok(SongEligibility {
            can_request: table_total >= self.min_song_spend,
            table_total,
            minimum_amount: self.min_song_spend,
        })
    }

    /// Create a song request after re-checking the spend gate
    pub fn request(
        &self,
        table_id: i64,
        guest_id: Option<String>,
        input: SongInput,
    ) -> SongResult<SongRequest> {
        let song_name = input.song_name.trim().to_string();
        if song_name.is_empty() {
            return Err(SongError::Validation("song name must not be empty".into()));
        }

        let table_total = self.table_total(table_id)?;
        if table_total < self.min_song_spend {
            return Err(SongError::EligibilityNotMet {
                table_total,
                minimum_amount: self.min_song_spend,
            });
        }

        let song = SongRequest {
            id: new_token(),
            table_id,
            guest_id,
            song_name,
            artist: input.artist,
            url: input.url,
            status: SongStatus::Pending,
            requested_at: now_millis(),
        };

        let txn = self.storage.begin_write()?;
        self.storage.store_song(&txn, &song)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(table_id, song_id = %song.id, song = %song.song_name, "Song requested");
        self.publish(&song);
        Ok(song)
    }

    /// DJ/staff transition on a request
    pub fn update_status(&self, song_id: &str, next: SongStatus) -> SongResult<SongRequest> {
        let mut song = self
            .storage
            .get_song(song_id)?
            .ok_or_else(|| SongError::SongNotFound(song_id.to_string()))?;

        if !song.status.can_transition_to(next) {
            return Err(SongError::IllegalTransition {
                from: song.status,
                to: next,
            });
        }
        song.status = next;

        let txn = self.storage.begin_write()?;
        self.storage.store_song(&txn, &song)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(song_id = %song.id, status = ?song.status, "Song status updated");
        self.publish(&song);
        Ok(song)
    }

    /// All requests, optionally narrowed to one table, oldest first
    pub fn list(&self, table_id: Option<i64>) -> SongResult<Vec<SongRequest>> {
        let mut songs = self.storage.get_all_songs()?;
        if let Some(table_id) = table_id {
            songs.retain(|s| s.table_id == table_id);
        }
        Ok(songs)
    }

    fn publish(&self, song: &SongRequest) {
        let _ = self.change_tx.send(ChangeFeedEvent::Song { song: song.clone() });
    }
}
