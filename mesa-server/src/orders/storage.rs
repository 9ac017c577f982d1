//! redb-based storage layer for tab event sourcing and sessions
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `events` | `(order_id, sequence)` | `TabEvent` | Event stream (append-only) |
//! | `snapshots` | `order_id` | `TabSnapshot` | Snapshot cache |
//! | `active_tabs` | `table_id` | `order_id` | Open tab per table index |
//! | `processed_commands` | `command_id` | `()` | Idempotency check |
//! | `sequence_counter` | `"seq"` | `u64` | Global sequence |
//! | `qr_sessions` | `token` | `QrSession` | QR token store |
//! | `qr_by_table` | `table_id` | `token` | Current QR generation per table |
//! | `guest_sessions` | `token` | `GuestSession` | Guest session store |
//! | `guest_by_table` | `(table_id, token)` | `()` | Guest sessions per table index |
//! | `songs` | `song_id` | `SongRequest` | Song request store |
//!
//! # Durability
//!
//! redb commits are durable as soon as `commit()` returns (copy-on-write
//! with atomic pointer swap). The account closure saga relies on this:
//! tab closure, payment record and session invalidation land in a single
//! `WriteTransaction`, so a power cut leaves either all of it or none.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::SongRequest;
use shared::order::{TabEvent, TabSnapshot};
use shared::session::{GuestSession, QrSession};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for storing events: key = (order_id, sequence), value = JSON-serialized TabEvent
const EVENTS_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("events");

/// Table for storing snapshots: key = order_id, value = JSON-serialized TabSnapshot
const SNAPSHOTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("snapshots");

/// Table mapping table_id to its open order_id (at most one open tab per table)
const ACTIVE_TABS_TABLE: TableDefinition<i64, &str> = TableDefinition::new("active_tabs");

/// Table for tracking processed commands: key = command_id, value = empty (idempotency)
const PROCESSED_COMMANDS_TABLE: TableDefinition<&str, ()> =
    TableDefinition::new("processed_commands");

/// Table for sequence counter: key = "seq", value = u64
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

/// Table for QR sessions: key = token, value = JSON-serialized QrSession
const QR_SESSIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("qr_sessions");

/// Table mapping table_id to its current active QR token
const QR_BY_TABLE_TABLE: TableDefinition<i64, &str> = TableDefinition::new("qr_by_table");

/// Table for guest sessions: key = token, value = JSON-serialized GuestSession
const GUEST_SESSIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("guest_sessions");

/// Table indexing guest session tokens by table: key = (table_id, token)
const GUEST_BY_TABLE_TABLE: TableDefinition<(i64, &str), ()> =
    TableDefinition::new("guest_by_table");

/// Table for song requests: key = song_id, value = JSON-serialized SongRequest
const SONGS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("songs");

const SEQUENCE_KEY: &str = "seq";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Tab and session storage backed by redb
#[derive(Clone)]
pub struct TabStorage {
    db: Arc<Database>,
}

impl TabStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Create all tables if they don't exist
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(EVENTS_TABLE)?;
            let _ = write_txn.open_table(SNAPSHOTS_TABLE)?;
            let _ = write_txn.open_table(ACTIVE_TABS_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
            let _ = write_txn.open_table(QR_SESSIONS_TABLE)?;
            let _ = write_txn.open_table(QR_BY_TABLE_TABLE)?;
            let _ = write_txn.open_table(GUEST_SESSIONS_TABLE)?;
            let _ = write_txn.open_table(GUEST_BY_TABLE_TABLE)?;
            let _ = write_txn.open_table(SONGS_TABLE)?;

            // Initialize sequence counter if not exists
            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(SEQUENCE_KEY)?.is_none() {
                seq_table.insert(SEQUENCE_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Sequence Operations ==========

    /// Get current sequence (read-only)
    pub fn get_current_sequence(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCE_TABLE)?;
        Ok(table
            .get(SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    /// Set sequence number (within transaction)
    pub fn set_sequence(&self, txn: &WriteTransaction, sequence: u64) -> StorageResult<()> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        table.insert(SEQUENCE_KEY, sequence)?;
        Ok(())
    }

    // ========== Command Idempotency ==========

    /// Check if a command has been processed
    pub fn is_command_processed(&self, command_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Check if a command has been processed (within transaction)
    pub fn is_command_processed_txn(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Mark a command as processed
    pub fn mark_command_processed(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        table.insert(command_id, ())?;
        Ok(())
    }

    // ========== Event Operations ==========

    /// Store an event
    pub fn store_event(&self, txn: &WriteTransaction, event: &TabEvent) -> StorageResult<()> {
        let mut table = txn.open_table(EVENTS_TABLE)?;
        let key = (event.order_id.as_str(), event.sequence);
        let value = serde_json::to_vec(event)?;
        table.insert(key, value.as_slice())?;
        Ok(())
    }

    /// Get all events for an order
    pub fn get_events_for_order(&self, order_id: &str) -> StorageResult<Vec<TabEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;

        let mut events = Vec::new();
        let range_start = (order_id, 0u64);
        let range_end = (order_id, u64::MAX);

        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let event: TabEvent = serde_json::from_slice(value.value())?;
            events.push(event);
        }

        events.sort_by_key(|e| e.sequence);
        Ok(events)
    }

    /// Get events since a given sequence (across all orders)
    pub fn get_events_since(&self, since_sequence: u64) -> StorageResult<Vec<TabEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;

        let mut events = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let event: TabEvent = serde_json::from_slice(value.value())?;
            if event.sequence > since_sequence {
                events.push(event);
            }
        }

        events.sort_by_key(|e| e.sequence);
        Ok(events)
    }

    // ========== Snapshot Operations ==========

    /// Store a snapshot
    pub fn store_snapshot(
        &self,
        txn: &WriteTransaction,
        snapshot: &TabSnapshot,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(SNAPSHOTS_TABLE)?;
        let value = serde_json::to_vec(snapshot)?;
        table.insert(snapshot.order_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a snapshot by order ID
    pub fn get_snapshot(&self, order_id: &str) -> StorageResult<Option<TabSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNAPSHOTS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => {
                let snapshot: TabSnapshot = serde_json::from_slice(value.value())?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    /// Get a snapshot by order ID (within transaction)
    pub fn get_snapshot_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<TabSnapshot>> {
        let table = txn.open_table(SNAPSHOTS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => {
                let snapshot: TabSnapshot = serde_json::from_slice(value.value())?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    // ========== Active Tabs ==========

    /// Record a table's open tab (within transaction)
    pub fn mark_tab_open(
        &self,
        txn: &WriteTransaction,
        table_id: i64,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(ACTIVE_TABS_TABLE)?;
        table.insert(table_id, order_id)?;
        Ok(())
    }

    /// Clear a table's open tab (within transaction)
    pub fn mark_tab_closed(&self, txn: &WriteTransaction, table_id: i64) -> StorageResult<()> {
        let mut table = txn.open_table(ACTIVE_TABS_TABLE)?;
        table.remove(table_id)?;
        Ok(())
    }

    /// Find the open order for a table, if any
    pub fn find_open_tab_for_table(&self, table_id: i64) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTIVE_TABS_TABLE)?;
        Ok(table.get(table_id)?.map(|guard| guard.value().to_string()))
    }

    /// Find the open order for a table (within transaction)
    pub fn find_open_tab_for_table_txn(
        &self,
        txn: &WriteTransaction,
        table_id: i64,
    ) -> StorageResult<Option<String>> {
        let table = txn.open_table(ACTIVE_TABS_TABLE)?;
        Ok(table.get(table_id)?.map(|guard| guard.value().to_string()))
    }

    /// Get all open tab snapshots
    pub fn get_open_tabs(&self) -> StorageResult<Vec<TabSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let active_table = read_txn.open_table(ACTIVE_TABS_TABLE)?;
        let snapshots_table = read_txn.open_table(SNAPSHOTS_TABLE)?;

        let mut snapshots = Vec::new();
        for result in active_table.iter()? {
            let (_key, value) = result?;
            if let Some(raw) = snapshots_table.get(value.value())? {
                let snapshot: TabSnapshot = serde_json::from_slice(raw.value())?;
                snapshots.push(snapshot);
            }
        }

        Ok(snapshots)
    }

    // ========== QR Sessions ==========

    /// Store a QR session and, when active, point the table index at it
    pub fn store_qr_session(&self, txn: &WriteTransaction, qr: &QrSession) -> StorageResult<()> {
        let mut sessions = txn.open_table(QR_SESSIONS_TABLE)?;
        let value = serde_json::to_vec(qr)?;
        sessions.insert(qr.token.as_str(), value.as_slice())?;

        if qr.is_active {
            let mut index = txn.open_table(QR_BY_TABLE_TABLE)?;
            index.insert(qr.table_id, qr.token.as_str())?;
        }
        Ok(())
    }

    /// Get a QR session by token
    pub fn get_qr_session(&self, token: &str) -> StorageResult<Option<QrSession>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(QR_SESSIONS_TABLE)?;
        match table.get(token)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a QR session by token (within transaction)
    pub fn get_qr_session_txn(
        &self,
        txn: &WriteTransaction,
        token: &str,
    ) -> StorageResult<Option<QrSession>> {
        let table = txn.open_table(QR_SESSIONS_TABLE)?;
        match table.get(token)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get the current active QR session for a table
    pub fn current_qr_for_table(&self, table_id: i64) -> StorageResult<Option<QrSession>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(QR_BY_TABLE_TABLE)?;
        let token = match index.get(table_id)? {
            Some(guard) => guard.value().to_string(),
            None => return Ok(None),
        };

        let sessions = read_txn.open_table(QR_SESSIONS_TABLE)?;
        match sessions.get(token.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get the current active QR session for a table (within transaction)
    pub fn current_qr_for_table_txn(
        &self,
        txn: &WriteTransaction,
        table_id: i64,
    ) -> StorageResult<Option<QrSession>> {
        let index = txn.open_table(QR_BY_TABLE_TABLE)?;
        let token = match index.get(table_id)? {
            Some(guard) => guard.value().to_string(),
            None => return Ok(None),
        };
        drop(index);
        self.get_qr_session_txn(txn, &token)
    }

    // ========== Guest Sessions ==========

    /// Store a guest session and index it by table
    pub fn store_guest_session(
        &self,
        txn: &WriteTransaction,
        session: &GuestSession,
    ) -> StorageResult<()> {
        let mut sessions = txn.open_table(GUEST_SESSIONS_TABLE)?;
        let value = serde_json::to_vec(session)?;
        sessions.insert(session.token.as_str(), value.as_slice())?;

        let mut index = txn.open_table(GUEST_BY_TABLE_TABLE)?;
        index.insert((session.table_id, session.token.as_str()), ())?;
        Ok(())
    }

    /// Get a guest session by token
    pub fn get_guest_session(&self, token: &str) -> StorageResult<Option<GuestSession>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(GUEST_SESSIONS_TABLE)?;
        match table.get(token)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a guest session by token (within transaction)
    pub fn get_guest_session_txn(
        &self,
        txn: &WriteTransaction,
        token: &str,
    ) -> StorageResult<Option<GuestSession>> {
        let table = txn.open_table(GUEST_SESSIONS_TABLE)?;
        match table.get(token)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get all guest sessions registered on a table
    pub fn guest_sessions_for_table(&self, table_id: i64) -> StorageResult<Vec<GuestSession>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(GUEST_BY_TABLE_TABLE)?;
        let sessions_table = read_txn.open_table(GUEST_SESSIONS_TABLE)?;

        let mut sessions = Vec::new();
        for result in index.range((table_id, "")..)? {
            let (key, _value) = result?;
            let (tid, token) = key.value();
            if tid != table_id {
                break;
            }
            if let Some(raw) = sessions_table.get(token)? {
                sessions.push(serde_json::from_slice(raw.value())?);
            }
        }

        Ok(sessions)
    }

    /// Retire every credential bound to a table (within transaction)
    ///
    /// Deactivates the current QR generation, drops the table's QR index
    /// entry, and flips every guest session for the table inactive. Called
    /// from the account closure saga so the whole purge commits with the
    /// closing events.
    pub fn invalidate_table_sessions(
        &self,
        txn: &WriteTransaction,
        table_id: i64,
    ) -> StorageResult<()> {
        // Retire the current QR generation
        let mut qr_index = txn.open_table(QR_BY_TABLE_TABLE)?;
        let token = qr_index.remove(table_id)?.map(|g| g.value().to_string());
        drop(qr_index);

        if let Some(token) = token {
            let mut qr_sessions = txn.open_table(QR_SESSIONS_TABLE)?;
            // Read guard must be released before the insert below
            let updated = {
                let raw = qr_sessions.get(token.as_str())?;
                match raw {
                    Some(guard) => {
                        let mut qr: QrSession = serde_json::from_slice(guard.value())?;
                        qr.is_active = false;
                        Some(serde_json::to_vec(&qr)?)
                    }
                    None => None,
                }
            };
            if let Some(value) = updated {
                qr_sessions.insert(token.as_str(), value.as_slice())?;
            }
        }

        // Flip every guest session for the table inactive
        let index = txn.open_table(GUEST_BY_TABLE_TABLE)?;
        let mut tokens = Vec::new();
        for result in index.range((table_id, "")..)? {
            let (key, _value) = result?;
            let (tid, token) = key.value();
            if tid != table_id {
                break;
            }
            tokens.push(token.to_string());
        }
        drop(index);

        let mut sessions = txn.open_table(GUEST_SESSIONS_TABLE)?;
        let mut updates = Vec::new();
        for token in &tokens {
            let raw = sessions.get(token.as_str())?;
            if let Some(guard) = raw {
                let mut session: GuestSession = serde_json::from_slice(guard.value())?;
                session.is_active = false;
                updates.push((token.clone(), serde_json::to_vec(&session)?));
            }
        }
        for (token, value) in updates {
            sessions.insert(token.as_str(), value.as_slice())?;
        }

        Ok(())
    }

    // ========== Song Requests ==========

    /// Store a song request (within transaction)
    pub fn store_song(&self, txn: &WriteTransaction, song: &SongRequest) -> StorageResult<()> {
        let mut table = txn.open_table(SONGS_TABLE)?;
        let value = serde_json::to_vec(song)?;
        table.insert(song.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a song request by id
    pub fn get_song(&self, song_id: &str) -> StorageResult<Option<SongRequest>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SONGS_TABLE)?;
        match table.get(song_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get all song requests
    pub fn get_all_songs(&self) -> StorageResult<Vec<SongRequest>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SONGS_TABLE)?;

        let mut songs = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            songs.push(serde_json::from_slice(value.value())?);
        }

        songs.sort_by_key(|s: &SongRequest| s.requested_at);
        Ok(songs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{EventPayload, TabEventType};

    fn create_test_event(order_id: &str, sequence: u64) -> TabEvent {
        TabEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            order_id: order_id.to_string(),
            timestamp: shared::util::now_millis(),
            operator_name: "Test Operator".to_string(),
            guest_id: None,
            command_id: uuid::Uuid::new_v4().to_string(),
            event_type: TabEventType::TabOpened,
            payload: EventPayload::TabOpened {
                table_id: 1,
                table_name: "Table 1".to_string(),
            },
        }
    }

    fn create_test_qr(token: &str, table_id: i64) -> QrSession {
        QrSession {
            token: token.to_string(),
            table_id,
            issued_at: shared::util::now_millis(),
            expires_at: shared::util::now_millis() + 3_600_000,
            is_active: true,
        }
    }

    fn create_test_guest(token: &str, table_id: i64, qr_token: &str) -> GuestSession {
        GuestSession {
            token: token.to_string(),
            guest_id: uuid::Uuid::new_v4().to_string(),
            guest_name: "Ana".to_string(),
            phone: None,
            table_id,
            qr_token: qr_token.to_string(),
            is_active: true,
            created_at: shared::util::now_millis(),
            expires_at: shared::util::now_millis() + 3_600_000,
        }
    }

    #[test]
    fn test_sequence_set_and_get() {
        let storage = TabStorage::open_in_memory().unwrap();

        assert_eq!(storage.get_current_sequence().unwrap(), 0);

        let txn = storage.begin_write().unwrap();
        storage.set_sequence(&txn, 7).unwrap();
        txn.commit().unwrap();

        assert_eq!(storage.get_current_sequence().unwrap(), 7);
    }

    #[test]
    fn test_command_idempotency() {
        let storage = TabStorage::open_in_memory().unwrap();
        let command_id = "cmd-123";

        assert!(!storage.is_command_processed(command_id).unwrap());

        let txn = storage.begin_write().unwrap();
        storage.mark_command_processed(&txn, command_id).unwrap();
        txn.commit().unwrap();

        assert!(storage.is_command_processed(command_id).unwrap());
    }

    #[test]
    fn test_event_storage() {
        let storage = TabStorage::open_in_memory().unwrap();
        let order_id = "order-1";

        let event1 = create_test_event(order_id, 1);
        let event2 = create_test_event(order_id, 2);

        let txn = storage.begin_write().unwrap();
        storage.store_event(&txn, &event1).unwrap();
        storage.store_event(&txn, &event2).unwrap();
        txn.commit().unwrap();

        let events = storage.get_events_for_order(order_id).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, 1);
        assert_eq!(events[1].sequence, 2);
    }

    #[test]
    fn test_get_events_since() {
        let storage = TabStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage
            .store_event(&txn, &create_test_event("order-1", 1))
            .unwrap();
        storage
            .store_event(&txn, &create_test_event("order-2", 2))
            .unwrap();
        storage
            .store_event(&txn, &create_test_event("order-1", 3))
            .unwrap();
        txn.commit().unwrap();

        let events = storage.get_events_since(1).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.sequence > 1));
    }

    #[test]
    fn test_snapshot_storage() {
        let storage = TabStorage::open_in_memory().unwrap();
        let snapshot = TabSnapshot::new("order-1".to_string(), 1, "Table 1".to_string());

        let txn = storage.begin_write().unwrap();
        storage.store_snapshot(&txn, &snapshot).unwrap();
        txn.commit().unwrap();

        let retrieved = storage.get_snapshot("order-1").unwrap();
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().order_id, "order-1");
    }

    #[test]
    fn test_active_tabs_index() {
        let storage = TabStorage::open_in_memory().unwrap();

        assert!(storage.find_open_tab_for_table(5).unwrap().is_none());

        let txn = storage.begin_write().unwrap();
        storage.mark_tab_open(&txn, 5, "order-1").unwrap();
        txn.commit().unwrap();

        assert_eq!(
            storage.find_open_tab_for_table(5).unwrap().as_deref(),
            Some("order-1")
        );

        let txn = storage.begin_write().unwrap();
        storage.mark_tab_closed(&txn, 5).unwrap();
        txn.commit().unwrap();

        assert!(storage.find_open_tab_for_table(5).unwrap().is_none());
    }

    #[test]
    fn test_qr_session_store_and_index() {
        let storage = TabStorage::open_in_memory().unwrap();
        let qr = create_test_qr("qr-token-1", 3);

        let txn = storage.begin_write().unwrap();
        storage.store_qr_session(&txn, &qr).unwrap();
        txn.commit().unwrap();

        let loaded = storage.get_qr_session("qr-token-1").unwrap().unwrap();
        assert_eq!(loaded.table_id, 3);

        let current = storage.current_qr_for_table(3).unwrap().unwrap();
        assert_eq!(current.token, "qr-token-1");
    }

    #[test]
    fn test_qr_regeneration_replaces_index() {
        let storage = TabStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage
            .store_qr_session(&txn, &create_test_qr("qr-old", 3))
            .unwrap();
        txn.commit().unwrap();

        // New generation takes over the table index; old token stays readable
        let mut old = storage.get_qr_session("qr-old").unwrap().unwrap();
        old.is_active = false;
        let txn = storage.begin_write().unwrap();
        storage.store_qr_session(&txn, &old).unwrap();
        storage
            .store_qr_session(&txn, &create_test_qr("qr-new", 3))
            .unwrap();
        txn.commit().unwrap();

        let current = storage.current_qr_for_table(3).unwrap().unwrap();
        assert_eq!(current.token, "qr-new");
        assert!(!storage.get_qr_session("qr-old").unwrap().unwrap().is_active);
    }

    #[test]
    fn test_guest_sessions_for_table() {
        let storage = TabStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage
            .store_guest_session(&txn, &create_test_guest("g1", 3, "qr"))
            .unwrap();
        storage
            .store_guest_session(&txn, &create_test_guest("g2", 3, "qr"))
            .unwrap();
        storage
            .store_guest_session(&txn, &create_test_guest("g3", 4, "qr"))
            .unwrap();
        txn.commit().unwrap();

        let sessions = storage.guest_sessions_for_table(3).unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions.iter().all(|s| s.table_id == 3));
    }

    #[test]
    fn test_invalidate_table_sessions() {
        let storage = TabStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage
            .store_qr_session(&txn, &create_test_qr("qr-t3", 3))
            .unwrap();
        storage
            .store_guest_session(&txn, &create_test_guest("g1", 3, "qr-t3"))
            .unwrap();
        storage
            .store_guest_session(&txn, &create_test_guest("g2", 3, "qr-t3"))
            .unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        storage.invalidate_table_sessions(&txn, 3).unwrap();
        txn.commit().unwrap();

        assert!(storage.current_qr_for_table(3).unwrap().is_none());
        assert!(!storage.get_qr_session("qr-t3").unwrap().unwrap().is_active);
        let sessions = storage.guest_sessions_for_table(3).unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions.iter().all(|s| !s.is_active));
    }

    #[test]
    fn test_song_storage() {
        let storage = TabStorage::open_in_memory().unwrap();
        let song = SongRequest {
            id: "song-1".to_string(),
            table_id: 3,
            guest_id: None,
            song_name: "Bamboleo".to_string(),
            artist: Some("Gipsy Kings".to_string()),
            url: None,
            status: shared::models::SongStatus::Pending,
            requested_at: shared::util::now_millis(),
        };

        let txn = storage.begin_write().unwrap();
        storage.store_song(&txn, &song).unwrap();
        txn.commit().unwrap();

        let loaded = storage.get_song("song-1").unwrap().unwrap();
        assert_eq!(loaded.song_name, "Bamboleo");
        assert_eq!(storage.get_all_songs().unwrap().len(), 1);
    }

    #[test]
    fn test_reopen_preserves_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesa.redb");

        {
            let storage = TabStorage::open(&path).unwrap();
            let txn = storage.begin_write().unwrap();
            storage.store_event(&txn, &create_test_event("order-1", 1)).unwrap();
            storage.set_sequence(&txn, 1).unwrap();
            storage.mark_tab_open(&txn, 1, "order-1").unwrap();
            txn.commit().unwrap();
        }

        let reopened = TabStorage::open(&path).unwrap();
        assert_eq!(reopened.get_current_sequence().unwrap(), 1);
        assert_eq!(reopened.get_events_for_order("order-1").unwrap().len(), 1);
        assert_eq!(
            reopened.find_open_tab_for_table(1).unwrap().as_deref(),
            Some("order-1")
        );
    }
}
