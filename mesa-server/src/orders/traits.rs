//! Command execution traits and context
//!
//! A command runs inside one `WriteTransaction`:
//! - [`CommandContext`] carries the transaction, a local sequence counter
//!   and a cache of snapshots modified during execution
//! - [`CommandHandler`] validates and produces events
//! - [`EventApplier`] folds one event into a snapshot (pure, no IO)

use std::collections::HashMap;

use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use redb::WriteTransaction;
use shared::order::{CommandError, CommandErrorCode, TabEvent, TabSnapshot};
use thiserror::Error;

use super::storage::{StorageError, TabStorage};

// enum_dispatch emits the EventAction dispatch impls at this expansion
// site; the enum and every applier type must resolve here.
#[allow(unused_imports)]
use super::appliers::{
    AccountClosedApplier, EventAction, ItemQuantityAdjustedApplier, ItemRemovedApplier,
    ItemStatusChangedApplier, ItemsAddedApplier, TabOpenedApplier,
};

/// Metadata accompanying command execution
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    /// Guest display name or staff name, recorded on every event
    pub operator_name: String,
    /// Set when the command came through a guest session
    pub guest_id: Option<String>,
    /// Client timestamp (Unix milliseconds), for audit
    pub timestamp: i64,
}

/// Domain errors surfaced by command execution
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order already closed: {0}")]
    OrderClosed(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Table not found: {0}")]
    TableNotFound(i64),

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(i64),

    #[error("Guest session is no longer active")]
    SessionClosed,

    #[error("Illegal transition: {0}")]
    IllegalTransition(String),

    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid operation: {1}")]
    InvalidOperation(CommandErrorCode, String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl OrderError {
    pub fn error_code(&self) -> CommandErrorCode {
        match self {
            OrderError::OrderNotFound(_) => CommandErrorCode::OrderNotFound,
            OrderError::OrderClosed(_) => CommandErrorCode::OrderClosed,
            OrderError::ItemNotFound(_) => CommandErrorCode::ItemNotFound,
            OrderError::TableNotFound(_) => CommandErrorCode::TableNotFound,
            OrderError::MenuItemNotFound(_) => CommandErrorCode::MenuItemNotFound,
            OrderError::SessionClosed => CommandErrorCode::SessionClosed,
            OrderError::IllegalTransition(_) => CommandErrorCode::IllegalTransition,
            OrderError::ConcurrencyConflict(_) => CommandErrorCode::ConcurrencyConflict,
            OrderError::InvalidQuantity(_) => CommandErrorCode::InvalidQuantity,
            OrderError::InvalidOperation(code, _) => code.clone(),
            OrderError::Storage(_) => CommandErrorCode::SystemBusy,
        }
    }
}

impl From<StorageError> for OrderError {
    fn from(e: StorageError) -> Self {
        OrderError::Storage(e.to_string())
    }
}

impl From<OrderError> for CommandError {
    fn from(e: OrderError) -> Self {
        CommandError::new(e.error_code(), e.to_string())
    }
}

/// Execution context for one command
///
/// Snapshots modified during execution are kept here and persisted by the
/// manager after event application, so a failing command leaves nothing
/// half-written.
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a TabStorage,
    sequence: u64,
    modified: HashMap<String, TabSnapshot>,
}

impl<'a> CommandContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a TabStorage, current_sequence: u64) -> Self {
        Self {
            txn,
            storage,
            sequence: current_sequence,
            modified: HashMap::new(),
        }
    }

    /// Allocate the next global sequence number
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Highest sequence allocated so far
    pub fn current_sequence(&self) -> u64 {
        self.sequence
    }

    /// Load a snapshot, preferring one already modified in this context
    pub fn load_snapshot(&mut self, order_id: &str) -> Result<TabSnapshot, OrderError> {
        if let Some(snapshot) = self.modified.get(order_id) {
            return Ok(snapshot.clone());
        }
        self.storage
            .get_snapshot_txn(self.txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    /// Record a snapshot as modified in this context
    pub fn save_snapshot(&mut self, snapshot: TabSnapshot) {
        self.modified.insert(snapshot.order_id.clone(), snapshot);
    }

    /// Snapshots touched during execution, to be persisted by the manager
    pub fn modified_snapshots(&self) -> impl Iterator<Item = &TabSnapshot> {
        self.modified.values()
    }

    pub fn txn(&self) -> &WriteTransaction {
        self.txn
    }

    pub fn storage(&self) -> &TabStorage {
        self.storage
    }
}

/// One command's validation and event production
#[async_trait]
pub trait CommandHandler {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<TabEvent>, OrderError>;
}

/// Pure event application: fold one event into a snapshot
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, snapshot: &mut TabSnapshot, event: &TabEvent);
}
