//! OrdersManager - Core command processing and event generation
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Idempotency check (command_id)
//!     ├─ 2. OpenTab pre-checks (catalog table, existing open tab)
//!     ├─ 3. Begin write transaction (+ idempotency recheck)
//!     ├─ 4. Create CommandContext
//!     ├─ 5. Convert command to action and execute
//!     ├─ 6. Apply events to snapshots via EventApplier
//!     ├─ 7. Persist events, snapshots, open-tab index
//!     │     (closure also retires the table's sessions here)
//!     ├─ 8. Mark command processed
//!     ├─ 9. Commit transaction
//!     ├─ 10. Broadcast event(s)
//!     └─ 11. Return response
//! ```

mod error;
pub use error::*;

use super::actions::CommandAction;
use super::appliers::EventAction;
use super::storage::{StorageError, StorageResult, TabStorage};
use super::traits::{CommandContext, CommandHandler, CommandMetadata, EventApplier, OrderError};
use crate::services::CatalogService;
use shared::order::{
    CommandResponse, TabCommand, TabCommandPayload, TabEvent, TabSnapshot, TabStatus,
};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 16384;

/// OrdersManager for command processing
///
/// The `epoch` field is a unique identifier generated on each startup.
/// Clients use it to detect server restarts and trigger full resync.
pub struct OrdersManager {
    storage: TabStorage,
    event_tx: broadcast::Sender<TabEvent>,
    /// Server instance epoch - unique ID generated on startup
    epoch: String,
    /// Catalog service for table and menu item lookup
    catalog: Arc<CatalogService>,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<TabStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl OrdersManager {
    /// Create a new OrdersManager over already-opened storage
    pub fn new(storage: TabStorage, catalog: Arc<CatalogService>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "OrdersManager started with new epoch");
        Self {
            storage,
            event_tx,
            epoch,
            catalog,
        }
    }

    /// Subscribe to committed events
    pub fn subscribe(&self) -> broadcast::Receiver<TabEvent> {
        self.event_tx.subscribe()
    }

    /// Server instance epoch
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Access to the underlying storage
    pub fn storage(&self) -> &TabStorage {
        &self.storage
    }

    /// Execute a command and return the response
    pub fn execute_command(&self, cmd: TabCommand) -> CommandResponse {
        match self.process_command(cmd.clone()) {
            Ok((response, events)) => {
                // Broadcast events after successful commit
                for event in events {
                    if self.event_tx.send(event).is_err() {
                        tracing::warn!("Event broadcast failed: no active receivers");
                        break;
                    }
                }
                response
            }
            Err(err) => CommandResponse::error(cmd.command_id, err.into()),
        }
    }

    /// Process command and return response with events
    fn process_command(
        &self,
        cmd: TabCommand,
    ) -> ManagerResult<(CommandResponse, Vec<TabEvent>)> {
        tracing::debug!(command_id = %cmd.command_id, payload = ?cmd.payload, "Processing command");

        // 1. Idempotency check (before transaction)
        if self.storage.is_command_processed(&cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // 2. OpenTab pre-checks: the table must exist in the catalog, and
        //    an already-open tab is reused instead of duplicated
        let mut open_tab_table_name = None;
        if let TabCommandPayload::OpenTab { table_id, .. } = &cmd.payload {
            let name = self
                .catalog
                .table_name(*table_id)
                .ok_or(OrderError::TableNotFound(*table_id))?;

            if let Some(existing) = self.storage.find_open_tab_for_table(*table_id)? {
                tracing::info!(table_id, order_id = %existing, "Reusing open tab for table");
                return Ok((
                    CommandResponse::success(cmd.command_id, Some(existing)),
                    vec![],
                ));
            }
            open_tab_table_name = Some(name);
        }

        // 3. Begin write transaction
        let txn = self.storage.begin_write()?;

        // Double-check idempotency within transaction
        if self
            .storage
            .is_command_processed_txn(&txn, &cmd.command_id)?
        {
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // Recheck the open-tab index under the write lock. Two racing
        // OpenTab commands serialize on begin_write; the loser must see
        // the winner's index entry, or the table ends up with two open
        // orders.
        if let TabCommandPayload::OpenTab { table_id, .. } = &cmd.payload
            && let Some(existing) = self.storage.find_open_tab_for_table_txn(&txn, *table_id)?
        {
            tracing::info!(table_id, order_id = %existing, "Reusing open tab for table");
            return Ok((
                CommandResponse::success(cmd.command_id, Some(existing)),
                vec![],
            ));
        }

        // 4. Get current sequence for context initialization
        let current_sequence = self.storage.get_current_sequence()?;

        // 5. Create context and metadata
        let mut ctx = CommandContext::new(&txn, &self.storage, current_sequence);
        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            operator_name: cmd.operator_name.clone(),
            guest_id: cmd.guest_id.clone(),
            timestamp: cmd.timestamp,
        };

        // 6. Convert to action and execute
        // OpenTab carries the resolved table name; AddItems carries catalog
        // metadata so pricing never trusts the client
        let action: CommandAction = match &cmd.payload {
            TabCommandPayload::OpenTab {
                table_id,
                session_token,
            } => {
                let table_name = open_tab_table_name.ok_or_else(|| {
                    ManagerError::Internal("table name must be resolved for OpenTab".to_string())
                })?;
                CommandAction::OpenTab(super::actions::OpenTabAction {
                    table_id: *table_id,
                    table_name,
                    session_token: session_token.clone(),
                })
            }
            TabCommandPayload::AddItems {
                order_id,
                items,
                session_token,
            } => {
                let ids: Vec<i64> = items.iter().map(|i| i.menu_item_id).collect();
                CommandAction::AddItems(super::actions::AddItemsAction {
                    order_id: order_id.clone(),
                    items: items.clone(),
                    session_token: session_token.clone(),
                    item_metadata: self.catalog.get_item_meta_batch(&ids),
                })
            }
            _ => (&cmd).into(),
        };
        let events = futures::executor::block_on(action.execute(&mut ctx, &metadata))
            .map_err(ManagerError::from)?;

        // 7. Apply events to snapshots
        for event in &events {
            let mut snapshot = ctx.load_snapshot(&event.order_id).unwrap_or_else(|_| {
                // TabOpened fills the placeholder fields
                TabSnapshot::new(event.order_id.clone(), 0, String::new())
            });

            let applier: EventAction = event.into();
            applier.apply(&mut snapshot, event);

            ctx.save_snapshot(snapshot);
        }

        // 8. Persist events
        for event in &events {
            self.storage.store_event(&txn, event)?;
        }

        // 9. Persist snapshots, maintain the open-tab index, and run the
        //    closure saga: a snapshot that just closed takes its table's
        //    sessions down in the same transaction
        for snapshot in ctx.modified_snapshots() {
            self.storage.store_snapshot(&txn, snapshot)?;

            match snapshot.status {
                TabStatus::Open => {
                    self.storage
                        .mark_tab_open(&txn, snapshot.table_id, &snapshot.order_id)?;
                }
                TabStatus::Closed => {
                    self.storage.mark_tab_closed(&txn, snapshot.table_id)?;
                    self.storage
                        .invalidate_table_sessions(&txn, snapshot.table_id)?;
                }
            }
        }

        // 10. Update sequence counter
        let max_sequence = events
            .iter()
            .map(|e| e.sequence)
            .max()
            .unwrap_or(current_sequence);
        if max_sequence > current_sequence {
            self.storage.set_sequence(&txn, max_sequence)?;
        }

        // 11. Mark command processed
        self.storage.mark_command_processed(&txn, &cmd.command_id)?;

        // 12. Commit transaction
        txn.commit().map_err(StorageError::from)?;

        // 13. Return response
        let order_id = events.first().map(|e| e.order_id.clone());
        tracing::info!(command_id = %cmd.command_id, order_id = ?order_id, event_count = events.len(), "Command processed successfully");
        Ok((CommandResponse::success(cmd.command_id, order_id), events))
    }

    // ========== Queries ==========

    /// Get a tab snapshot
    pub fn get_snapshot(&self, order_id: &str) -> StorageResult<Option<TabSnapshot>> {
        self.storage.get_snapshot(order_id)
    }

    /// Get all open tab snapshots
    pub fn get_open_tabs(&self) -> StorageResult<Vec<TabSnapshot>> {
        self.storage.get_open_tabs()
    }

    /// Find the open order for a table, if any
    pub fn find_open_tab_for_table(&self, table_id: i64) -> StorageResult<Option<String>> {
        self.storage.find_open_tab_for_table(table_id)
    }

    /// Get the full event stream for an order
    pub fn get_events_for_order(&self, order_id: &str) -> StorageResult<Vec<TabEvent>> {
        self.storage.get_events_for_order(order_id)
    }

    /// Get all events after the given global sequence
    pub fn get_events_since(&self, sequence: u64) -> StorageResult<Vec<TabEvent>> {
        self.storage.get_events_since(sequence)
    }

    /// Current global sequence
    pub fn current_sequence(&self) -> StorageResult<u64> {
        self.storage.get_current_sequence()
    }

    /// Rebuild a snapshot by replaying the order's event stream
    ///
    /// Recovery and audit path; the stored snapshot is the fast path.
    pub fn rebuild_snapshot(&self, order_id: &str) -> ManagerResult<TabSnapshot> {
        let events = self.storage.get_events_for_order(order_id)?;
        if events.is_empty() {
            return Err(ManagerError::Order(OrderError::OrderNotFound(
                order_id.to_string(),
            )));
        }

        let mut snapshot = TabSnapshot::new(order_id.to_string(), 0, String::new());
        for event in &events {
            let applier: EventAction = event.into();
            applier.apply(&mut snapshot, event);
        }
        Ok(snapshot)
    }

    /// Create a manager over in-memory storage with the given catalog (for testing)
    #[cfg(test)]
    pub fn with_storage(storage: TabStorage, catalog: Arc<CatalogService>) -> Self {
        Self::new(storage, catalog)
    }
}

#[cfg(test)]
mod tests;
