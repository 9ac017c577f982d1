//! AddItems command handler
//!
//! Appends items to an open tab. Names and prices are resolved from the
//! catalog metadata injected by the manager, never trusted from the
//! client.

use std::collections::HashMap;

use async_trait::async_trait;

use super::validate_guest_session;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::services::catalog::MenuItemMeta;
use shared::order::{EventPayload, ItemInput, ItemSnapshot, ItemStatus, TabEvent, TabEventType};
use shared::util::now_millis;

/// AddItems action
#[derive(Debug, Clone)]
pub struct AddItemsAction {
    pub order_id: String,
    pub items: Vec<ItemInput>,
    /// Guest path: session token re-validated inside the transaction
    pub session_token: Option<String>,
    /// Catalog metadata injected by the manager
    pub item_metadata: HashMap<i64, MenuItemMeta>,
}

#[async_trait]
impl CommandHandler for AddItemsAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<TabEvent>, OrderError> {
        // 1. Load existing snapshot and validate status
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        if !snapshot.is_open() {
            return Err(OrderError::OrderClosed(self.order_id.clone()));
        }

        // 2. Guest path: the session must still be live at execution time
        if let Some(token) = &self.session_token {
            validate_guest_session(ctx, token, snapshot.table_id)?;
        }

        // 3. Validate inputs and resolve catalog data
        if self.items.is_empty() {
            return Err(OrderError::InvalidQuantity("no items submitted".to_string()));
        }

        let added_at = now_millis();
        let mut item_snapshots = Vec::with_capacity(self.items.len());
        for input in &self.items {
            if input.quantity <= 0 {
                return Err(OrderError::InvalidQuantity(format!(
                    "quantity must be positive, got {}",
                    input.quantity
                )));
            }
            let meta = self
                .item_metadata
                .get(&input.menu_item_id)
                .ok_or(OrderError::MenuItemNotFound(input.menu_item_id))?;

            item_snapshots.push(ItemSnapshot {
                item_id: uuid::Uuid::new_v4().to_string(),
                menu_item_id: input.menu_item_id,
                name: meta.name.clone(),
                unit_price: meta.price,
                quantity: input.quantity,
                note: input.note.clone(),
                status: ItemStatus::Pending,
                guest_id: metadata.guest_id.clone(),
                added_at,
            });
        }

        // 4. Allocate sequence and create event
        let seq = ctx.next_sequence();
        let event = TabEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_name.clone(),
            metadata.guest_id.clone(),
            metadata.command_id.clone(),
            TabEventType::ItemsAdded,
            EventPayload::ItemsAdded {
                items: item_snapshots,
            },
        );

        Ok(vec![event])
    }
}
