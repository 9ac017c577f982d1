//! AdjustItemQuantity command handler
//!
//! Staff override of a line quantity. Decreases (including removal via
//! quantity <= 0) are only allowed while the line is still Pending; once
//! the kitchen has acknowledged it the physical work is underway and the
//! line can only grow.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, ItemStatus, TabEvent, TabEventType};

/// AdjustItemQuantity action
#[derive(Debug, Clone)]
pub struct AdjustItemQuantityAction {
    pub order_id: String,
    pub item_id: String,
    pub quantity: i32,
}

#[async_trait]
impl CommandHandler for AdjustItemQuantityAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<TabEvent>, OrderError> {
        // 1. Load snapshot and validate status
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        if !snapshot.is_open() {
            return Err(OrderError::OrderClosed(self.order_id.clone()));
        }

        // 2. Locate the item
        let item = snapshot
            .find_item(&self.item_id)
            .ok_or_else(|| OrderError::ItemNotFound(self.item_id.clone()))?;

        // 3. Shrinking an acknowledged line is not allowed
        if self.quantity < item.quantity && item.status != ItemStatus::Pending {
            return Err(OrderError::IllegalTransition(format!(
                "item {} is {} and can no longer shrink",
                self.item_id, item.status
            )));
        }

        // 4. Removal or adjustment
        let payload = if self.quantity <= 0 {
            EventPayload::ItemRemoved {
                item_id: self.item_id.clone(),
                item_name: item.name.clone(),
            }
        } else {
            if self.quantity == item.quantity {
                // Nothing to change
                return Ok(vec![]);
            }
            EventPayload::ItemQuantityAdjusted {
                item_id: self.item_id.clone(),
                from_quantity: item.quantity,
                to_quantity: self.quantity,
            }
        };

        let event_type = match payload {
            EventPayload::ItemRemoved { .. } => TabEventType::ItemRemoved,
            _ => TabEventType::ItemQuantityAdjusted,
        };

        let seq = ctx.next_sequence();
        let event = TabEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_name.clone(),
            metadata.guest_id.clone(),
            metadata.command_id.clone(),
            event_type,
            payload,
        );

        Ok(vec![event])
    }
}
