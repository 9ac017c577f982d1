//! UpdateItemStatus command handler
//!
//! Kitchen staff advance one item exactly one step along
//! Pending -> Preparing -> Ready -> Delivered. Skips and regressions are
//! rejected so every move stays attributable.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, ItemStatus, TabEvent, TabEventType};

/// UpdateItemStatus action
#[derive(Debug, Clone)]
pub struct UpdateItemStatusAction {
    pub order_id: String,
    pub item_id: String,
    pub next_status: ItemStatus,
}

#[async_trait]
impl CommandHandler for UpdateItemStatusAction {
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

        // 3. One-step advance only
        if !item.status.can_advance_to(self.next_status) {
            return Err(OrderError::IllegalTransition(format!(
                "item {} cannot move {} -> {}",
                self.item_id, item.status, self.next_status
            )));
        }

        // 4. Create event
        let seq = ctx.next_sequence();
        let event = TabEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_name.clone(),
            metadata.guest_id.clone(),
            metadata.command_id.clone(),
            TabEventType::ItemStatusChanged,
            EventPayload::ItemStatusChanged {
                item_id: self.item_id.clone(),
                from: item.status,
                to: self.next_status,
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::appliers::test_support::test_item;
    use crate::orders::storage::TabStorage;
    use shared::order::{TabSnapshot, TabStatus};

    fn create_test_metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            operator_name: "Kitchen".to_string(),
            guest_id: None,
            timestamp: 1234567890,
        }
    }

    fn seed_order(storage: &TabStorage, txn: &redb::WriteTransaction, status: ItemStatus) {
        let mut snapshot = TabSnapshot::new("order-1".to_string(), 5, "Table 5".to_string());
        let mut item = test_item("item-1", "Arepa", 8500, 2);
        item.status = status;
        snapshot.items.push(item);
        storage.store_snapshot(txn, &snapshot).unwrap();
    }

    #[tokio::test]
    async fn test_one_step_advance_succeeds() {
        let storage = TabStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_order(&storage, &txn, ItemStatus::Pending);

        let mut ctx = CommandContext::new(&txn, &storage, 1);
        let action = UpdateItemStatusAction {
            order_id: "order-1".to_string(),
            item_id: "item-1".to_string(),
            next_status: ItemStatus::Preparing,
        };

        let events = action.execute(&mut ctx, &create_test_metadata()).await.unwrap();
        assert_eq!(events.len(), 1);

        if let EventPayload::ItemStatusChanged { from, to, .. } = &events[0].payload {
            assert_eq!(*from, ItemStatus::Pending);
            assert_eq!(*to, ItemStatus::Preparing);
        } else {
            panic!("Expected ItemStatusChanged payload");
        }
    }

    #[tokio::test]
    async fn test_skip_ahead_fails() {
        let storage = TabStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_order(&storage, &txn, ItemStatus::Pending);

        let mut ctx = CommandContext::new(&txn, &storage, 1);
        let action = UpdateItemStatusAction {
            order_id: "order-1".to_string(),
            item_id: "item-1".to_string(),
            next_status: ItemStatus::Ready,
        };

        let result = action.execute(&mut ctx, &create_test_metadata()).await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
    }

    #[tokio::test]
    async fn test_regression_fails() {
        let storage = TabStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_order(&storage, &txn, ItemStatus::Ready);

        let mut ctx = CommandContext::new(&txn, &storage, 1);
        let action = UpdateItemStatusAction {
            order_id: "order-1".to_string(),
            item_id: "item-1".to_string(),
            next_status: ItemStatus::Preparing,
        };

        let result = action.execute(&mut ctx, &create_test_metadata()).await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
    }

    #[tokio::test]
    async fn test_delivered_is_terminal() {
        let storage = TabStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_order(&storage, &txn, ItemStatus::Delivered);

        let mut ctx = CommandContext::new(&txn, &storage, 1);
        let action = UpdateItemStatusAction {
            order_id: "order-1".to_string(),
            item_id: "item-1".to_string(),
            next_status: ItemStatus::Pending,
        };

        let result = action.execute(&mut ctx, &create_test_metadata()).await;
        assert!(matches!(result, Err(OrderError::IllegalTransition(_))));
    }

    #[tokio::test]
    async fn test_missing_item_fails() {
        let storage = TabStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_order(&storage, &txn, ItemStatus::Pending);

        let mut ctx = CommandContext::new(&txn, &storage, 1);
        let action = UpdateItemStatusAction {
            order_id: "order-1".to_string(),
            item_id: "missing".to_string(),
            next_status: ItemStatus::Preparing,
        };

        let result = action.execute(&mut ctx, &create_test_metadata()).await;
        assert!(matches!(result, Err(OrderError::ItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_closed_order_fails() {
        let storage = TabStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();

        let mut snapshot = TabSnapshot::new("order-1".to_string(), 5, "Table 5".to_string());
        snapshot.items.push(test_item("item-1", "Arepa", 8500, 2));
        snapshot.status = TabStatus::Closed;
        storage.store_snapshot(&txn, &snapshot).unwrap();

        let mut ctx = CommandContext::new(&txn, &storage, 1);
        let action = UpdateItemStatusAction {
            order_id: "order-1".to_string(),
            item_id: "item-1".to_string(),
            next_status: ItemStatus::Preparing,
        };

        let result = action.execute(&mut ctx, &create_test_metadata()).await;
        assert!(matches!(result, Err(OrderError::OrderClosed(_))));
    }
}
