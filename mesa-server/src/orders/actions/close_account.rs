//! CloseAccount command handler
//!
//! Cashier finalization. The recorded total is computed server-side from
//! the snapshot at execution time; `expected_sequence` lets the cashier
//! detect items added between showing the bill and confirming payment.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, TabEvent, TabEventType};

/// CloseAccount action
#[derive(Debug, Clone)]
pub struct CloseAccountAction {
    pub order_id: String,
    pub payment_method: String,
    /// Optimistic check against the tab's last applied sequence
    pub expected_sequence: Option<u64>,
}

#[async_trait]
impl CommandHandler for CloseAccountAction {
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

        // 2. Optimistic concurrency check
        if let Some(expected) = self.expected_sequence
            && expected != snapshot.last_sequence
        {
            return Err(OrderError::ConcurrencyConflict(format!(
                "order {} is at sequence {}, expected {}",
                self.order_id, snapshot.last_sequence, expected
            )));
        }

        // 3. Create event with the server-computed total
        let seq = ctx.next_sequence();
        let event = TabEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_name.clone(),
            metadata.guest_id.clone(),
            metadata.command_id.clone(),
            TabEventType::AccountClosed,
            EventPayload::AccountClosed {
                payment_method: self.payment_method.clone(),
                total: snapshot.total,
            },
        );

        Ok(vec![event])
    }
}
