//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{TabCommand, TabCommandPayload, TabEvent};
use shared::util::now_millis;

mod add_items;
mod adjust_item_quantity;
mod close_account;
mod open_tab;
mod update_item_status;

pub use add_items::AddItemsAction;
pub use adjust_item_quantity::AdjustItemQuantityAction;
pub use close_account::CloseAccountAction;
pub use open_tab::OpenTabAction;
pub use update_item_status::UpdateItemStatusAction;

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    OpenTab(OpenTabAction),
    AddItems(AddItemsAction),
    UpdateItemStatus(UpdateItemStatusAction),
    AdjustItemQuantity(AdjustItemQuantityAction),
    CloseAccount(CloseAccountAction),
}

/// Manual implementation of CommandHandler for CommandAction
#[async_trait]
impl CommandHandler for CommandAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<TabEvent>, OrderError> {
        match self {
            CommandAction::OpenTab(action) => action.execute(ctx, metadata).await,
            CommandAction::AddItems(action) => action.execute(ctx, metadata).await,
            CommandAction::UpdateItemStatus(action) => action.execute(ctx, metadata).await,
            CommandAction::AdjustItemQuantity(action) => action.execute(ctx, metadata).await,
            CommandAction::CloseAccount(action) => action.execute(ctx, metadata).await,
        }
    }
}

/// Convert TabCommand to CommandAction
///
/// This is the ONLY place with a match on TabCommandPayload. OpenTab and
/// AddItems are built by the manager instead, because they carry data
/// resolved from the catalog.
impl From<&TabCommand> for CommandAction {
    fn from(cmd: &TabCommand) -> Self {
        match &cmd.payload {
            TabCommandPayload::OpenTab { .. } => {
                unreachable!("OpenTab is built by OrdersManager with the resolved table name")
            }
            TabCommandPayload::AddItems { .. } => {
                unreachable!("AddItems is built by OrdersManager with catalog metadata")
            }
            TabCommandPayload::UpdateItemStatus {
                order_id,
                item_id,
                next_status,
            } => CommandAction::UpdateItemStatus(UpdateItemStatusAction {
                order_id: order_id.clone(),
                item_id: item_id.clone(),
                next_status: *next_status,
            }),
            TabCommandPayload::AdjustItemQuantity {
                order_id,
                item_id,
                quantity,
            } => CommandAction::AdjustItemQuantity(AdjustItemQuantityAction {
                order_id: order_id.clone(),
                item_id: item_id.clone(),
                quantity: *quantity,
            }),
            TabCommandPayload::CloseAccount {
                order_id,
                payment_method,
                expected_sequence,
            } => CommandAction::CloseAccount(CloseAccountAction {
                order_id: order_id.clone(),
                payment_method: payment_method.clone(),
                expected_sequence: *expected_sequence,
            }),
        }
    }
}

/// Re-validate a guest session inside the write transaction
///
/// Registration-time validation is not enough: closure may have retired
/// the session between the HTTP check and command execution.
pub(crate) fn validate_guest_session(
    ctx: &CommandContext<'_>,
    token: &str,
    table_id: i64,
) -> Result<(), OrderError> {
    let session = ctx
        .storage()
        .get_guest_session_txn(ctx.txn(), token)?
        .ok_or(OrderError::SessionClosed)?;

    if !session.is_active || session.is_expired(now_millis()) || session.table_id != table_id {
        return Err(OrderError::SessionClosed);
    }

    Ok(())
}
