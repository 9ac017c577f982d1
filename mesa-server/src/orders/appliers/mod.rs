//! Event applier implementations
//!
//! Each applier implements the `EventApplier` trait and handles
//! one specific event type. Appliers are PURE functions.

use enum_dispatch::enum_dispatch;

use shared::order::{EventPayload, TabEvent};

mod account_closed;
mod item_quantity_adjusted;
mod item_removed;
mod item_status_changed;
mod items_added;
mod tab_opened;

pub use account_closed::AccountClosedApplier;
pub use item_quantity_adjusted::ItemQuantityAdjustedApplier;
pub use item_removed::ItemRemovedApplier;
pub use item_status_changed::ItemStatusChangedApplier;
pub use items_added::ItemsAddedApplier;
pub use tab_opened::TabOpenedApplier;

/// EventAction enum - dispatches to concrete applier implementations
///
/// Uses enum_dispatch for zero-cost static dispatch.
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    TabOpened(TabOpenedApplier),
    ItemsAdded(ItemsAddedApplier),
    ItemStatusChanged(ItemStatusChangedApplier),
    ItemQuantityAdjusted(ItemQuantityAdjustedApplier),
    ItemRemoved(ItemRemovedApplier),
    AccountClosed(AccountClosedApplier),
}

/// Convert TabEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload.
impl From<&TabEvent> for EventAction {
    fn from(event: &TabEvent) -> Self {
        match &event.payload {
            EventPayload::TabOpened { .. } => EventAction::TabOpened(TabOpenedApplier),
            EventPayload::ItemsAdded { .. } => EventAction::ItemsAdded(ItemsAddedApplier),
            EventPayload::ItemStatusChanged { .. } => {
                EventAction::ItemStatusChanged(ItemStatusChangedApplier)
            }
            EventPayload::ItemQuantityAdjusted { .. } => {
                EventAction::ItemQuantityAdjusted(ItemQuantityAdjustedApplier)
            }
            EventPayload::ItemRemoved { .. } => EventAction::ItemRemoved(ItemRemovedApplier),
            EventPayload::AccountClosed { .. } => EventAction::AccountClosed(AccountClosedApplier),
        }
    }
}
