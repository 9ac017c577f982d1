//! Tab events - immutable facts recorded after command processing

use super::types::{ItemSnapshot, ItemStatus};
use serde::{Deserialize, Serialize};

/// Tab event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabEvent {
    /// Event unique ID
    pub event_id: String,
    /// Global sequence number (for ordering and replay)
    pub sequence: u64,
    /// Order this event belongs to
    pub order_id: String,
    /// Server timestamp (Unix milliseconds) - authoritative for state
    /// evolution
    pub timestamp: i64,
    /// Who triggered this event (guest name or staff name, for audit)
    pub operator_name: String,
    /// Guest session owner, when guest-originated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<String>,
    /// Command that triggered this event
    pub command_id: String,
    /// Event type
    pub event_type: TabEventType,
    /// Event payload
    pub payload: EventPayload,
}

impl TabEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        order_id: String,
        operator_name: String,
        guest_id: Option<String>,
        command_id: String,
        event_type: TabEventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: crate::util::new_token(),
            sequence,
            order_id,
            timestamp: crate::util::now_millis(),
            operator_name,
            guest_id,
            command_id,
            event_type,
            payload,
        }
    }
}

/// Event type enumeration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TabEventType {
    // Lifecycle
    TabOpened,
    AccountClosed,

    // Items
    ItemsAdded,
    ItemStatusChanged,
    ItemQuantityAdjusted,
    ItemRemoved,
}

impl std::fmt::Display for TabEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TabEventType::TabOpened => write!(f, "TAB_OPENED"),
            TabEventType::AccountClosed => write!(f, "ACCOUNT_CLOSED"),
            TabEventType::ItemsAdded => write!(f, "ITEMS_ADDED"),
            TabEventType::ItemStatusChanged => write!(f, "ITEM_STATUS_CHANGED"),
            TabEventType::ItemQuantityAdjusted => write!(f, "ITEM_QUANTITY_ADJUSTED"),
            TabEventType::ItemRemoved => write!(f, "ITEM_REMOVED"),
        }
    }
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    // ========== Lifecycle ==========
    TabOpened {
        table_id: i64,
        table_name: String,
    },

    AccountClosed {
        payment_method: String,
        /// Computed total at closure (minor units) - the immutable
        /// payment trail
        total: i64,
    },

    // ========== Items ==========
    ItemsAdded {
        /// Complete snapshots of added items
        items: Vec<ItemSnapshot>,
    },

    ItemStatusChanged {
        item_id: String,
        from: ItemStatus,
        to: ItemStatus,
    },

    ItemQuantityAdjusted {
        item_id: String,
        from_quantity: i32,
        to_quantity: i32,
    },

    ItemRemoved {
        item_id: String,
        item_name: String,
    },
}
