//! Tab commands - requests from clients to mutate a tab

use super::types::{ItemInput, ItemStatus};
use serde::{Deserialize, Serialize};

/// Tab command envelope
///
/// `command_id` is the idempotency key: re-submitting the same command
/// (client retry after a dropped response) is detected server-side and
/// acknowledged without re-applying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabCommand {
    pub command_id: String,
    /// Client timestamp (Unix milliseconds), for audit
    pub timestamp: i64,
    /// Who triggered the command: guest display name or staff name
    pub operator_name: String,
    /// Set when the command originates from a guest session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<String>,
    pub payload: TabCommandPayload,
}

impl TabCommand {
    pub fn new(operator_name: impl Into<String>, payload: TabCommandPayload) -> Self {
        Self {
            command_id: crate::util::new_token(),
            timestamp: crate::util::now_millis(),
            operator_name: operator_name.into(),
            guest_id: None,
            payload,
        }
    }

    pub fn from_guest(
        operator_name: impl Into<String>,
        guest_id: impl Into<String>,
        payload: TabCommandPayload,
    ) -> Self {
        Self {
            guest_id: Some(guest_id.into()),
            ..Self::new(operator_name, payload)
        }
    }
}

/// Command payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TabCommandPayload {
    /// Open a tab for a table, or reuse the existing open one (idempotent)
    OpenTab {
        table_id: i64,
        /// Guest path: session token re-validated inside the write
        /// transaction
        #[serde(skip_serializing_if = "Option::is_none")]
        session_token: Option<String>,
    },

    /// Append items to a tab; each starts Pending
    AddItems {
        order_id: String,
        items: Vec<ItemInput>,
        #[serde(skip_serializing_if = "Option::is_none")]
        session_token: Option<String>,
    },

    /// Kitchen advances one item one step
    UpdateItemStatus {
        order_id: String,
        item_id: String,
        next_status: ItemStatus,
    },

    /// Staff override of a line quantity; <= 0 removes the line
    AdjustItemQuantity {
        order_id: String,
        item_id: String,
        quantity: i32,
    },

    /// Cashier finalization: close + payment snapshot + session purge
    CloseAccount {
        order_id: String,
        payment_method: String,
        /// Optimistic check against the tab's last applied sequence
        #[serde(skip_serializing_if = "Option::is_none")]
        expected_sequence: Option<u64>,
    },
}
