//! Shared types for tab event sourcing

use serde::{Deserialize, Serialize};

// ============================================================================
// Item Status State Machine
// ============================================================================

/// Preparation status of one line item
///
/// Strict forward-only pipeline: `Pending → Preparing → Ready → Delivered`.
/// Kitchen staff advance one step at a time so progress is always
/// attributable to an action; guests and waiters only read the status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Delivered,
}

impl ItemStatus {
    /// The single legal successor in the pipeline, None at the end
    pub fn next(self) -> Option<ItemStatus> {
        match self {
            ItemStatus::Pending => Some(ItemStatus::Preparing),
            ItemStatus::Preparing => Some(ItemStatus::Ready),
            ItemStatus::Ready => Some(ItemStatus::Delivered),
            ItemStatus::Delivered => None,
        }
    }

    /// Whether advancing from `self` to `next` is a legal one-step move
    pub fn can_advance_to(self, next: ItemStatus) -> bool {
        self.next() == Some(next)
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::Pending => write!(f, "PENDING"),
            ItemStatus::Preparing => write!(f, "PREPARING"),
            ItemStatus::Ready => write!(f, "READY"),
            ItemStatus::Delivered => write!(f, "DELIVERED"),
        }
    }
}

// ============================================================================
// Item Types
// ============================================================================

/// Item input - what a cart submission carries
///
/// Name and unit price are resolved server-side from the catalog when the
/// command is processed, never trusted from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemInput {
    pub menu_item_id: i64,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Line item snapshot - complete snapshot for event recording
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemSnapshot {
    /// Server-assigned line item ID
    pub item_id: String,
    pub menu_item_id: i64,
    /// Name snapshot at order time
    pub name: String,
    /// Unit price snapshot in currency minor units
    pub unit_price: i64,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub status: ItemStatus,
    /// None when added by staff
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<String>,
    pub added_at: i64,
}

impl ItemSnapshot {
    /// Line subtotal = unit price snapshot × quantity
    pub fn subtotal(&self) -> i64 {
        self.unit_price * self.quantity as i64
    }
}

/// Line item view with derived fields for guest/kitchen screens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemView {
    pub item_id: String,
    pub menu_item_id: i64,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<String>,
    pub added_at: i64,
    pub subtotal: i64,
    /// Derived, never persisted: added after the kitchen last advanced
    /// any item on this tab and not yet acknowledged
    pub is_new: bool,
}

/// Payment snapshot recorded at closure - immutable, independent of
/// later reads of the tab
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentSnapshot {
    pub method: String,
    /// Computed total at closure, currency minor units
    pub amount: i64,
    pub paid_at: i64,
}

// ============================================================================
// Command Response
// ============================================================================

/// Command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Order ID touched by the command (set for OpenTab)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, order_id: Option<String>) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            order_id: None,
            error: Some(error),
        }
    }

    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            order_id: None,
            error: None,
        }
    }
}

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    OrderNotFound,
    OrderClosed,
    ItemNotFound,
    TableNotFound,
    MenuItemNotFound,
    SessionClosed,
    IllegalTransition,
    ConcurrencyConflict,
    InvalidQuantity,
    InvalidOperation,
    DuplicateCommand,
    InternalError,
    SystemBusy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_advances_one_step() {
        assert!(ItemStatus::Pending.can_advance_to(ItemStatus::Preparing));
        assert!(ItemStatus::Preparing.can_advance_to(ItemStatus::Ready));
        assert!(ItemStatus::Ready.can_advance_to(ItemStatus::Delivered));
    }

    #[test]
    fn test_status_rejects_skip_and_regression() {
        assert!(!ItemStatus::Pending.can_advance_to(ItemStatus::Ready));
        assert!(!ItemStatus::Pending.can_advance_to(ItemStatus::Delivered));
        assert!(!ItemStatus::Ready.can_advance_to(ItemStatus::Preparing));
        assert!(!ItemStatus::Delivered.can_advance_to(ItemStatus::Pending));
        assert!(ItemStatus::Delivered.next().is_none());
    }

    #[test]
    fn test_item_subtotal() {
        let item = ItemSnapshot {
            item_id: "item-1".to_string(),
            menu_item_id: 7,
            name: "Arepa".to_string(),
            unit_price: 8500,
            quantity: 2,
            note: None,
            status: ItemStatus::Pending,
            guest_id: None,
            added_at: 0,
        };
        assert_eq!(item.subtotal(), 17000);
    }
}
