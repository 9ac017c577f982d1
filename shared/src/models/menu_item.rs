//! Menu Item Model

use serde::{Deserialize, Serialize};

/// Menu item entity - read-only lookup for the order aggregate
///
/// Prices are integers in currency minor units. The order layer snapshots
/// `price` at the moment an item is added; later menu edits never change
/// already-submitted lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    /// Unit price in currency minor units
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
