//! Tab snapshot - computed state from the event stream

use super::types::{ItemSnapshot, ItemStatus, ItemView, PaymentSnapshot};
use serde::{Deserialize, Serialize};

/// Tab status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TabStatus {
    #[default]
    Open,
    Closed,
}

/// Tab snapshot - computed from the event stream
///
/// `total` is always recomputed from item subtotals after every applied
/// event; it is never tracked independently, so it cannot drift.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabSnapshot {
    /// Order ID (assigned by server)
    pub order_id: String,
    pub table_id: i64,
    pub table_name: String,
    pub status: TabStatus,
    /// Items in submission order
    pub items: Vec<ItemSnapshot>,
    /// Derived: sum of item subtotals, currency minor units
    pub total: i64,
    /// Payment snapshot, set exactly once at closure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentSnapshot>,
    pub opened_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<i64>,
    pub updated_at: i64,
    /// Last applied event sequence (optimistic concurrency anchor)
    pub last_sequence: u64,
    /// Last time the kitchen advanced any item on this tab; drives the
    /// derived "new item" flag on views
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_kitchen_advance_at: Option<i64>,
}

impl TabSnapshot {
    /// Create a new open tab
    pub fn new(order_id: String, table_id: i64, table_name: String) -> Self {
        let now = crate::util::now_millis();
        Self {
            order_id,
            table_id,
            table_name,
            status: TabStatus::Open,
            items: Vec::new(),
            total: 0,
            payment: None,
            opened_at: now,
            closed_at: None,
            updated_at: now,
            last_sequence: 0,
            last_kitchen_advance_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == TabStatus::Open
    }

    /// Recompute `total` from item subtotals
    pub fn recalculate_total(&mut self) {
        self.total = self.items.iter().map(ItemSnapshot::subtotal).sum();
    }

    pub fn find_item(&self, item_id: &str) -> Option<&ItemSnapshot> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    pub fn find_item_mut(&mut self, item_id: &str) -> Option<&mut ItemSnapshot> {
        self.items.iter_mut().find(|i| i.item_id == item_id)
    }

    /// Sum of subtotals over one guest's items
    pub fn guest_total(&self, guest_id: &str) -> i64 {
        self.items
            .iter()
            .filter(|i| i.guest_id.as_deref() == Some(guest_id))
            .map(ItemSnapshot::subtotal)
            .sum()
    }

    /// Whether an item would currently be flagged "new" on kitchen views
    ///
    /// A line appended after the kitchen last acted on this tab must not
    /// silently blend in with already-served items; the flag clears as
    /// soon as the kitchen advances the item once.
    pub fn is_item_new(&self, item: &ItemSnapshot) -> bool {
        item.status == ItemStatus::Pending
            && self
                .last_kitchen_advance_at
                .is_some_and(|t| item.added_at > t)
    }

    /// Project items into views with derived fields
    pub fn item_views(&self) -> Vec<ItemView> {
        self.items
            .iter()
            .map(|item| ItemView {
                item_id: item.item_id.clone(),
                menu_item_id: item.menu_item_id,
                name: item.name.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
                note: item.note.clone(),
                status: item.status,
                guest_id: item.guest_id.clone(),
                added_at: item.added_at,
                subtotal: item.subtotal(),
                is_new: self.is_item_new(item),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: i64, qty: i32, guest: Option<&str>) -> ItemSnapshot {
        ItemSnapshot {
            item_id: id.to_string(),
            menu_item_id: 1,
            name: "Test".to_string(),
            unit_price: price,
            quantity: qty,
            note: None,
            status: ItemStatus::Pending,
            guest_id: guest.map(str::to_string),
            added_at: 100,
        }
    }

    #[test]
    fn test_total_is_sum_of_subtotals() {
        let mut tab = TabSnapshot::new("order-1".to_string(), 5, "5".to_string());
        tab.items.push(item("a", 8500, 2, None));
        tab.items.push(item("b", 12000, 1, None));
        tab.recalculate_total();
        assert_eq!(tab.total, 29000);
    }

    #[test]
    fn test_guest_total_filters_by_owner() {
        let mut tab = TabSnapshot::new("order-1".to_string(), 5, "5".to_string());
        tab.items.push(item("a", 8500, 2, Some("ana")));
        tab.items.push(item("b", 12000, 1, Some("luis")));
        tab.items.push(item("c", 3000, 1, None));
        assert_eq!(tab.guest_total("ana"), 17000);
        assert_eq!(tab.guest_total("luis"), 12000);
    }

    #[test]
    fn test_new_flag_requires_prior_kitchen_action() {
        let mut tab = TabSnapshot::new("order-1".to_string(), 5, "5".to_string());
        let line = item("a", 8500, 1, None);

        // No kitchen action yet: nothing is "new"
        assert!(!tab.is_item_new(&line));

        // Kitchen acted before the item was added: flagged
        tab.last_kitchen_advance_at = Some(50);
        assert!(tab.is_item_new(&line));

        // Kitchen acted after: not flagged
        tab.last_kitchen_advance_at = Some(150);
        assert!(!tab.is_item_new(&line));

        // Advancing the item clears the flag regardless of timestamps
        let mut acked = item("b", 8500, 1, None);
        acked.status = ItemStatus::Preparing;
        tab.last_kitchen_advance_at = Some(50);
        assert!(!tab.is_item_new(&acked));
    }
}
