//! ItemStatusChanged event applier
//!
//! Besides moving the line, records the advance time on the snapshot.
//! The "new" badge on kitchen screens is derived from it: Pending items
//! added after the last advance are flagged.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, TabEvent, TabSnapshot};

/// ItemStatusChanged applier
pub struct ItemStatusChangedApplier;

impl EventApplier for ItemStatusChangedApplier {
    fn apply(&self, snapshot: &mut TabSnapshot, event: &TabEvent) {
        if let EventPayload::ItemStatusChanged { item_id, to, .. } = &event.payload {
            if let Some(item) = snapshot.find_item_mut(item_id) {
                item.status = *to;
            }

            snapshot.last_kitchen_advance_at = Some(event.timestamp);
            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::appliers::test_support::{test_event, test_item};
    use shared::order::{ItemStatus, TabEventType};

    #[test]
    fn test_status_change_moves_item_and_stamps_advance() {
        let mut snapshot = TabSnapshot::new("order-1".to_string(), 5, "Table 5".to_string());
        snapshot.items.push(test_item("item-1", "Arepa", 8500, 2));

        let event = test_event(
            "order-1",
            2,
            TabEventType::ItemStatusChanged,
            EventPayload::ItemStatusChanged {
                item_id: "item-1".to_string(),
                from: ItemStatus::Pending,
                to: ItemStatus::Preparing,
            },
        );

        ItemStatusChangedApplier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.items[0].status, ItemStatus::Preparing);
        assert_eq!(snapshot.last_kitchen_advance_at, Some(event.timestamp));
        assert_eq!(snapshot.last_sequence, 2);
    }

    #[test]
    fn test_status_change_missing_item_still_stamps() {
        // Item may have been removed by a concurrent staff adjustment;
        // the advance time is still a fact worth recording
        let mut snapshot = TabSnapshot::new("order-1".to_string(), 5, "Table 5".to_string());

        let event = test_event(
            "order-1",
            3,
            TabEventType::ItemStatusChanged,
            EventPayload::ItemStatusChanged {
                item_id: "gone".to_string(),
                from: ItemStatus::Pending,
                to: ItemStatus::Preparing,
            },
        );

        ItemStatusChangedApplier.apply(&mut snapshot, &event);

        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.last_sequence, 3);
    }
}
