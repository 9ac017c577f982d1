//! ItemQuantityAdjusted event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, TabEvent, TabSnapshot};

/// ItemQuantityAdjusted applier
pub struct ItemQuantityAdjustedApplier;

impl EventApplier for ItemQuantityAdjustedApplier {
    fn apply(&self, snapshot: &mut TabSnapshot, event: &TabEvent) {
        if let EventPayload::ItemQuantityAdjusted {
            item_id,
            to_quantity,
            ..
        } = &event.payload
        {
            if let Some(item) = snapshot.find_item_mut(item_id) {
                item.quantity = *to_quantity;
            }

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.recalculate_total();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::appliers::test_support::{test_event, test_item};
    use shared::order::TabEventType;

    #[test]
    fn test_quantity_adjustment_recalculates_total() {
        let mut snapshot = TabSnapshot::new("order-1".to_string(), 5, "Table 5".to_string());
        snapshot.items.push(test_item("item-1", "Arepa", 8500, 3));
        snapshot.recalculate_total();
        assert_eq!(snapshot.total, 25500);

        let event = test_event(
            "order-1",
            2,
            TabEventType::ItemQuantityAdjusted,
            EventPayload::ItemQuantityAdjusted {
                item_id: "item-1".to_string(),
                from_quantity: 3,
                to_quantity: 1,
            },
        );

        ItemQuantityAdjustedApplier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.items[0].quantity, 1);
        assert_eq!(snapshot.total, 8500);
        assert_eq!(snapshot.last_sequence, 2);
    }
}
