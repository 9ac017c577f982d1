//! ItemRemoved event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, TabEvent, TabSnapshot};

/// ItemRemoved applier
pub struct ItemRemovedApplier;

impl EventApplier for ItemRemovedApplier {
    fn apply(&self, snapshot: &mut TabSnapshot, event: &TabEvent) {
        if let EventPayload::ItemRemoved { item_id, .. } = &event.payload {
            snapshot.items.retain(|item| item.item_id != *item_id);

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.recalculate_total();
        }
    }
}
