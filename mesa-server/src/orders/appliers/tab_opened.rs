//! TabOpened event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, TabEvent, TabSnapshot, TabStatus};

/// TabOpened applier
pub struct TabOpenedApplier;

impl EventApplier for TabOpenedApplier {
    fn apply(&self, snapshot: &mut TabSnapshot, event: &TabEvent) {
        if let EventPayload::TabOpened {
            table_id,
            table_name,
        } = &event.payload
        {
            snapshot.table_id = *table_id;
            snapshot.table_name = table_name.clone();
            snapshot.status = TabStatus::Open;
            snapshot.opened_at = event.timestamp;
            snapshot.updated_at = event.timestamp;
            snapshot.last_sequence = event.sequence;
        }
    }
}
