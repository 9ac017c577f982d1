//! ItemsAdded event applier
//!
//! Appends item snapshots recorded in the event. Names and prices come
//! from the event, never from the live catalog, so replay is stable
//! against later menu edits.
//!
//! A matching Pending line (same menu item, note, price and owner) is
//! merged by quantity instead of duplicated, so a guest tapping the same
//! dish twice gets one line. The merge is part of event application and
//! therefore replays identically.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, ItemSnapshot, ItemStatus, TabEvent, TabSnapshot};

/// ItemsAdded applier
pub struct ItemsAddedApplier;

fn mergeable(existing: &ItemSnapshot, incoming: &ItemSnapshot) -> bool {
    existing.status == ItemStatus::Pending
        && existing.menu_item_id == incoming.menu_item_id
        && existing.note == incoming.note
        && existing.unit_price == incoming.unit_price
        && existing.guest_id == incoming.guest_id
}

impl EventApplier for ItemsAddedApplier {
    fn apply(&self, snapshot: &mut TabSnapshot, event: &TabEvent) {
        if let EventPayload::ItemsAdded { items } = &event.payload {
            for incoming in items {
                match snapshot.items.iter_mut().find(|i| mergeable(i, incoming)) {
                    Some(existing) => {
                        existing.quantity += incoming.quantity;
                        // Latest add drives the "new" flag
                        existing.added_at = incoming.added_at;
                    }
                    None => snapshot.items.push(incoming.clone()),
                }
            }

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.recalculate_total();
        }
    }
}
