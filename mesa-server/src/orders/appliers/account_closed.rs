//! AccountClosed event applier
//!
//! The payment snapshot takes its amount from the event payload, not from
//! the live total, so the payment trail survives later replays unchanged.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, PaymentSnapshot, TabEvent, TabSnapshot, TabStatus};

/// AccountClosed applier
pub struct AccountClosedApplier;

impl EventApplier for AccountClosedApplier {
    fn apply(&self, snapshot: &mut TabSnapshot, event: &TabEvent) {
        if let EventPayload::AccountClosed {
            payment_method,
            total,
        } = &event.payload
        {
            snapshot.status = TabStatus::Closed;
            snapshot.payment = Some(PaymentSnapshot {
                method: payment_method.clone(),
                amount: *total,
                paid_at: event.timestamp,
            });
            snapshot.closed_at = Some(event.timestamp);
            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}
