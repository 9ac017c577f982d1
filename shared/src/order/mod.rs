//! Tab Event Sourcing Module
//!
//! Types for the tab (open order) event sourcing system:
//! - Commands: requests from clients to mutate a tab
//! - Events: immutable facts recorded after command processing
//! - Snapshots: computed tab state from the event stream

pub mod command;
pub mod event;
pub mod snapshot;
pub mod types;

// Re-exports
pub use command::{TabCommand, TabCommandPayload};
pub use event::{EventPayload, TabEvent, TabEventType};
pub use snapshot::{TabSnapshot, TabStatus};
pub use types::*;
