//! Tab Event Sourcing Module
//!
//! This module implements tab management using event sourcing:
//!
//! - **manager**: Core OrdersManager for command processing and event generation
//! - **storage**: redb-based persistence layer for events, snapshots, sessions and indices
//! - **actions**: Command handlers (validation + event production)
//! - **appliers**: Pure event application onto snapshots
//!
//! # Data Flow
//!
//! 1. Client sends TabCommand via the HTTP API
//! 2. OrdersManager validates and processes the command
//! 3. TabEvent is generated with a global sequence
//! 4. Event is persisted to redb (transactional)
//! 5. Snapshot is updated; closure retires the table's sessions
//! 6. Event is broadcast to all subscribers
//! 7. CommandResponse is returned to the client

pub mod actions;
pub mod appliers;
pub mod manager;
pub mod storage;
pub mod traits;

// Re-exports
pub use manager::{ManagerError, ManagerResult, OrdersManager};
pub use storage::{StorageError, StorageResult, TabStorage};
pub use traits::{CommandContext, CommandHandler, CommandMetadata, EventApplier, OrderError};

// Re-export shared types for convenience
pub use shared::order::{
    CommandError, CommandErrorCode, CommandResponse, EventPayload, TabCommand, TabCommandPayload,
    TabEvent, TabEventType, TabSnapshot, TabStatus,
};
