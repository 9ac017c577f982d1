//! Shared types for the Mesa guest-ordering platform
//!
//! Common types used by the server and its clients: order commands,
//! events and snapshots, session models, catalog models, and small
//! utility functions.

pub mod models;
pub mod order;
pub mod session;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
