//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Dining table entity - static reference data, pre-provisioned in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: i64,
    /// Display number shown to guests and staff ("5", "T12", ...)
    pub name: String,
    pub capacity: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
