//! QR and guest session models
//!
//! Two distinct credentials exist:
//! - **QR token**: table-scoped, single active generation per table.
//!   Encodes which physical table a scan originates from.
//! - **Guest session token**: per-visitor, minted at registration against
//!   a valid QR token. Multiple concurrent guest sessions per table.

use serde::{Deserialize, Serialize};

/// A QR session - one issuance generation of a table's QR code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrSession {
    /// Opaque token embedded in the QR access URL
    pub token: String,
    pub table_id: i64,
    pub issued_at: i64,
    pub expires_at: i64,
    /// False once superseded by a newer generation, explicitly
    /// deactivated, or retired at order closure
    pub is_active: bool,
}

impl QrSession {
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

/// A guest session - one visitor bound to a table through a QR scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestSession {
    /// Session token, distinct from the QR token
    pub token: String,
    pub guest_id: String,
    pub guest_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub table_id: i64,
    /// QR generation this session was registered through
    pub qr_token: String,
    pub is_active: bool,
    pub created_at: i64,
    pub expires_at: i64,
}

impl GuestSession {
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

/// Session context returned to the guest UI
///
/// Returned with `is_active=false` (not as an error) when the session
/// exists but was invalidated, so clients can distinguish "closed" from
/// "never existed" and show the right screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub guest_id: String,
    pub guest_name: String,
    pub table_id: i64,
    pub table_number: String,
    pub qr_token: String,
    pub is_active: bool,
}
