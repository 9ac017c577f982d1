//! QR / guest session issuer
//!
//! Two credentials with different lifetimes:
//! - the QR token, one active generation per table, embedded in the
//!   printed/displayed access URL
//! - the guest session token, minted per visitor at registration
//!
//! Both live in the same redb database as the tabs, so order closure can
//! retire them in the closing transaction.

mod service;

pub use service::{QrIssued, SessionConfig, SessionError, SessionResult, SessionService};
