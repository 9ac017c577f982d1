use std::sync::Arc;

use serde::Serialize;
use shared::session::{GuestSession, QrSession, SessionInfo};
use shared::util::{new_token, now_millis};
use thiserror::Error;
use validator::Validate;

use crate::orders::{StorageError, TabStorage};
use crate::services::CatalogService;

/// Session issuer errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown QR token")]
    InvalidToken,

    #[error("QR token has expired")]
    ExpiredToken,

    #[error("QR token is no longer active")]
    InactiveToken,

    #[error("session not found")]
    SessionNotFound,

    #[error("session is no longer active")]
    SessionClosed,

    #[error("table {0} not found")]
    TableNotFound(i64),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<validator::ValidationErrors> for SessionError {
    fn from(errors: validator::ValidationErrors) -> Self {
        SessionError::Validation(errors.to_string())
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Session issuer configuration, lifted from `Config` at boot
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub qr_expiry_secs: i64,
    pub session_expiry_secs: i64,
    /// Base URL the QR access URL is built on
    pub public_url: String,
}

/// A freshly issued QR generation
///
/// `qr_url` is the payload a QR renderer encodes; image generation happens
/// client-side.
#[derive(Debug, Clone, Serialize)]
pub struct QrIssued {
    pub token: String,
    pub table_id: i64,
    pub qr_url: String,
    pub expires_at: i64,
}

#[derive(Debug, Validate)]
struct GuestRegistration {
    #[validate(length(min = 1, max = 48, message = "guest name must be 1 to 48 characters"))]
    guest_name: String,
    #[validate(length(max = 24, message = "phone must be at most 24 characters"))]
    phone: Option<String>,
}

/// QR and guest session issuer
///
/// All writes go through the shared `TabStorage` so closure-time
/// invalidation and issuance never race outside redb's single writer.
#[derive(Clone)]
pub struct SessionService {
    storage: TabStorage,
    catalog: Arc<CatalogService>,
    config: SessionConfig,
}

impl SessionService {
    pub fn new(storage: TabStorage, catalog: Arc<CatalogService>, config: SessionConfig) -> Self {
        Self {
            storage,
            catalog,
            config,
        }
    }

    /// Issue a new QR generation for a table
    ///
    /// The previous generation is flipped inactive in the same transaction,
    /// so at most one QR token per table accepts new registrations. Guests
    /// already registered through the retired token keep their sessions.
    pub fn generate(&self, table_id: i64) -> SessionResult<QrIssued> {
        self.catalog
            .table_name(table_id)
            .ok_or(SessionError::TableNotFound(table_id))?;

        let now = now_millis();
        let qr = QrSession {
            token: new_token(),
            table_id,
            issued_at: now,
            expires_at: now + self.config.qr_expiry_secs * 1000,
            is_active: true,
        };

        let txn = self.storage.begin_write()?;
        if let Some(mut prior) = self.storage.current_qr_for_table_txn(&txn, table_id)? {
            prior.is_active = false;
            self.storage.store_qr_session(&txn, &prior)?;
        }
        self.storage.store_qr_session(&txn, &qr)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(table_id, token = %qr.token, "QR generation issued");
        Ok(QrIssued {
            qr_url: self.qr_url(&qr.token),
            token: qr.token,
            table_id,
            expires_at: qr.expires_at,
        })
    }

    /// Check a QR token without side effects
    pub fn validate(&self, qr_token: &str) -> SessionResult<QrSession> {
        let qr = self
            .storage
            .get_qr_session(qr_token)?
            .ok_or(SessionError::InvalidToken)?;
        if qr.is_expired(now_millis()) {
            return Err(SessionError::ExpiredToken);
        }
        if !qr.is_active {
            return Err(SessionError::InactiveToken);
        }
        Ok(qr)
    }

    /// Retire the table's QR generation and every guest session on it
    pub fn deactivate(&self, table_id: i64) -> SessionResult<()> {
        let txn = self.storage.begin_write()?;
        self.storage.invalidate_table_sessions(&txn, table_id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(table_id, "Table sessions deactivated");
        Ok(())
    }

    /// Register a guest against a valid QR token
    pub fn register(
        &self,
        qr_token: &str,
        guest_name: &str,
        phone: Option<String>,
    ) -> SessionResult<GuestSession> {
        let registration = GuestRegistration {
            guest_name: guest_name.trim().to_string(),
            phone,
        };
        registration.validate()?;

        let qr = self.validate(qr_token)?;

        let now = now_millis();
        let session = GuestSession {
            token: new_token(),
            guest_id: new_token(),
            guest_name: registration.guest_name,
            phone: registration.phone,
            table_id: qr.table_id,
            qr_token: qr.token,
            is_active: true,
            created_at: now,
            expires_at: now + self.config.session_expiry_secs * 1000,
        };

        let txn = self.storage.begin_write()?;
        self.storage.store_guest_session(&txn, &session)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            table_id = session.table_id,
            guest_id = %session.guest_id,
            "Guest registered"
        );
        Ok(session)
    }

    /// Session context for the guest UI
    ///
    /// An invalidated session is still reported (with `is_active=false`)
    /// so clients can show "table closed" instead of "unknown session".
    pub fn session_info(&self, session_token: &str) -> SessionResult<SessionInfo> {
        let session = self
            .storage
            .get_guest_session(session_token)?
            .ok_or(SessionError::SessionNotFound)?;

        let table_number = self
            .catalog
            .table_name(session.table_id)
            .unwrap_or_else(|| session.table_id.to_string());

        let is_active = session.is_active && !session.is_expired(now_millis());
        Ok(SessionInfo {
            guest_id: session.guest_id,
            guest_name: session.guest_name,
            table_id: session.table_id,
            table_number,
            qr_token: session.qr_token,
            is_active,
        })
    }

    /// Check a session token against the guest it claims to act for
    ///
    /// Read-path counterpart of the in-transaction check the command
    /// pipeline runs on writes.
    pub fn authorize_guest(&self, session_token: &str, guest_id: &str) -> SessionResult<GuestSession> {
        let session = self
            .storage
            .get_guest_session(session_token)?
            .ok_or(SessionError::SessionNotFound)?;
        if session.guest_id != guest_id {
            return Err(SessionError::SessionNotFound);
        }
        if !session.is_active || session.is_expired(now_millis()) {
            return Err(SessionError::SessionClosed);
        }
        Ok(session)
    }

    fn qr_url(&self, token: &str) -> String {
        format!("{}/scan/{}", self.config.public_url.trim_end_matches('/'), token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::DiningTable;

    fn test_service_with_expiry(qr_expiry_secs: i64) -> SessionService {
        let storage = TabStorage::open_in_memory().unwrap();
        let catalog = CatalogService::new();
        catalog.load(
            vec![DiningTable {
                id: 5,
                name: "Table 5".to_string(),
                capacity: 4,
                is_active: true,
            }],
            Vec::new(),
        );
        SessionService::new(
            storage,
            Arc::new(catalog),
            SessionConfig {
                qr_expiry_secs,
                session_expiry_secs: qr_expiry_secs,
                public_url: "http://localhost:3000/".to_string(),
            },
        )
    }

    fn test_service() -> SessionService {
        test_service_with_expiry(3600)
    }

    #[test]
    fn test_generate_and_validate() {
        let service = test_service();

        let issued = service.generate(5).unwrap();
        assert_eq!(issued.table_id, 5);
        assert_eq!(issued.qr_url, format!("http://localhost:3000/scan/{}", issued.token));

        let qr = service.validate(&issued.token).unwrap();
        assert!(qr.is_active);
        assert_eq!(qr.table_id, 5);
    }

    #[test]
    fn test_generate_unknown_table_fails() {
        let service = test_service();
        assert!(matches!(
            service.generate(404),
            Err(SessionError::TableNotFound(404))
        ));
    }

    #[test]
    fn test_validate_unknown_token() {
        let service = test_service();
        assert!(matches!(
            service.validate("no-such-token"),
            Err(SessionError::InvalidToken)
        ));
    }

    #[test]
    fn test_validate_expired_token() {
        let service = test_service_with_expiry(-1);
        let issued = service.generate(5).unwrap();
        assert!(matches!(
            service.validate(&issued.token),
            Err(SessionError::ExpiredToken)
        ));
    }

    #[test]
    fn test_regeneration_retires_prior_generation() {
        let service = test_service();

        let first = service.generate(5).unwrap();
        let guest = service.register(&first.token, "Ana", None).unwrap();

        let second = service.generate(5).unwrap();

        // Old token stops accepting registrations
        assert!(matches!(
            service.validate(&first.token),
            Err(SessionError::InactiveToken)
        ));
        assert!(matches!(
            service.register(&first.token, "Luis", None),
            Err(SessionError::InactiveToken)
        ));
        assert!(service.validate(&second.token).is_ok());

        // Guests who joined through the old generation stay active
        let info = service.session_info(&guest.token).unwrap();
        assert!(info.is_active);
    }

    #[test]
    fn test_register_creates_session() {
        let service = test_service();
        let issued = service.generate(5).unwrap();

        let session = service
            .register(&issued.token, "  Ana  ", Some("555-0134".to_string()))
            .unwrap();
        assert_eq!(session.guest_name, "Ana"); // trimmed
        assert_eq!(session.table_id, 5);
        assert_ne!(session.token, issued.token);

        let info = service.session_info(&session.token).unwrap();
        assert!(info.is_active);
        assert_eq!(info.table_number, "Table 5");
        assert_eq!(info.guest_id, session.guest_id);
    }

    #[test]
    fn test_register_empty_name_fails() {
        let service = test_service();
        let issued = service.generate(5).unwrap();

        assert!(matches!(
            service.register(&issued.token, "   ", None),
            Err(SessionError::Validation(_))
        ));
    }

    #[test]
    fn test_deactivate_kills_everything() {
        let service = test_service();
        let issued = service.generate(5).unwrap();
        let guest = service.register(&issued.token, "Ana", None).unwrap();

        service.deactivate(5).unwrap();

        assert!(matches!(
            service.validate(&issued.token),
            Err(SessionError::InactiveToken)
        ));
        // Session still resolves, flagged inactive
        let info = service.session_info(&guest.token).unwrap();
        assert!(!info.is_active);
    }

    #[test]
    fn test_session_info_unknown_token() {
        let service = test_service();
        assert!(matches!(
            service.session_info("never-existed"),
            Err(SessionError::SessionNotFound)
        ));
    }

    #[test]
    fn test_authorize_guest() {
        let service = test_service();
        let issued = service.generate(5).unwrap();
        let guest = service.register(&issued.token, "Ana", None).unwrap();

        assert!(service.authorize_guest(&guest.token, &guest.guest_id).is_ok());
        assert!(matches!(
            service.authorize_guest(&guest.token, "someone-else"),
            Err(SessionError::SessionNotFound)
        ));

        service.deactivate(5).unwrap();
        assert!(matches!(
            service.authorize_guest(&guest.token, &guest.guest_id),
            Err(SessionError::SessionClosed)
        ));
    }
}
