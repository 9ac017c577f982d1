use super::super::storage::StorageError;
use super::super::traits::OrderError;
use shared::order::{CommandError, CommandErrorCode};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Classify a storage error into an error code (clients localize messages)
fn classify_storage_error(e: &StorageError) -> CommandErrorCode {
    match e {
        StorageError::Serialization(_) => CommandErrorCode::InternalError,
        StorageError::OrderNotFound(_) => CommandErrorCode::OrderNotFound,
        // redb Database/Transaction/Table/Storage/Commit errors
        _ => CommandErrorCode::SystemBusy,
    }
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(&e);
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                CommandError::new(code, e.to_string())
            }
            ManagerError::Order(e) => e.into(),
            ManagerError::Internal(msg) => CommandError::new(CommandErrorCode::InternalError, msg),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
