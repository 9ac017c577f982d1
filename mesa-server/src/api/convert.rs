//! Command pipeline to HTTP error mapping

use shared::order::{CommandError, CommandErrorCode, CommandResponse};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Map a rejected command onto the HTTP error taxonomy
pub fn command_error(err: CommandError) -> AppError {
    match err.code {
        CommandErrorCode::OrderNotFound
        | CommandErrorCode::ItemNotFound
        | CommandErrorCode::MenuItemNotFound
        | CommandErrorCode::TableNotFound => AppError::NotFound(err.message),
        CommandErrorCode::OrderClosed
        | CommandErrorCode::ConcurrencyConflict
        | CommandErrorCode::DuplicateCommand => AppError::Conflict(err.message),
        CommandErrorCode::SessionClosed => AppError::SessionClosed,
        CommandErrorCode::IllegalTransition => AppError::IllegalTransition(err.message),
        CommandErrorCode::InvalidQuantity | CommandErrorCode::InvalidOperation => {
            AppError::Validation(err.message)
        }
        CommandErrorCode::InternalError | CommandErrorCode::SystemBusy => {
            AppError::Internal(err.message)
        }
    }
}

/// Run a command on a blocking worker
///
/// The pipeline holds the redb write lock and commits to disk; it must
/// not run on an async worker thread.
pub async fn run(
    state: &ServerState,
    cmd: shared::order::TabCommand,
) -> AppResult<CommandResponse> {
    let manager = state.orders.clone();
    tokio::task::spawn_blocking(move || manager.execute_command(cmd))
        .await
        .map_err(|e| AppError::Internal(format!("command task failed: {e}")))
}

/// Execute a command and surface rejection as an HTTP error
pub async fn execute(
    state: &ServerState,
    cmd: shared::order::TabCommand,
) -> AppResult<CommandResponse> {
    let response = run(state, cmd).await?;
    if response.success {
        return Ok(response);
    }
    match response.error {
        Some(err) => Err(command_error(err)),
        None => Err(AppError::Internal("command rejected without error".into())),
    }
}
