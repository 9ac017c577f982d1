//! OpenTab command handler
//!
//! Opens a tab for a table. The manager reuses an existing open tab
//! before this action ever runs, so reaching execute() means the table
//! is free.

use async_trait::async_trait;

use super::validate_guest_session;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, TabEvent, TabEventType};

/// OpenTab action
#[derive(Debug, Clone)]
pub struct OpenTabAction {
    pub table_id: i64,
    /// Resolved from the catalog by the manager
    pub table_name: String,
    /// Guest path: session token re-validated inside the transaction
    pub session_token: Option<String>,
}

#[async_trait]
impl CommandHandler for OpenTabAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<TabEvent>, OrderError> {
        // 1. Guest-originated opens must still hold a live session
        if let Some(token) = &self.session_token {
            validate_guest_session(ctx, token, self.table_id)?;
        }

        // 2. Allocate identity and sequence
        let order_id = uuid::Uuid::new_v4().to_string();
        let seq = ctx.next_sequence();

        // 3. Create event
        let event = TabEvent::new(
            seq,
            order_id,
            metadata.operator_name.clone(),
            metadata.guest_id.clone(),
            metadata.command_id.clone(),
            TabEventType::TabOpened,
            EventPayload::TabOpened {
                table_id: self.table_id,
                table_name: self.table_name.clone(),
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::storage::TabStorage;
    use crate::orders::traits::CommandContext;
    use shared::session::GuestSession;

    fn create_test_metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            operator_name: "Ana".to_string(),
            guest_id: Some("guest-1".to_string()),
            timestamp: 1234567890,
        }
    }

    #[tokio::test]
    async fn test_open_tab_generates_event() {
        let storage = TabStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = OpenTabAction {
            table_id: 5,
            table_name: "Table 5".to_string(),
            session_token: None,
        };

        let events = action.execute(&mut ctx, &create_test_metadata()).await.unwrap();

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.event_type, TabEventType::TabOpened);
        assert_eq!(event.sequence, 1);
        assert!(!event.order_id.is_empty());
        assert_eq!(event.guest_id.as_deref(), Some("guest-1"));

        if let EventPayload::TabOpened {
            table_id,
            table_name,
        } = &event.payload
        {
            assert_eq!(*table_id, 5);
            assert_eq!(table_name, "Table 5");
        } else {
            panic!("Expected TabOpened payload");
        }
    }

    #[tokio::test]
    async fn test_open_tab_with_dead_session_fails() {
        let storage = TabStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();

        let session = GuestSession {
            token: "sess-1".to_string(),
            guest_id: "guest-1".to_string(),
            guest_name: "Ana".to_string(),
            phone: None,
            table_id: 5,
            qr_token: "qr-1".to_string(),
            is_active: false,
            created_at: 0,
            expires_at: i64::MAX,
        };
        storage.store_guest_session(&txn, &session).unwrap();

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = OpenTabAction {
            table_id: 5,
            table_name: "Table 5".to_string(),
            session_token: Some("sess-1".to_string()),
        };

        let result = action.execute(&mut ctx, &create_test_metadata()).await;
        assert!(matches!(result, Err(OrderError::SessionClosed)));
    }

    #[tokio::test]
    async fn test_open_tab_session_table_mismatch_fails() {
        let storage = TabStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();

        let session = GuestSession {
            token: "sess-1".to_string(),
            guest_id: "guest-1".to_string(),
            guest_name: "Ana".to_string(),
            phone: None,
            table_id: 7,
            qr_token: "qr-1".to_string(),
            is_active: true,
            created_at: 0,
            expires_at: i64::MAX,
        };
        storage.store_guest_session(&txn, &session).unwrap();

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = OpenTabAction {
            table_id: 5,
            table_name: "Table 5".to_string(),
            session_token: Some("sess-1".to_string()),
        };

        let result = action.execute(&mut ctx, &create_test_metadata()).await;
        assert!(matches!(result, Err(OrderError::SessionClosed)));
    }
}
