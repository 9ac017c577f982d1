use super::*;
use shared::models::{DiningTable, MenuItem};
use shared::order::{CommandErrorCode, ItemInput, ItemStatus, TabCommandPayload, TabEventType};
use shared::session::{GuestSession, QrSession};

mod test_core;

fn test_catalog() -> Arc<CatalogService> {
    let catalog = CatalogService::new();
    catalog.load(
        vec![
            DiningTable {
                id: 1,
                name: "Table 1".to_string(),
                capacity: 2,
                is_active: true,
            },
            DiningTable {
                id: 5,
                name: "Table 5".to_string(),
                capacity: 4,
                is_active: true,
            },
        ],
        vec![
            MenuItem {
                id: 7,
                name: "Arepa".to_string(),
                price: 8500,
                category: Some("Food".to_string()),
                is_active: true,
            },
            MenuItem {
                id: 8,
                name: "Limonada".to_string(),
                price: 6000,
                category: Some("Drinks".to_string()),
                is_active: true,
            },
            MenuItem {
                id: 9,
                name: "Bandeja".to_string(),
                price: 12000,
                category: Some("Food".to_string()),
                is_active: true,
            },
        ],
    );
    Arc::new(catalog)
}

fn create_test_manager() -> OrdersManager {
    let storage = TabStorage::open_in_memory().unwrap();
    OrdersManager::with_storage(storage, test_catalog())
}

fn open_tab_cmd(table_id: i64) -> TabCommand {
    TabCommand::new(
        "Test Operator",
        TabCommandPayload::OpenTab {
            table_id,
            session_token: None,
        },
    )
}

fn item_input(menu_item_id: i64, quantity: i32) -> ItemInput {
    ItemInput {
        menu_item_id,
        quantity,
        note: None,
    }
}

// ========================================================================
// Helper: open a tab with items
// ========================================================================

fn open_tab_with_items(manager: &OrdersManager, table_id: i64, items: Vec<ItemInput>) -> String {
    let resp = manager.execute_command(open_tab_cmd(table_id));
    assert!(resp.success, "Failed to open tab");
    let order_id = resp.order_id.unwrap();

    if !items.is_empty() {
        let resp = manager.execute_command(TabCommand::new(
            "Test Operator",
            TabCommandPayload::AddItems {
                order_id: order_id.clone(),
                items,
                session_token: None,
            },
        ));
        assert!(resp.success, "Failed to add items");
    }

    order_id
}

fn first_item_id(manager: &OrdersManager, order_id: &str) -> String {
    manager
        .get_snapshot(order_id)
        .unwrap()
        .unwrap()
        .items
        .first()
        .unwrap()
        .item_id
        .clone()
}

fn advance_item(manager: &OrdersManager, order_id: &str, item_id: &str, next: ItemStatus) {
    let resp = manager.execute_command(TabCommand::new(
        "Kitchen",
        TabCommandPayload::UpdateItemStatus {
            order_id: order_id.to_string(),
            item_id: item_id.to_string(),
            next_status: next,
        },
    ));
    assert!(resp.success, "Failed to advance item to {next}");
}

fn error_code(resp: &CommandResponse) -> CommandErrorCode {
    resp.error.as_ref().expect("expected an error").code.clone()
}

fn seed_table_sessions(manager: &OrdersManager, table_id: i64) -> (QrSession, GuestSession) {
    let qr = QrSession {
        token: format!("qr-{table_id}"),
        table_id,
        issued_at: 0,
        expires_at: i64::MAX,
        is_active: true,
    };
    let guest = GuestSession {
        token: format!("sess-{table_id}"),
        guest_id: "guest-ana".to_string(),
        guest_name: "Ana".to_string(),
        phone: None,
        table_id,
        qr_token: qr.token.clone(),
        is_active: true,
        created_at: 0,
        expires_at: i64::MAX,
    };

    let txn = manager.storage().begin_write().unwrap();
    manager.storage().store_qr_session(&txn, &qr).unwrap();
    manager.storage().store_guest_session(&txn, &guest).unwrap();
    txn.commit().unwrap();

    (qr, guest)
}
