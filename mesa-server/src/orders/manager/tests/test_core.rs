use super::*;

#[test]
fn test_open_tab() {
    let manager = create_test_manager();

    let response = manager.execute_command(open_tab_cmd(5));

    assert!(response.success);
    let order_id = response.order_id.unwrap();

    let snapshot = manager.get_snapshot(&order_id).unwrap().unwrap();
    assert_eq!(snapshot.status, TabStatus::Open);
    assert_eq!(snapshot.table_id, 5);
    assert_eq!(snapshot.table_name, "Table 5");
    assert!(snapshot.items.is_empty());
}

#[test]
fn test_open_tab_unknown_table_fails() {
    let manager = create_test_manager();

    let response = manager.execute_command(open_tab_cmd(404));

    assert!(!response.success);
    assert_eq!(error_code(&response), CommandErrorCode::TableNotFound);
}

#[test]
fn test_open_tab_reuses_existing() {
    let manager = create_test_manager();

    let first = manager.execute_command(open_tab_cmd(5));
    let order_id = first.order_id.clone().unwrap();

    // A different command on the same table joins the open tab
    let second = manager.execute_command(open_tab_cmd(5));

    assert!(second.success);
    assert_eq!(second.order_id.as_deref(), Some(order_id.as_str()));

    // No second TabOpened was recorded
    let events = manager.get_events_for_order(&order_id).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(manager.get_open_tabs().unwrap().len(), 1);
}

#[test]
fn test_idempotency() {
    let manager = create_test_manager();
    let cmd = open_tab_cmd(5);

    let response1 = manager.execute_command(cmd.clone());
    assert!(response1.success);

    // Execute same command again
    let response2 = manager.execute_command(cmd);
    assert!(response2.success);
    assert_eq!(response2.order_id, None); // Duplicate returns no order_id

    assert_eq!(manager.get_open_tabs().unwrap().len(), 1);
}

#[test]
fn test_add_items() {
    let manager = create_test_manager();
    let order_id = open_tab_with_items(&manager, 5, vec![item_input(7, 2)]);

    let snapshot = manager.get_snapshot(&order_id).unwrap().unwrap();
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.items[0].name, "Arepa");
    assert_eq!(snapshot.items[0].unit_price, 8500);
    assert_eq!(snapshot.items[0].status, ItemStatus::Pending);
    assert_eq!(snapshot.total, 17000);
}

#[test]
fn test_add_items_unknown_menu_item_fails() {
    let manager = create_test_manager();
    let order_id = open_tab_with_items(&manager, 5, vec![]);

    let response = manager.execute_command(TabCommand::new(
        "Test Operator",
        TabCommandPayload::AddItems {
            order_id,
            items: vec![item_input(999, 1)],
            session_token: None,
        },
    ));

    assert!(!response.success);
    assert_eq!(error_code(&response), CommandErrorCode::MenuItemNotFound);
}

#[test]
fn test_close_account() {
    let manager = create_test_manager();
    let order_id = open_tab_with_items(&manager, 5, vec![item_input(7, 2)]);

    let response = manager.execute_command(TabCommand::new(
        "Cashier",
        TabCommandPayload::CloseAccount {
            order_id: order_id.clone(),
            payment_method: "CASH".to_string(),
            expected_sequence: None,
        },
    ));
    assert!(response.success);

    let snapshot = manager.get_snapshot(&order_id).unwrap().unwrap();
    assert_eq!(snapshot.status, TabStatus::Closed);
    let payment = snapshot.payment.unwrap();
    assert_eq!(payment.method, "CASH");
    assert_eq!(payment.amount, 17000);

    assert!(manager.find_open_tab_for_table(5).unwrap().is_none());
    assert!(manager.get_open_tabs().unwrap().is_empty());
}

#[test]
fn test_sequence_monotonically_increasing() {
    let manager = create_test_manager();

    let order_a = open_tab_with_items(&manager, 1, vec![item_input(7, 1)]);
    let order_b = open_tab_with_items(&manager, 5, vec![item_input(8, 1)]);

    let mut sequences: Vec<u64> = manager
        .get_events_since(0)
        .unwrap()
        .iter()
        .map(|e| e.sequence)
        .collect();

    assert_eq!(sequences.len(), 4);
    let sorted = {
        let mut s = sequences.clone();
        s.sort_unstable();
        s
    };
    assert_eq!(sequences, sorted);
    sequences.dedup();
    assert_eq!(sequences.len(), 4); // no duplicates across orders

    assert_ne!(order_a, order_b);
    assert_eq!(manager.current_sequence().unwrap(), 4);
}

#[test]
fn test_event_broadcast() {
    let manager = create_test_manager();
    let mut rx = manager.subscribe();

    let order_id = open_tab_with_items(&manager, 5, vec![]);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.order_id, order_id);
    assert_eq!(event.event_type, TabEventType::TabOpened);
}

#[test]
fn test_rebuild_snapshot_matches_stored() {
    let manager = create_test_manager();
    let order_id = open_tab_with_items(&manager, 5, vec![item_input(7, 2), item_input(9, 1)]);

    let item_id = first_item_id(&manager, &order_id);
    advance_item(&manager, &order_id, &item_id, ItemStatus::Preparing);

    let stored = manager.get_snapshot(&order_id).unwrap().unwrap();
    let rebuilt = manager.rebuild_snapshot(&order_id).unwrap();

    assert_eq!(rebuilt.order_id, stored.order_id);
    assert_eq!(rebuilt.table_id, stored.table_id);
    assert_eq!(rebuilt.status, stored.status);
    assert_eq!(rebuilt.items, stored.items);
    assert_eq!(rebuilt.total, stored.total);
    assert_eq!(rebuilt.last_sequence, stored.last_sequence);
}
