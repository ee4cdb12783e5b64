//! End-to-end tests for the full stack: AppService over a real in-memory
//! SQLite store behind the gateway.

use std::sync::Arc;

use crumb_app::{AppError, AppService};
use crumb_core::{
    BoxSelection, CookieSize, CoreError, Money, MovementKind, OrderStatus, RecordKind, Transition,
};
use crumb_db::{Database, DbConfig};
use crumb_sync::{Gateway, SqliteStore};

const MEDIUM_UNIT: Money = Money::from_cents(4500);
const MEDIUM_BOX4: Money = Money::from_cents(16000);

async fn service() -> AppService<SqliteStore> {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");
    AppService::new(Arc::new(Gateway::new(SqliteStore::new(db))))
}

/// Seeds a customer, selects them, and returns their id.
async fn with_customer(service: &AppService<SqliteStore>, name: &str) -> String {
    let customer = service.add_customer(name).await.unwrap();
    service.select_customer(&customer.id).await.unwrap();
    customer.id
}

// =============================================================================
// The Oreo Scenario
// =============================================================================

#[tokio::test]
async fn test_full_lifecycle_oreo() {
    let service = service().await;
    with_customer(&service, "Dana").await;
    service.add_flavor("Oreo").await.unwrap();
    service.add_stock("Oreo", CookieSize::Medium, 10).await.unwrap();

    service
        .add_units_to_cart("Oreo", CookieSize::Medium, 3, MEDIUM_UNIT)
        .await
        .unwrap();
    assert_eq!(service.cart_total().await, Money::from_cents(13500));

    let order = service.checkout().await.unwrap();
    assert_eq!(order.status(), OrderStatus::Pending);
    assert_eq!(order.total, Money::from_cents(13500));
    assert!(service.cart_lines().await.is_empty());

    // Checkout bumps the customer's lifetime counters exactly once.
    let customer = &service.customers().await[0];
    assert_eq!(customer.order_count, 1);
    assert_eq!(customer.total_cookies, 3);

    // Preparation stamps the order but moves no stock.
    assert_eq!(
        service.mark_prepared(&order.id).await.unwrap(),
        Transition::Applied
    );
    assert_eq!(service.stock_level("Oreo", CookieSize::Medium).await, 10);

    // Delivery deducts FIFO and leaves an audit movement.
    assert_eq!(
        service.mark_delivered(&order.id).await.unwrap(),
        Transition::Applied
    );
    assert_eq!(service.stock_level("Oreo", CookieSize::Medium).await, 7);

    let movements = service.movements().await;
    assert_eq!(movements.len(), 2);
    let deduction = &movements[1];
    assert_eq!(deduction.kind, MovementKind::Deduction);
    assert_eq!(deduction.quantity, 3);
    assert_eq!(deduction.reason, "order delivered - Dana");
    assert_eq!(deduction.order_id.as_deref(), Some(order.id.as_str()));

    // Payment emits exactly one income record.
    assert_eq!(
        service.mark_paid(&order.id).await.unwrap(),
        Transition::Applied
    );
    let records = service.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, RecordKind::Income);
    assert_eq!(records[0].amount, Money::from_cents(13500));
    assert_eq!(records[0].category, "Sales");
    assert_eq!(records[0].description, "Sale to Dana (3 cookies)");

    assert_eq!(
        service.order(&order.id).await.unwrap().status(),
        OrderStatus::Paid
    );
}

// =============================================================================
// Lifecycle Rules
// =============================================================================

#[tokio::test]
async fn test_delivery_and_payment_are_idempotent() {
    let service = service().await;
    with_customer(&service, "Dana").await;
    service.add_stock("Oreo", CookieSize::Medium, 10).await.unwrap();
    service
        .add_units_to_cart("Oreo", CookieSize::Medium, 3, MEDIUM_UNIT)
        .await
        .unwrap();
    let order = service.checkout().await.unwrap();

    service.mark_prepared(&order.id).await.unwrap();
    service.mark_delivered(&order.id).await.unwrap();
    let movement_count = service.movements().await.len();

    // Second delivery: no error, no second deduction.
    assert_eq!(
        service.mark_delivered(&order.id).await.unwrap(),
        Transition::AlreadyDone
    );
    assert_eq!(service.stock_level("Oreo", CookieSize::Medium).await, 7);
    assert_eq!(service.movements().await.len(), movement_count);

    service.mark_paid(&order.id).await.unwrap();
    assert_eq!(
        service.mark_paid(&order.id).await.unwrap(),
        Transition::AlreadyDone
    );
    assert_eq!(service.records().await.len(), 1);
}

#[tokio::test]
async fn test_out_of_order_transitions_rejected() {
    let service = service().await;
    with_customer(&service, "Dana").await;
    service.add_stock("Oreo", CookieSize::Medium, 10).await.unwrap();
    service
        .add_units_to_cart("Oreo", CookieSize::Medium, 1, MEDIUM_UNIT)
        .await
        .unwrap();
    let order = service.checkout().await.unwrap();

    // Delivering a pending order skips preparation: rejected.
    assert!(matches!(
        service.mark_delivered(&order.id).await,
        Err(AppError::Core(CoreError::InvalidTransition { .. }))
    ));
    // Likewise paying before delivery.
    assert!(matches!(
        service.mark_paid(&order.id).await,
        Err(AppError::Core(CoreError::InvalidTransition { .. }))
    ));
    assert_eq!(
        service.order(&order.id).await.unwrap().status(),
        OrderStatus::Pending
    );
}

#[tokio::test]
async fn test_short_stock_delivery_changes_nothing() {
    let service = service().await;
    with_customer(&service, "Dana").await;
    service.add_stock("Oreo", CookieSize::Medium, 2).await.unwrap();
    service
        .add_units_to_cart("Oreo", CookieSize::Medium, 3, MEDIUM_UNIT)
        .await
        .unwrap();
    let order = service.checkout().await.unwrap();
    service.mark_prepared(&order.id).await.unwrap();

    let err = service.mark_delivered(&order.id).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Core(CoreError::InsufficientStock {
            available: 2,
            requested: 3,
            ..
        })
    ));

    // Order still prepared, ledger untouched.
    assert_eq!(
        service.order(&order.id).await.unwrap().status(),
        OrderStatus::Prepared
    );
    assert_eq!(service.stock_level("Oreo", CookieSize::Medium).await, 2);
    assert_eq!(service.movements().await.len(), 1);
}

// =============================================================================
// Checkout Guards
// =============================================================================

#[tokio::test]
async fn test_checkout_requires_customer_and_lines() {
    let service = service().await;

    // No customer selected.
    service
        .add_units_to_cart("Oreo", CookieSize::Medium, 1, MEDIUM_UNIT)
        .await
        .unwrap();
    assert!(matches!(
        service.checkout().await,
        Err(AppError::Core(CoreError::CheckoutNotAllowed { .. }))
    ));

    // Customer selected but the cart emptied.
    with_customer(&service, "Dana").await;
    service.clear_cart().await;
    assert!(matches!(
        service.checkout().await,
        Err(AppError::Core(CoreError::CheckoutNotAllowed { .. }))
    ));
}

// =============================================================================
// Boxes
// =============================================================================

#[tokio::test]
async fn test_box_selection_must_fill_the_box() {
    let service = service().await;

    let mut selection = BoxSelection::box4(CookieSize::Medium);
    selection.set_flavor("Oreo", 2);
    selection.set_flavor("Red Velvet", 1);
    let err = service
        .add_box_to_cart(&selection, 1, MEDIUM_BOX4)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Core(CoreError::IncompleteBox {
            selected: 3,
            capacity: 4
        })
    ));
    assert!(service.cart_lines().await.is_empty());

    selection.set_flavor("Red Velvet", 2);
    let line_ids = service
        .add_box_to_cart(&selection, 1, MEDIUM_BOX4)
        .await
        .unwrap();
    assert_eq!(line_ids.len(), 2);
    assert_eq!(service.cart_total().await, MEDIUM_BOX4);
}

// =============================================================================
// Order Listing & Deletion
// =============================================================================

#[tokio::test]
async fn test_orders_newest_first_and_stable_under_status_changes() {
    let service = service().await;
    with_customer(&service, "Dana").await;
    service.add_stock("Oreo", CookieSize::Medium, 10).await.unwrap();

    service
        .add_units_to_cart("Oreo", CookieSize::Medium, 1, MEDIUM_UNIT)
        .await
        .unwrap();
    let first = service.checkout().await.unwrap();

    service
        .add_units_to_cart("Oreo", CookieSize::Medium, 2, MEDIUM_UNIT)
        .await
        .unwrap();
    let second = service.checkout().await.unwrap();

    let listed = service.orders().await;
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);

    // Advancing the older order must not move it up the list.
    service.mark_prepared(&first.id).await.unwrap();
    let listed = service.orders().await;
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}

#[tokio::test]
async fn test_delete_refused_once_delivered() {
    let service = service().await;
    with_customer(&service, "Dana").await;
    service.add_stock("Oreo", CookieSize::Medium, 10).await.unwrap();
    service
        .add_units_to_cart("Oreo", CookieSize::Medium, 1, MEDIUM_UNIT)
        .await
        .unwrap();
    let pending = service.checkout().await.unwrap();

    // A pending order deletes cleanly.
    service.delete_order(&pending.id).await.unwrap();
    assert!(service.orders().await.is_empty());

    service
        .add_units_to_cart("Oreo", CookieSize::Medium, 1, MEDIUM_UNIT)
        .await
        .unwrap();
    let delivered = service.checkout().await.unwrap();
    service.mark_prepared(&delivered.id).await.unwrap();
    service.mark_delivered(&delivered.id).await.unwrap();

    assert!(matches!(
        service.delete_order(&delivered.id).await,
        Err(AppError::Core(CoreError::OrderNotDeletable { .. }))
    ));
    assert_eq!(service.orders().await.len(), 1);
}

// =============================================================================
// Financial Records
// =============================================================================

#[tokio::test]
async fn test_manual_records_deletable_lifecycle_records_not() {
    let service = service().await;
    with_customer(&service, "Dana").await;
    service.add_stock("Oreo", CookieSize::Medium, 10).await.unwrap();
    service
        .add_units_to_cart("Oreo", CookieSize::Medium, 1, MEDIUM_UNIT)
        .await
        .unwrap();
    let order = service.checkout().await.unwrap();
    service.mark_prepared(&order.id).await.unwrap();
    service.mark_delivered(&order.id).await.unwrap();
    service.mark_paid(&order.id).await.unwrap();

    let expense = service
        .add_record(
            RecordKind::Expense,
            "Flour and butter",
            Money::from_cents(8000),
            "Supplies",
        )
        .await
        .unwrap();
    assert_eq!(service.records().await.len(), 2);

    service.delete_record(&expense.id).await.unwrap();
    assert_eq!(service.records().await.len(), 1);

    let income_id = service.records().await[0].id.clone();
    assert!(matches!(
        service.delete_record(&income_id).await,
        Err(AppError::RecordManagedByOrder { .. })
    ));
}

// =============================================================================
// Persistence Round Trip
// =============================================================================

#[tokio::test]
async fn test_reload_restores_full_state_from_store() {
    let service = service().await;
    let customer_id = with_customer(&service, "Dana").await;
    service.add_flavor("Oreo").await.unwrap();
    service.add_stock("Oreo", CookieSize::Medium, 10).await.unwrap();
    service
        .add_units_to_cart("Oreo", CookieSize::Medium, 3, MEDIUM_UNIT)
        .await
        .unwrap();
    let order = service.checkout().await.unwrap();
    service.mark_prepared(&order.id).await.unwrap();
    service.mark_delivered(&order.id).await.unwrap();
    service.mark_paid(&order.id).await.unwrap();

    // Drop in-memory state and rebuild it purely from the store.
    assert!(service.reload().await.unwrap());

    assert_eq!(service.stock_level("Oreo", CookieSize::Medium).await, 7);
    assert_eq!(service.flavors().await.len(), 1);
    assert_eq!(service.records().await.len(), 1);

    let reloaded = service.order(&order.id).await.unwrap();
    assert_eq!(reloaded.status(), OrderStatus::Paid);
    assert_eq!(reloaded.items.len(), 1);
    assert_eq!(reloaded.total, Money::from_cents(13500));

    let customer = &service.customers().await[0];
    assert_eq!(customer.id, customer_id);
    assert_eq!(customer.order_count, 1);
    assert_eq!(customer.total_cookies, 3);
}

#[tokio::test]
async fn test_writes_survive_a_dead_store() {
    let service = service().await;
    with_customer(&service, "Dana").await;

    // Kill the store out from under the gateway.
    service.gateway().store().database().close().await;

    let entry = service
        .add_stock("Oreo", CookieSize::Medium, 10)
        .await
        .unwrap();
    assert_eq!(entry.quantity, 10);
    assert_eq!(service.stock_level("Oreo", CookieSize::Medium).await, 10);
    assert_eq!(service.gateway().unsynced_writes(), 1);
    assert!(!service.gateway().is_reachable());
}
