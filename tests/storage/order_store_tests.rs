//! OrderStore interface tests.
//!
//! These tests verify the contract of the OrderStore and OrderTransaction
//! traits. Each storage implementation should run these tests. Every test
//! uses its own emails and product names so they can share one store.

use chrono::{DateTime, TimeZone, Utc};
use ordermgmt::model::{NewCustomer, NewOrder, NewOrderItem, NewProduct, RowId};
use ordermgmt::storage::{OrderStore, OrderTransaction};

fn date(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap()
}

fn customer(tag: &str) -> NewCustomer {
    NewCustomer {
        name: format!("Customer {}", tag),
        email: format!("{}@contract.test", tag),
    }
}

fn product(tag: &str) -> NewProduct {
    NewProduct {
        name: format!("product_{}", tag),
    }
}

/// Insert a customer, a product and a one-item order, then commit.
async fn place_order<S: OrderStore>(store: &S, tag: &str, id: Option<RowId>, day: u32) -> RowId {
    let mut tx = store.begin().await.expect("begin should succeed");
    let c = match tx.find_customer_by_email(&customer(tag).email).await.unwrap() {
        Some(c) => c,
        None => tx.insert_customer(customer(tag)).await.unwrap(),
    };
    let p = match tx.find_product_by_name(&product(tag).name).await.unwrap() {
        Some(p) => p,
        None => tx.insert_product(product(tag)).await.unwrap(),
    };
    let order = tx
        .insert_order(NewOrder {
            id,
            customer_id: c.id,
            order_date: date(day),
        })
        .await
        .unwrap();
    tx.insert_order_item(NewOrderItem {
        order_id: order.id,
        product_id: p.id,
        quantity: 3,
    })
    .await
    .unwrap();
    tx.commit().await.expect("commit should succeed");
    order.id
}

// =============================================================================
// Transaction tests
// =============================================================================

pub async fn test_find_missing<S: OrderStore>(store: &S) {
    let mut tx = store.begin().await.unwrap();
    assert!(tx
        .find_customer_by_email("nobody@contract.test")
        .await
        .unwrap()
        .is_none());
    assert!(tx.find_product_by_name("product_none").await.unwrap().is_none());
    assert!(tx.find_order_by_id(987_654).await.unwrap().is_none());
    tx.rollback().await.unwrap();
}

pub async fn test_writes_visible_inside_transaction<S: OrderStore>(store: &S) {
    let mut tx = store.begin().await.unwrap();
    let inserted = tx.insert_customer(customer("visible")).await.unwrap();

    let found = tx
        .find_customer_by_email("visible@contract.test")
        .await
        .unwrap()
        .expect("customer should be visible to its own transaction");
    assert_eq!(found, inserted);
    tx.commit().await.unwrap();
}

pub async fn test_commit_publishes<S: OrderStore>(store: &S) {
    let mut tx = store.begin().await.unwrap();
    let inserted = tx.insert_product(product("commit")).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let found = tx
        .find_product_by_name("product_commit")
        .await
        .unwrap()
        .expect("committed product should exist");
    assert_eq!(found.id, inserted.id);
    tx.rollback().await.unwrap();
}

pub async fn test_rollback_discards<S: OrderStore>(store: &S) {
    let mut tx = store.begin().await.unwrap();
    tx.insert_customer(customer("rollback")).await.unwrap();
    tx.insert_product(product("rollback")).await.unwrap();
    tx.rollback().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    assert!(tx
        .find_customer_by_email("rollback@contract.test")
        .await
        .unwrap()
        .is_none());
    assert!(tx
        .find_product_by_name("product_rollback")
        .await
        .unwrap()
        .is_none());
    tx.rollback().await.unwrap();
}

pub async fn test_preserves_explicit_order_id<S: OrderStore>(store: &S) {
    let id = place_order(store, "explicit", Some(77_001), 1).await;
    assert_eq!(id, 77_001);

    let mut tx = store.begin().await.unwrap();
    let order = tx
        .find_order_by_id(77_001)
        .await
        .unwrap()
        .expect("order should exist");
    assert_eq!(order.order_date, date(1));
    tx.rollback().await.unwrap();
}

pub async fn test_generated_order_id_is_fresh<S: OrderStore>(store: &S) {
    let explicit = place_order(store, "generated", Some(78_001), 1).await;
    let generated = place_order(store, "generated", None, 2).await;

    assert_ne!(generated, explicit);
    assert!(generated > 0, "generated id should be positive");
}

// =============================================================================
// Listing tests
// =============================================================================

pub async fn test_list_by_email_newest_first<S: OrderStore>(store: &S) {
    let older = place_order(store, "listing", None, 3).await;
    let newer = place_order(store, "listing", None, 9).await;

    let orders = store
        .list_orders(Some("listing@contract.test"))
        .await
        .unwrap();
    let ids: Vec<_> = orders.iter().map(|o| o.order_id).collect();
    assert_eq!(ids, vec![newer, older]);

    let first = &orders[0];
    assert_eq!(first.customer_name, "Customer listing");
    assert_eq!(first.order_date, date(9));
    assert_eq!(first.items.len(), 1);
    assert_eq!(first.items[0].product_name, "product_listing");
    assert_eq!(first.items[0].quantity, 3);
}

pub async fn test_list_email_is_exact<S: OrderStore>(store: &S) {
    place_order(store, "exact", None, 4).await;

    let upper = store
        .list_orders(Some("EXACT@contract.test"))
        .await
        .unwrap();
    assert!(upper.is_empty(), "email match should be case-sensitive");

    let all = store.list_orders(None).await.unwrap();
    assert!(all
        .iter()
        .any(|o| o.customer_email == "exact@contract.test"));
}

pub async fn test_get_order<S: OrderStore>(store: &S) {
    let id = place_order(store, "single", None, 6).await;

    let order = store
        .get_order(id)
        .await
        .unwrap()
        .expect("order should exist");
    assert_eq!(order.order_id, id);
    assert_eq!(order.customer_email, "single@contract.test");
    assert_eq!(order.order_date, date(6));
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].product_name, "product_single");

    assert!(store.get_order(999_998).await.unwrap().is_none());
}

// =============================================================================
// Delete tests
// =============================================================================

pub async fn test_delete_order<S: OrderStore>(store: &S) {
    let id = place_order(store, "delete", None, 5).await;

    assert!(store.delete_order(id).await.unwrap());
    assert!(!store.delete_order(id).await.unwrap());

    let remaining = store
        .list_orders(Some("delete@contract.test"))
        .await
        .unwrap();
    assert!(remaining.is_empty());

    // Customer and product stay behind.
    let mut tx = store.begin().await.unwrap();
    assert!(tx
        .find_customer_by_email("delete@contract.test")
        .await
        .unwrap()
        .is_some());
    assert!(tx
        .find_product_by_name("product_delete")
        .await
        .unwrap()
        .is_some());
    tx.rollback().await.unwrap();
}

pub async fn test_delete_missing<S: OrderStore>(store: &S) {
    assert!(!store.delete_order(999_999).await.unwrap());
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all OrderStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_order_store_tests {
    ($store:expr) => {
        use $crate::storage::order_store_tests::*;

        // transaction tests
        test_find_missing($store).await;
        println!("  test_find_missing: PASSED");

        test_writes_visible_inside_transaction($store).await;
        println!("  test_writes_visible_inside_transaction: PASSED");

        test_commit_publishes($store).await;
        println!("  test_commit_publishes: PASSED");

        test_rollback_discards($store).await;
        println!("  test_rollback_discards: PASSED");

        test_preserves_explicit_order_id($store).await;
        println!("  test_preserves_explicit_order_id: PASSED");

        test_generated_order_id_is_fresh($store).await;
        println!("  test_generated_order_id_is_fresh: PASSED");

        // listing tests
        test_list_by_email_newest_first($store).await;
        println!("  test_list_by_email_newest_first: PASSED");

        test_list_email_is_exact($store).await;
        println!("  test_list_email_is_exact: PASSED");

        test_get_order($store).await;
        println!("  test_get_order: PASSED");

        // delete tests
        test_delete_order($store).await;
        println!("  test_delete_order: PASSED");

        test_delete_missing($store).await;
        println!("  test_delete_missing: PASSED");
    };
}
