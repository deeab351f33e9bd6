use chrono::{TimeZone, Utc};

use super::*;
use crate::model::{NewCustomer, NewOrder, NewOrderItem, NewProduct};
use crate::storage::{LegacyStore, OrderStore, StorageError};

fn customer(email: &str) -> NewCustomer {
    NewCustomer {
        name: "Test".to_string(),
        email: email.to_string(),
    }
}

#[tokio::test]
async fn test_commit_publishes_writes() {
    let store = MockOrderStore::new();
    let mut tx = store.begin().await.unwrap();
    tx.insert_customer(customer("a@x.com")).await.unwrap();

    assert!(store.customers().await.is_empty(), "uncommitted write leaked");

    tx.commit().await.unwrap();
    assert_eq!(store.customers().await.len(), 1);
}

#[tokio::test]
async fn test_drop_without_commit_discards_writes() {
    let store = MockOrderStore::new();
    {
        let mut tx = store.begin().await.unwrap();
        tx.insert_customer(customer("a@x.com")).await.unwrap();
    }
    assert!(store.customers().await.is_empty());
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let store = MockOrderStore::new();
    let mut tx = store.begin().await.unwrap();
    tx.insert_customer(customer("a@x.com")).await.unwrap();

    let err = tx.insert_customer(customer("a@x.com")).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict { entity: "customer", .. }));
}

#[tokio::test]
async fn test_order_insert_budget() {
    let store = MockOrderStore::new();
    store.fail_order_inserts_after(1).await;

    let mut tx = store.begin().await.unwrap();
    let c = tx.insert_customer(customer("a@x.com")).await.unwrap();
    let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let order = |id| NewOrder {
        id: Some(id),
        customer_id: c.id,
        order_date: date,
    };

    tx.insert_order(order(1)).await.unwrap();
    let err = tx.insert_order(order(2)).await.unwrap_err();
    assert!(matches!(err, StorageError::Injected(_)));
}

#[tokio::test]
async fn test_generated_order_id_follows_max() {
    let store = MockOrderStore::new();
    let mut tx = store.begin().await.unwrap();
    let c = tx.insert_customer(customer("a@x.com")).await.unwrap();
    let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    tx.insert_order(NewOrder {
        id: Some(40),
        customer_id: c.id,
        order_date: date,
    })
    .await
    .unwrap();
    let generated = tx
        .insert_order(NewOrder {
            id: None,
            customer_id: c.id,
            order_date: date,
        })
        .await
        .unwrap();

    assert_eq!(generated.id, 41);
}

#[tokio::test]
async fn test_delete_order_removes_items_only() {
    let store = MockOrderStore::new();
    let mut tx = store.begin().await.unwrap();
    let c = tx.insert_customer(customer("a@x.com")).await.unwrap();
    let p = tx
        .insert_product(NewProduct {
            name: "Widget".to_string(),
        })
        .await
        .unwrap();
    let o = tx
        .insert_order(NewOrder {
            id: Some(7),
            customer_id: c.id,
            order_date: Utc::now(),
        })
        .await
        .unwrap();
    tx.insert_order_item(NewOrderItem {
        order_id: o.id,
        product_id: p.id,
        quantity: 3,
    })
    .await
    .unwrap();
    tx.commit().await.unwrap();

    assert!(store.delete_order(7).await.unwrap());
    assert!(!store.delete_order(7).await.unwrap());
    assert!(store.order_items().await.is_empty());
    assert_eq!(store.customers().await.len(), 1);
    assert_eq!(store.products().await.len(), 1);
}

#[tokio::test]
async fn test_list_legacy_failure() {
    let store = MockOrderStore::new();
    store.set_fail_on_list_legacy(true).await;
    assert!(store.list_all().await.is_err());

    store.clear_failures().await;
    assert!(store.list_all().await.unwrap().is_empty());
}
