//! Order management data model.
//!
//! Rows reference each other by id only. Read models that need joined data
//! (`OrderDetails`) are assembled by the store on demand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Primary key type shared by all normalized tables.
pub type RowId = i64;

/// One row of the legacy flat `customer_orders` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRecord {
    pub order_id: RowId,
    pub customer_name: String,
    pub customer_email: String,
    pub product_name: String,
    pub quantity: i32,
    pub order_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: RowId,
    pub name: String,
    pub email: String,
}

/// Customer fields before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: RowId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: RowId,
    pub customer_id: RowId,
    pub order_date: DateTime<Utc>,
}

/// Order fields before insertion.
///
/// `id` is `Some` when the caller must keep an externally assigned id
/// (legacy migration) and `None` when the store should generate one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub id: Option<RowId>,
    pub customer_id: RowId,
    pub order_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: RowId,
    pub order_id: RowId,
    pub product_id: RowId,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub order_id: RowId,
    pub product_id: RowId,
    pub quantity: i32,
}

/// An order joined with its customer and line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub order_id: RowId,
    pub customer_name: String,
    pub customer_email: String,
    pub order_date: DateTime<Utc>,
    pub items: Vec<OrderItemDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDetails {
    pub product_name: String,
    pub quantity: i32,
}
