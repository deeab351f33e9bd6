//! Order listing, creation and deletion.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::model::{
    Customer, NewCustomer, NewOrder, NewOrderItem, NewProduct, OrderDetails, OrderItemDetails,
    Product, RowId,
};
use crate::storage::{get_or_create, OrderStore, OrderTransaction, StorageError};

/// Result type for order service operations.
pub type Result<T> = std::result::Result<T, OrderServiceError>;

/// Errors that can occur in the order service.
#[derive(Debug, thiserror::Error)]
pub enum OrderServiceError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Order with ID {0} not found")]
    NotFound(RowId),

    #[error("No order items found for Order ID: {0}")]
    NoItems(RowId),

    #[error("Store failure: {0}")]
    Store(#[from] StorageError),
}

/// Request body for creating a single-item order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub product_name: String,
    pub quantity: i32,
    pub order_date: DateTime<Utc>,
}

impl CreateOrderRequest {
    /// Check required fields and ranges.
    pub fn validate(&self) -> Result<()> {
        if self.customer_name.trim().is_empty() {
            return Err(OrderServiceError::Validation(
                "customerName is required".to_string(),
            ));
        }
        if !is_plausible_email(&self.customer_email) {
            return Err(OrderServiceError::Validation(format!(
                "customerEmail is not a valid email address: {:?}",
                self.customer_email
            )));
        }
        if self.product_name.trim().is_empty() {
            return Err(OrderServiceError::Validation(
                "productName is required".to_string(),
            ));
        }
        if self.quantity < 1 {
            return Err(OrderServiceError::Validation(
                "Quantity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One `@` with something on both sides.
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Order use cases over the normalized store.
pub struct OrderService {
    store: Arc<dyn OrderStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// All orders, newest first.
    pub async fn list_orders(&self) -> Result<Vec<OrderDetails>> {
        Ok(self.store.list_orders(None).await?)
    }

    /// Orders placed by the customer with this exact email, newest first.
    pub async fn list_orders_by_customer_email(&self, email: &str) -> Result<Vec<OrderDetails>> {
        Ok(self.store.list_orders(Some(email)).await?)
    }

    /// One order with its customer and items.
    pub async fn get_order(&self, id: RowId) -> Result<OrderDetails> {
        self.store
            .get_order(id)
            .await?
            .ok_or(OrderServiceError::NotFound(id))
    }

    /// Items of one order. An order with no items, or no order at all,
    /// is `NoItems`.
    pub async fn order_items(&self, order_id: RowId) -> Result<Vec<OrderItemDetails>> {
        match self.store.get_order(order_id).await? {
            Some(order) if !order.items.is_empty() => Ok(order.items),
            _ => Err(OrderServiceError::NoItems(order_id)),
        }
    }

    /// Create an order with one item, creating the customer and product if
    /// they do not exist yet.
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<OrderDetails> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let outcome = insert_order(tx.as_mut(), &request).await;
        let order_id = match outcome {
            Ok(id) => {
                tx.commit().await?;
                id
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback after failed order insert also failed");
                }
                return Err(e.into());
            }
        };

        info!(
            order_id,
            customer_email = %request.customer_email,
            product = %request.product_name,
            "Order created"
        );

        // Read back through the same join the listings use.
        self.store
            .get_order(order_id)
            .await?
            .ok_or_else(|| StorageError::not_found("order", order_id).into())
    }

    /// Delete an order and its items.
    pub async fn delete_order(&self, id: RowId) -> Result<()> {
        if self.store.delete_order(id).await? {
            info!(order_id = id, "Order deleted");
            Ok(())
        } else {
            Err(OrderServiceError::NotFound(id))
        }
    }
}

async fn insert_order(
    tx: &mut dyn OrderTransaction,
    request: &CreateOrderRequest,
) -> std::result::Result<RowId, StorageError> {
    let customer = get_or_create::<Customer>(
        tx,
        NewCustomer {
            name: request.customer_name.clone(),
            email: request.customer_email.clone(),
        },
    )
    .await?
    .row;
    let product = get_or_create::<Product>(
        tx,
        NewProduct {
            name: request.product_name.clone(),
        },
    )
    .await?
    .row;

    let order = tx
        .insert_order(NewOrder {
            id: None,
            customer_id: customer.id,
            order_date: request.order_date,
        })
        .await?;
    tx.insert_order_item(NewOrderItem {
        order_id: order.id,
        product_id: product.id,
        quantity: request.quantity,
    })
    .await?;

    Ok(order.id)
}
