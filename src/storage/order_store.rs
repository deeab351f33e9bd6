//! OrderStore and OrderTransaction trait definitions.

use async_trait::async_trait;

use super::Result;
use crate::model::{
    Customer, NewCustomer, NewOrder, NewOrderItem, NewProduct, Order, OrderDetails, OrderItem,
    Product, RowId,
};

/// Interface for the normalized order schema.
///
/// Reads that only serve listings go straight to the store. Every write
/// goes through an [`OrderTransaction`] obtained from [`OrderStore::begin`].
///
/// Implementations:
/// - `SqliteOrderStore`: SQLite storage
/// - `MockOrderStore`: In-memory mock for testing
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Start a unit of work.
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>>;

    /// Orders joined with customer and items, newest `order_date` first.
    ///
    /// When `customer_email` is set, only that customer's orders are
    /// returned (exact match).
    async fn list_orders(&self, customer_email: Option<&str>) -> Result<Vec<OrderDetails>>;

    /// One order joined with its customer and items.
    async fn get_order(&self, id: RowId) -> Result<Option<OrderDetails>>;

    /// Delete an order and its items.
    ///
    /// Returns `false` if no order has this id.
    async fn delete_order(&self, id: RowId) -> Result<bool>;
}

/// An open unit of work against the normalized schema.
///
/// Writes are visible to later reads on the same transaction and to nobody
/// else until [`commit`](OrderTransaction::commit). Dropping the handle
/// without committing discards every write.
#[async_trait]
pub trait OrderTransaction: Send {
    async fn find_customer_by_email(&mut self, email: &str) -> Result<Option<Customer>>;

    async fn insert_customer(&mut self, customer: NewCustomer) -> Result<Customer>;

    async fn find_product_by_name(&mut self, name: &str) -> Result<Option<Product>>;

    async fn insert_product(&mut self, product: NewProduct) -> Result<Product>;

    async fn find_order_by_id(&mut self, id: RowId) -> Result<Option<Order>>;

    /// Insert an order, keeping `order.id` when it is set. Otherwise the id
    /// is one past every existing order id and every legacy order id.
    async fn insert_order(&mut self, order: NewOrder) -> Result<Order>;

    async fn insert_order_item(&mut self, item: NewOrderItem) -> Result<OrderItem>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}
