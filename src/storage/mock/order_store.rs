//! Mock OrderStore implementation for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Failures, MockOrderStore, Tables};
use crate::model::{
    Customer, NewCustomer, NewOrder, NewOrderItem, NewProduct, Order, OrderDetails, OrderItem,
    OrderItemDetails, Product, RowId,
};
use crate::storage::{OrderStore, OrderTransaction, Result, StorageError};

#[async_trait]
impl OrderStore for MockOrderStore {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>> {
        let failures = *self.failures.read().await;
        if failures.fail_on_begin {
            return Err(StorageError::Injected("begin".to_string()));
        }
        let working = self.tables.read().await.clone();
        let max_legacy_id = self
            .legacy
            .read()
            .await
            .iter()
            .map(|r| r.order_id)
            .max()
            .unwrap_or(0);
        Ok(Box::new(MockOrderTransaction {
            tables: Arc::clone(&self.tables),
            working,
            failures,
            max_legacy_id,
            orders_inserted: 0,
        }))
    }

    async fn list_orders(&self, customer_email: Option<&str>) -> Result<Vec<OrderDetails>> {
        let tables = self.tables.read().await;

        let mut orders: Vec<&Order> = tables.orders.values().collect();
        // Newest first; ties keep id order.
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date).then(a.id.cmp(&b.id)));

        let mut details = Vec::with_capacity(orders.len());
        for order in orders {
            let row = order_details(&tables, order)?;
            if customer_email.is_some_and(|email| email != row.customer_email) {
                continue;
            }
            details.push(row);
        }

        Ok(details)
    }

    async fn get_order(&self, id: RowId) -> Result<Option<OrderDetails>> {
        let tables = self.tables.read().await;
        let Some(order) = tables.orders.get(&id) else {
            return Ok(None);
        };
        Ok(Some(order_details(&tables, order)?))
    }

    async fn delete_order(&self, id: RowId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.orders.remove(&id).is_none() {
            return Ok(false);
        }
        tables.items.retain(|_, item| item.order_id != id);
        Ok(true)
    }
}

/// Join one order with its customer and items.
fn order_details(tables: &Tables, order: &Order) -> Result<OrderDetails> {
    let customer = tables
        .customers
        .get(&order.customer_id)
        .ok_or_else(|| StorageError::not_found("customer", order.customer_id))?;

    let mut items = Vec::new();
    for item in tables.items.values().filter(|i| i.order_id == order.id) {
        let product = tables
            .products
            .get(&item.product_id)
            .ok_or_else(|| StorageError::not_found("product", item.product_id))?;
        items.push(OrderItemDetails {
            product_name: product.name.clone(),
            quantity: item.quantity,
        });
    }

    Ok(OrderDetails {
        order_id: order.id,
        customer_name: customer.name.clone(),
        customer_email: customer.email.clone(),
        order_date: order.order_date,
        items,
    })
}

/// Transaction over a private copy of the mock tables.
pub struct MockOrderTransaction {
    tables: Arc<RwLock<Tables>>,
    working: Tables,
    failures: Failures,
    max_legacy_id: RowId,
    orders_inserted: usize,
}

#[async_trait]
impl OrderTransaction for MockOrderTransaction {
    async fn find_customer_by_email(&mut self, email: &str) -> Result<Option<Customer>> {
        Ok(self
            .working
            .customers
            .values()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn insert_customer(&mut self, customer: NewCustomer) -> Result<Customer> {
        if self.working.customers.values().any(|c| c.email == customer.email) {
            return Err(StorageError::Conflict {
                entity: "customer",
                key: customer.email,
            });
        }
        self.working.last_customer_id += 1;
        let row = Customer {
            id: self.working.last_customer_id,
            name: customer.name,
            email: customer.email,
        };
        self.working.customers.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_product_by_name(&mut self, name: &str) -> Result<Option<Product>> {
        Ok(self
            .working
            .products
            .values()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn insert_product(&mut self, product: NewProduct) -> Result<Product> {
        if self.working.products.values().any(|p| p.name == product.name) {
            return Err(StorageError::Conflict {
                entity: "product",
                key: product.name,
            });
        }
        self.working.last_product_id += 1;
        let row = Product {
            id: self.working.last_product_id,
            name: product.name,
        };
        self.working.products.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_order_by_id(&mut self, id: RowId) -> Result<Option<Order>> {
        Ok(self.working.orders.get(&id).cloned())
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order> {
        if let Some(budget) = self.failures.order_insert_budget {
            if self.orders_inserted >= budget {
                return Err(StorageError::Injected(format!(
                    "order insert after {budget} orders"
                )));
            }
        }
        if !self.working.customers.contains_key(&order.customer_id) {
            return Err(StorageError::not_found("customer", order.customer_id));
        }

        // Generated ids start past both existing orders and legacy order ids.
        let id = match order.id {
            Some(id) => id,
            None => {
                let max_order = self.working.orders.keys().next_back().copied().unwrap_or(0);
                max_order.max(self.max_legacy_id) + 1
            }
        };
        if self.working.orders.contains_key(&id) {
            return Err(StorageError::Conflict {
                entity: "order",
                key: id.to_string(),
            });
        }

        let row = Order {
            id,
            customer_id: order.customer_id,
            order_date: order.order_date,
        };
        self.working.orders.insert(id, row.clone());
        self.orders_inserted += 1;
        Ok(row)
    }

    async fn insert_order_item(&mut self, item: NewOrderItem) -> Result<OrderItem> {
        if !self.working.orders.contains_key(&item.order_id) {
            return Err(StorageError::not_found("order", item.order_id));
        }
        if !self.working.products.contains_key(&item.product_id) {
            return Err(StorageError::not_found("product", item.product_id));
        }
        self.working.last_item_id += 1;
        let row = OrderItem {
            id: self.working.last_item_id,
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
        };
        self.working.items.insert(row.id, row.clone());
        Ok(row)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        if self.failures.fail_on_commit {
            return Err(StorageError::Injected("commit".to_string()));
        }
        let this = *self;
        *this.tables.write().await = this.working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
