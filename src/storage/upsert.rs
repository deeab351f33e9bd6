//! Get-or-create by natural key.
//!
//! Customers are identified by email and products by name. Both follow the
//! same pattern: look the row up by its business key inside the open
//! transaction and insert it only when absent.

use async_trait::async_trait;

use super::{OrderTransaction, Result};
use crate::model::{Customer, NewCustomer, NewProduct, Product};

/// A row type with a unique business key.
#[async_trait]
pub trait NaturalKeyed: Sized + Send {
    /// Fields needed to insert a new row.
    type Draft: Send + Sync;

    /// Business key of a draft. Matching is exact, including case.
    fn natural_key(draft: &Self::Draft) -> &str;

    async fn find_by_key(tx: &mut dyn OrderTransaction, key: &str) -> Result<Option<Self>>;

    async fn insert(tx: &mut dyn OrderTransaction, draft: Self::Draft) -> Result<Self>;
}

/// Outcome of [`get_or_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted<E> {
    pub row: E,
    pub created: bool,
}

/// Return the row matching the draft's natural key, inserting it if absent.
pub async fn get_or_create<E: NaturalKeyed>(
    tx: &mut dyn OrderTransaction,
    draft: E::Draft,
) -> Result<Upserted<E>> {
    if let Some(row) = E::find_by_key(tx, E::natural_key(&draft)).await? {
        return Ok(Upserted {
            row,
            created: false,
        });
    }
    let row = E::insert(tx, draft).await?;
    Ok(Upserted { row, created: true })
}

#[async_trait]
impl NaturalKeyed for Customer {
    type Draft = NewCustomer;

    fn natural_key(draft: &NewCustomer) -> &str {
        &draft.email
    }

    async fn find_by_key(tx: &mut dyn OrderTransaction, key: &str) -> Result<Option<Self>> {
        tx.find_customer_by_email(key).await
    }

    async fn insert(tx: &mut dyn OrderTransaction, draft: NewCustomer) -> Result<Self> {
        tx.insert_customer(draft).await
    }
}

#[async_trait]
impl NaturalKeyed for Product {
    type Draft = NewProduct;

    fn natural_key(draft: &NewProduct) -> &str {
        &draft.name
    }

    async fn find_by_key(tx: &mut dyn OrderTransaction, key: &str) -> Result<Option<Self>> {
        tx.find_product_by_name(key).await
    }

    async fn insert(tx: &mut dyn OrderTransaction, draft: NewProduct) -> Result<Self> {
        tx.insert_product(draft).await
    }
}
