use std::sync::Arc;

use async_trait::async_trait;

use gameshop_core::{SaleId, StoreError};

use crate::sale::{NewSale, SaleHeader};

/// Persistence boundary for the sale aggregate.
///
/// Header and lines are written and deleted together.
#[async_trait]
pub trait SaleStore: Send + Sync {
    async fn find(&self, id: SaleId) -> Result<Option<SaleHeader>, StoreError>;

    async fn list(&self) -> Result<Vec<SaleHeader>, StoreError>;

    /// Insert header and lines atomically, assigning ids.
    async fn insert(&self, sale: &NewSale) -> Result<SaleHeader, StoreError>;

    /// Overwrite the header fields. Lines are not touched.
    async fn update_header(&self, header: &SaleHeader) -> Result<(), StoreError>;

    /// Delete header and lines. Returns whether the sale existed.
    async fn delete(&self, id: SaleId) -> Result<bool, StoreError>;
}

#[async_trait]
impl<S> SaleStore for Arc<S>
where
    S: SaleStore + ?Sized,
{
    async fn find(&self, id: SaleId) -> Result<Option<SaleHeader>, StoreError> {
        (**self).find(id).await
    }

    async fn list(&self) -> Result<Vec<SaleHeader>, StoreError> {
        (**self).list().await
    }

    async fn insert(&self, sale: &NewSale) -> Result<SaleHeader, StoreError> {
        (**self).insert(sale).await
    }

    async fn update_header(&self, header: &SaleHeader) -> Result<(), StoreError> {
        (**self).update_header(header).await
    }

    async fn delete(&self, id: SaleId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }
}
