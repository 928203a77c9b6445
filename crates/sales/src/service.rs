//! Sale aggregate service: create, patch, delete.

use tracing::{info, instrument};

use gameshop_catalog::{EntityKind, EntityLookup};
use gameshop_core::{DomainError, EntityId, Money, SaleId, ServiceResult};

use crate::sale::{NewSale, SaleHeader, SalePatch, validate_lines};
use crate::store::SaleStore;

/// Owns the lifecycle of a sale: `Created -> (Patched)* -> Deleted`.
#[derive(Debug, Clone)]
pub struct SaleService<S, L> {
    store: S,
    lookup: L,
}

impl<S, L> SaleService<S, L>
where
    S: SaleStore,
    L: EntityLookup,
{
    pub fn new(store: S, lookup: L) -> Self {
        Self { store, lookup }
    }

    /// Create a sale and its lines in one write.
    ///
    /// Line shape is validated first, then every reference is resolved; the
    /// sale is persisted only if all of them exist. Unit prices are taken as
    /// given, never re-read from the catalog.
    #[instrument(skip_all, fields(buyer = %sale.buyer_id, lines = sale.lines.len()))]
    pub async fn create(&self, sale: NewSale) -> ServiceResult<SaleHeader> {
        validate_lines(&sale.lines)?;

        self.resolve(EntityKind::User, sale.buyer_id).await?;
        self.resolve(EntityKind::PaymentMethod, sale.payment_method_id).await?;
        self.resolve(EntityKind::ShippingMethod, sale.shipping_method_id).await?;
        self.resolve(EntityKind::SaleStatus, sale.status_id).await?;
        for line in &sale.lines {
            self.resolve(EntityKind::Product, line.product_id).await?;
        }

        let created = self.store.insert(&sale).await?;
        info!(id = %created.id, total = %created.total(), "sale created");
        Ok(created)
    }

    pub async fn get(&self, id: SaleId) -> ServiceResult<SaleHeader> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("sale {id}")).into())
    }

    pub async fn list(&self) -> ServiceResult<Vec<SaleHeader>> {
        Ok(self.store.list().await?)
    }

    /// Replace the supplied header fields, re-resolving foreign keys. Lines are
    /// left as they are.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn patch(&self, id: SaleId, patch: SalePatch) -> ServiceResult<SaleHeader> {
        let mut header = self.get(id).await?;

        if let Some(buyer) = patch.buyer_id {
            self.resolve(EntityKind::User, buyer).await?;
            header.buyer = buyer;
        }
        if let Some(method) = patch.payment_method_id {
            self.resolve(EntityKind::PaymentMethod, method).await?;
            header.payment_method = method;
        }
        if let Some(method) = patch.shipping_method_id {
            self.resolve(EntityKind::ShippingMethod, method).await?;
            header.shipping_method = method;
        }
        if let Some(status) = patch.status_id {
            self.resolve(EntityKind::SaleStatus, status).await?;
            header.status = status;
        }
        if let Some(date) = patch.date {
            header.purchase_date = date;
        }
        if let Some(time) = patch.time {
            header.purchase_time = time;
        }

        if !patch.is_empty() {
            self.store.update_header(&header).await?;
            info!("sale patched");
        }
        Ok(header)
    }

    /// Delete a sale and, with it, all of its lines.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn delete_by_id(&self, id: SaleId) -> ServiceResult<()> {
        if !self.store.delete(id).await? {
            return Err(DomainError::not_found(format!("sale {id}")).into());
        }
        info!("sale deleted");
        Ok(())
    }

    /// Derived total of a loaded sale.
    pub fn total(&self, header: &SaleHeader) -> Money {
        header.total()
    }

    async fn resolve(&self, kind: EntityKind, id: EntityId) -> ServiceResult<()> {
        self.lookup.get(kind, id).await.map(|_| ())
    }
}
