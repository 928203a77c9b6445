//! Catalog registry service (create / read / update / delete).

use tracing::{info, instrument};

use gameshop_core::{DomainError, EntityId, Money, ServiceError, ServiceResult, StoreError};

use crate::entity::{CatalogEntity, EntityKind, EntityPatch, NewEntity, normalize_name};
use crate::store::CatalogStore;

/// Single-entity CRUD over the catalog.
///
/// Stateless apart from the store handle; every call is one read-validate-write
/// sequence.
#[derive(Debug, Clone)]
pub struct CatalogService<S> {
    store: S,
}

impl<S> CatalogService<S>
where
    S: CatalogStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(skip_all, fields(kind = %kind))]
    pub async fn create(
        &self,
        kind: EntityKind,
        name: &str,
        price: Option<Money>,
    ) -> ServiceResult<CatalogEntity> {
        let name = normalize_name(name)?;
        check_price(kind, price, true)?;
        self.ensure_name_free(kind, &name, None).await?;

        let created = self
            .store
            .insert(NewEntity { kind, name, price })
            .await
            .map_err(|e| duplicate_name_as_validation(kind, e))?;

        info!(id = %created.id, "catalog entity created");
        Ok(created)
    }

    pub async fn get(&self, kind: EntityKind, id: EntityId) -> ServiceResult<CatalogEntity> {
        self.store.get(kind, id).await
    }

    pub async fn list(&self, kind: EntityKind) -> ServiceResult<Vec<CatalogEntity>> {
        Ok(self.store.list(kind).await?)
    }

    #[instrument(skip_all, fields(kind = %kind, id = %id))]
    pub async fn update(
        &self,
        kind: EntityKind,
        id: EntityId,
        patch: EntityPatch,
    ) -> ServiceResult<CatalogEntity> {
        let mut entity = self.store.get(kind, id).await?;
        if patch.is_empty() {
            return Ok(entity);
        }
        check_price(kind, patch.price, false)?;

        if let Some(name) = patch.name.as_deref() {
            let name = normalize_name(name)?;
            self.ensure_name_free(kind, &name, Some(id)).await?;
            entity.name = name;
        }
        if let Some(active) = patch.active {
            entity.active = active;
        }
        if let Some(price) = patch.price {
            entity.price = Some(price);
        }

        self.store
            .update(&entity)
            .await
            .map_err(|e| duplicate_name_as_validation(kind, e))?;

        info!("catalog entity updated");
        Ok(entity)
    }

    /// Delete an entity. Association records naming it are cascaded by the
    /// store; sale references block the delete.
    #[instrument(skip_all, fields(kind = %kind, id = %id))]
    pub async fn delete(&self, kind: EntityKind, id: EntityId) -> ServiceResult<()> {
        self.store.get(kind, id).await?;

        let references = self.store.count_sale_references(kind, id).await?;
        if references > 0 {
            return Err(blocked_by_sales(kind, id, references).into());
        }

        match self.store.delete(kind, id).await {
            Ok(true) => {
                info!("catalog entity deleted");
                Ok(())
            }
            Ok(false) => Err(DomainError::not_found(format!("{kind} {id}")).into()),
            Err(StoreError::Restricted(_)) => Err(blocked_by_sales(kind, id, 1).into()),
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure_name_free(
        &self,
        kind: EntityKind,
        name: &str,
        except: Option<EntityId>,
    ) -> ServiceResult<()> {
        match self.store.find_by_name(kind, name).await? {
            Some(existing) if Some(existing.id) != except => Err(DomainError::validation(format!(
                "{kind} named '{name}' already exists"
            ))
            .into()),
            _ => Ok(()),
        }
    }
}

fn check_price(kind: EntityKind, price: Option<Money>, creating: bool) -> Result<(), DomainError> {
    match (kind.is_priced(), price) {
        (false, Some(_)) => Err(DomainError::validation(format!(
            "price is only valid for products, not {kind}"
        ))),
        (true, None) if creating => Err(DomainError::validation("products require a price")),
        _ => Ok(()),
    }
}

/// Payment and shipping methods still in use are a client-resolvable conflict;
/// anything else referenced by sales cannot be removed at all.
fn blocked_by_sales(kind: EntityKind, id: EntityId, references: u64) -> DomainError {
    let msg = format!("{kind} {id} is referenced by {references} sale record(s)");
    match kind {
        EntityKind::PaymentMethod | EntityKind::ShippingMethod => DomainError::conflict(msg),
        _ => DomainError::state(msg),
    }
}

fn duplicate_name_as_validation(kind: EntityKind, err: StoreError) -> ServiceError {
    match err {
        StoreError::UniqueViolation(_) => {
            DomainError::validation(format!("duplicate {kind} name")).into()
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_rules() {
        assert!(check_price(EntityKind::Product, Some(Money::new(100)), true).is_ok());
        assert!(check_price(EntityKind::Product, None, true).is_err());
        assert!(check_price(EntityKind::Product, None, false).is_ok());
        assert!(check_price(EntityKind::Genre, Some(Money::new(1)), false).is_err());
        assert!(check_price(EntityKind::Genre, None, true).is_ok());
    }

    #[test]
    fn sale_references_block_with_kind_specific_error() {
        let id = EntityId::new(3);
        assert!(matches!(
            blocked_by_sales(EntityKind::PaymentMethod, id, 2),
            DomainError::Conflict(_)
        ));
        assert!(matches!(
            blocked_by_sales(EntityKind::ShippingMethod, id, 1),
            DomainError::Conflict(_)
        ));
        assert!(matches!(blocked_by_sales(EntityKind::User, id, 1), DomainError::State(_)));
        assert!(matches!(blocked_by_sales(EntityKind::Product, id, 1), DomainError::State(_)));
    }
}
