use std::sync::Arc;

use async_trait::async_trait;

use gameshop_core::{EntityId, StoreError};

use crate::entity::{CatalogEntity, EntityKind, NewEntity};
use crate::lookup::EntityLookup;

/// Persistence boundary for catalog entities.
///
/// Implementations enforce name uniqueness per kind (case-insensitive) and
/// cascade association records when an entity is deleted.
#[async_trait]
pub trait CatalogStore: EntityLookup {
    /// Insert and assign an id. `UniqueViolation` on a duplicate name.
    async fn insert(&self, entity: NewEntity) -> Result<CatalogEntity, StoreError>;

    /// Overwrite name/active/price of an existing entity.
    async fn update(&self, entity: &CatalogEntity) -> Result<(), StoreError>;

    async fn list(&self, kind: EntityKind) -> Result<Vec<CatalogEntity>, StoreError>;

    async fn find_by_name(&self, kind: EntityKind, name: &str) -> Result<Option<CatalogEntity>, StoreError>;

    /// Number of sale headers or lines that point at this entity.
    async fn count_sale_references(&self, kind: EntityKind, id: EntityId) -> Result<u64, StoreError>;

    /// Delete the entity and its association records. Returns whether a row
    /// was removed; `Restricted` if sales still reference it.
    async fn delete(&self, kind: EntityKind, id: EntityId) -> Result<bool, StoreError>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn insert(&self, entity: NewEntity) -> Result<CatalogEntity, StoreError> {
        (**self).insert(entity).await
    }

    async fn update(&self, entity: &CatalogEntity) -> Result<(), StoreError> {
        (**self).update(entity).await
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<CatalogEntity>, StoreError> {
        (**self).list(kind).await
    }

    async fn find_by_name(&self, kind: EntityKind, name: &str) -> Result<Option<CatalogEntity>, StoreError> {
        (**self).find_by_name(kind, name).await
    }

    async fn count_sale_references(&self, kind: EntityKind, id: EntityId) -> Result<u64, StoreError> {
        (**self).count_sale_references(kind, id).await
    }

    async fn delete(&self, kind: EntityKind, id: EntityId) -> Result<bool, StoreError> {
        (**self).delete(kind, id).await
    }
}
