use std::sync::Arc;

use async_trait::async_trait;

use gameshop_core::{DomainError, EntityId, ServiceResult, StoreError};

use crate::entity::{CatalogEntity, EntityKind};

/// Resolve a catalog id of a given kind.
///
/// Every component that dereferences a foreign id goes through here before
/// mutating anything. Pure read, no side effects.
#[async_trait]
pub trait EntityLookup: Send + Sync {
    /// Raw lookup: `Ok(None)` when the id does not exist for that kind.
    async fn find(&self, kind: EntityKind, id: EntityId) -> Result<Option<CatalogEntity>, StoreError>;

    /// Resolve or fail with `NotFound`.
    async fn get(&self, kind: EntityKind, id: EntityId) -> ServiceResult<CatalogEntity> {
        match self.find(kind, id).await? {
            Some(entity) => Ok(entity),
            None => Err(DomainError::not_found(format!("{kind} {id}")).into()),
        }
    }
}

#[async_trait]
impl<L> EntityLookup for Arc<L>
where
    L: EntityLookup + ?Sized,
{
    async fn find(&self, kind: EntityKind, id: EntityId) -> Result<Option<CatalogEntity>, StoreError> {
        (**self).find(kind, id).await
    }
}
