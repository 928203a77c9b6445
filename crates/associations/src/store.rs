use std::sync::Arc;

use async_trait::async_trait;

use gameshop_core::{AssociationId, EntityId, StoreError};

use crate::record::AssociationRecord;
use crate::relation::RelationKind;

/// Persistence boundary for bridge records.
///
/// The store owns the authoritative `(relation, left, right)` unique
/// constraint: `insert` and `update` report `UniqueViolation` when it fires.
#[async_trait]
pub trait AssociationStore: Send + Sync {
    async fn find(
        &self,
        relation: RelationKind,
        id: AssociationId,
    ) -> Result<Option<AssociationRecord>, StoreError>;

    async fn find_pair(
        &self,
        relation: RelationKind,
        left: EntityId,
        right: EntityId,
    ) -> Result<Option<AssociationRecord>, StoreError>;

    async fn find_by_left(
        &self,
        relation: RelationKind,
        left: EntityId,
    ) -> Result<Vec<AssociationRecord>, StoreError>;

    async fn find_by_right(
        &self,
        relation: RelationKind,
        right: EntityId,
    ) -> Result<Vec<AssociationRecord>, StoreError>;

    async fn insert(
        &self,
        relation: RelationKind,
        left: EntityId,
        right: EntityId,
    ) -> Result<AssociationRecord, StoreError>;

    /// Persist new `left`/`right` values for an existing record.
    async fn update(&self, record: &AssociationRecord) -> Result<(), StoreError>;

    /// Returns whether a row was removed.
    async fn delete(&self, relation: RelationKind, id: AssociationId) -> Result<bool, StoreError>;
}

#[async_trait]
impl<S> AssociationStore for Arc<S>
where
    S: AssociationStore + ?Sized,
{
    async fn find(
        &self,
        relation: RelationKind,
        id: AssociationId,
    ) -> Result<Option<AssociationRecord>, StoreError> {
        (**self).find(relation, id).await
    }

    async fn find_pair(
        &self,
        relation: RelationKind,
        left: EntityId,
        right: EntityId,
    ) -> Result<Option<AssociationRecord>, StoreError> {
        (**self).find_pair(relation, left, right).await
    }

    async fn find_by_left(
        &self,
        relation: RelationKind,
        left: EntityId,
    ) -> Result<Vec<AssociationRecord>, StoreError> {
        (**self).find_by_left(relation, left).await
    }

    async fn find_by_right(
        &self,
        relation: RelationKind,
        right: EntityId,
    ) -> Result<Vec<AssociationRecord>, StoreError> {
        (**self).find_by_right(relation, right).await
    }

    async fn insert(
        &self,
        relation: RelationKind,
        left: EntityId,
        right: EntityId,
    ) -> Result<AssociationRecord, StoreError> {
        (**self).insert(relation, left, right).await
    }

    async fn update(&self, record: &AssociationRecord) -> Result<(), StoreError> {
        (**self).update(record).await
    }

    async fn delete(&self, relation: RelationKind, id: AssociationId) -> Result<bool, StoreError> {
        (**self).delete(relation, id).await
    }
}
