//! Generic link / unlink / patch over bridge records.

use tracing::{debug, info, instrument, warn};

use gameshop_catalog::EntityLookup;
use gameshop_core::{AssociationId, DomainError, EntityId, ServiceResult, StoreError};

use crate::record::{AssociationPatch, AssociationRecord};
use crate::relation::RelationKind;
use crate::store::AssociationStore;

/// Manages the bridge records of one relation kind.
///
/// Every foreign id is resolved through the [`EntityLookup`] before anything is
/// written. `link` and `unlink` are idempotent; `patch` either applies fully
/// or not at all.
#[derive(Debug, Clone)]
pub struct AssociationManager<S, L> {
    relation: RelationKind,
    store: S,
    lookup: L,
}

impl<S, L> AssociationManager<S, L>
where
    S: AssociationStore,
    L: EntityLookup,
{
    pub fn new(relation: RelationKind, store: S, lookup: L) -> Self {
        Self {
            relation,
            store,
            lookup,
        }
    }

    pub async fn find_by_left(&self, left: EntityId) -> ServiceResult<Vec<AssociationRecord>> {
        Ok(self.store.find_by_left(self.relation, left).await?)
    }

    pub async fn find_by_right(&self, right: EntityId) -> ServiceResult<Vec<AssociationRecord>> {
        Ok(self.store.find_by_right(self.relation, right).await?)
    }

    pub async fn get(&self, id: AssociationId) -> ServiceResult<AssociationRecord> {
        self.store
            .find(self.relation, id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("{} relation {id}", self.relation)).into())
    }

    /// Link `left` to `right`, returning the existing record if the pair is
    /// already linked.
    #[instrument(skip_all, fields(relation = %self.relation, left = %left, right = %right))]
    pub async fn link(&self, left: EntityId, right: EntityId) -> ServiceResult<AssociationRecord> {
        self.resolve_pair(left, right).await?;

        if let Some(existing) = self.store.find_pair(self.relation, left, right).await? {
            debug!(id = %existing.id, "pair already linked");
            return Ok(existing);
        }

        match self.store.insert(self.relation, left, right).await {
            Ok(record) => {
                info!(id = %record.id, "linked");
                Ok(record)
            }
            // Lost a race with a concurrent link: the constraint kept the pair
            // unique, so hand back the winner.
            Err(StoreError::UniqueViolation(_)) => {
                warn!("unique constraint fired on link; returning existing record");
                self.store
                    .find_pair(self.relation, left, right)
                    .await?
                    .ok_or_else(|| {
                        StoreError::Corrupt(format!(
                            "{} ({left}, {right}) rejected as duplicate but not found",
                            self.relation
                        ))
                        .into()
                    })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the `(left, right)` link. Absent pairs are a no-op.
    #[instrument(skip_all, fields(relation = %self.relation, left = %left, right = %right))]
    pub async fn unlink(&self, left: EntityId, right: EntityId) -> ServiceResult<()> {
        self.resolve_pair(left, right).await?;

        match self.store.find_pair(self.relation, left, right).await? {
            Some(existing) => {
                self.store.delete(self.relation, existing.id).await?;
                info!(id = %existing.id, "unlinked");
            }
            None => debug!("pair not linked; nothing to do"),
        }
        Ok(())
    }

    /// Re-point one or both sides of a record.
    ///
    /// The left side is applied and checked first, so the right-side check
    /// sees the new left value. A duplicate pair at either step aborts the
    /// whole patch with `Conflict`.
    #[instrument(skip_all, fields(relation = %self.relation, id = %id))]
    pub async fn patch(
        &self,
        id: AssociationId,
        patch: AssociationPatch,
    ) -> ServiceResult<AssociationRecord> {
        let original = self.get(id).await?;
        let mut candidate = original.clone();

        if let Some(new_left) = patch.new_left_id {
            self.lookup.get(self.relation.left(), new_left).await?;
            candidate.left = new_left;
            self.ensure_pair_free(&candidate).await?;
        }

        if let Some(new_right) = patch.new_right_id {
            self.lookup.get(self.relation.right(), new_right).await?;
            candidate.right = new_right;
            self.ensure_pair_free(&candidate).await?;
        }

        if candidate == original {
            debug!("patch changes nothing");
            return Ok(original);
        }

        match self.store.update(&candidate).await {
            Ok(()) => {
                info!(left = %candidate.left, right = %candidate.right, "relation re-pointed");
                Ok(candidate)
            }
            Err(StoreError::UniqueViolation(_)) => Err(self.duplicate(&candidate).into()),
            Err(e) => Err(e.into()),
        }
    }

    async fn resolve_pair(&self, left: EntityId, right: EntityId) -> ServiceResult<()> {
        self.lookup.get(self.relation.left(), left).await?;
        self.lookup.get(self.relation.right(), right).await?;
        Ok(())
    }

    async fn ensure_pair_free(&self, candidate: &AssociationRecord) -> ServiceResult<()> {
        match self
            .store
            .find_pair(self.relation, candidate.left, candidate.right)
            .await?
        {
            Some(other) if other.id != candidate.id => Err(self.duplicate(candidate).into()),
            _ => Ok(()),
        }
    }

    fn duplicate(&self, candidate: &AssociationRecord) -> DomainError {
        DomainError::conflict(format!(
            "{} ({}, {}) already exists",
            self.relation, candidate.left, candidate.right
        ))
    }
}
