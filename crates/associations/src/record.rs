use serde::{Deserialize, Serialize};

use gameshop_core::{AssociationId, Entity, EntityId};

use crate::relation::RelationKind;

/// A bridge record linking `left` to `right` for one relation kind.
///
/// It has its own identity; the `(left, right)` pair is unique per relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationRecord {
    pub id: AssociationId,
    pub relation: RelationKind,
    pub left: EntityId,
    pub right: EntityId,
}

impl AssociationRecord {
    pub fn pair(&self) -> (EntityId, EntityId) {
        (self.left, self.right)
    }
}

impl Entity for AssociationRecord {
    type Id = AssociationId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Re-point one or both sides of an existing record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AssociationPatch {
    pub new_left_id: Option<EntityId>,
    pub new_right_id: Option<EntityId>,
}
