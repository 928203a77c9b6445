//! Many-to-many association (bridge) records between catalog entities.
//!
//! One generic [`AssociationManager`] serves every relation kind; the only
//! per-kind configuration is [`RelationKind`], which names the two entity
//! kinds to resolve.

pub mod manager;
pub mod record;
pub mod relation;
pub mod store;

pub use manager::AssociationManager;
pub use record::{AssociationPatch, AssociationRecord};
pub use relation::RelationKind;
pub use store::AssociationStore;
