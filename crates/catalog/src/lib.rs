//! Catalog registry: products, their taxonomies and the reference data sales
//! point at (users, payment/shipping methods, sale statuses).
//!
//! The catalog is plain single-entity CRUD. What the rest of the workspace
//! needs from it is [`EntityLookup`]: the one place where "does this id exist"
//! is decided.

pub mod entity;
pub mod lookup;
pub mod service;
pub mod store;

pub use entity::{CatalogEntity, EntityKind, EntityPatch, NewEntity, normalize_name};
pub use lookup::EntityLookup;
pub use service::CatalogService;
pub use store::CatalogStore;
