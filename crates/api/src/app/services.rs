//! Service wiring over type-erased stores.

use std::sync::Arc;

use gameshop_associations::{AssociationManager, AssociationStore, RelationKind};
use gameshop_catalog::{CatalogService, CatalogStore, EntityLookup};
use gameshop_infra::Stores;
use gameshop_sales::{SaleService, SaleStore};

pub type Catalog = CatalogService<Arc<dyn CatalogStore>>;
pub type Sales = SaleService<Arc<dyn SaleStore>, Arc<dyn EntityLookup>>;
pub type Associations = AssociationManager<Arc<dyn AssociationStore>, Arc<dyn EntityLookup>>;

/// Everything the handlers need, shared behind one `Arc`.
pub struct AppServices {
    pub catalog: Catalog,
    pub sales: Sales,
    association_store: Arc<dyn AssociationStore>,
    lookup: Arc<dyn EntityLookup>,
}

impl AppServices {
    pub fn new(stores: Stores) -> Self {
        Self {
            catalog: CatalogService::new(stores.catalog),
            sales: SaleService::new(stores.sales, stores.lookup.clone()),
            association_store: stores.associations,
            lookup: stores.lookup,
        }
    }

    /// Manager for one relation kind. Managers hold no state beyond the
    /// store handles, so one is built per request.
    pub fn associations(&self, relation: RelationKind) -> Associations {
        AssociationManager::new(relation, self.association_store.clone(), self.lookup.clone())
    }
}
