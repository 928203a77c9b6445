//! Store wiring: one backend serving every store trait.

use std::sync::Arc;

use tracing::info;

use gameshop_associations::AssociationStore;
use gameshop_catalog::{CatalogStore, EntityLookup};
use gameshop_core::StoreError;
use gameshop_sales::SaleStore;

use crate::config::StorageConfig;
use crate::memory::InMemoryDatabase;
use crate::postgres::PostgresDatabase;

/// Type-erased handles onto the configured backend.
#[derive(Clone)]
pub struct Stores {
    pub lookup: Arc<dyn EntityLookup>,
    pub catalog: Arc<dyn CatalogStore>,
    pub associations: Arc<dyn AssociationStore>,
    pub sales: Arc<dyn SaleStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        let db = Arc::new(InMemoryDatabase::new());
        Self {
            lookup: db.clone(),
            catalog: db.clone(),
            associations: db.clone(),
            sales: db,
        }
    }

    pub fn postgres(db: PostgresDatabase) -> Self {
        let db = Arc::new(db);
        Self {
            lookup: db.clone(),
            catalog: db.clone(),
            associations: db.clone(),
            sales: db,
        }
    }

    pub async fn open(config: &StorageConfig) -> Result<Self, StoreError> {
        match config {
            StorageConfig::InMemory => {
                info!("using in-memory stores");
                Ok(Self::in_memory())
            }
            StorageConfig::Postgres {
                url,
                max_connections,
            } => {
                info!(max_connections, "using postgres stores");
                let db = PostgresDatabase::connect(url, *max_connections).await?;
                Ok(Self::postgres(db))
            }
        }
    }
}
