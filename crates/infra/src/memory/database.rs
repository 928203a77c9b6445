//! Single-process database holding catalog, association and sale tables
//! behind one lock, so cascades and uniqueness checks are atomic.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use gameshop_associations::{AssociationRecord, AssociationStore, RelationKind};
use gameshop_catalog::{CatalogEntity, CatalogStore, EntityKind, EntityLookup, NewEntity};
use gameshop_core::{AssociationId, EntityId, SaleId, SaleLineId, StoreError};
use gameshop_sales::{NewSale, SaleHeader, SaleLine, SaleStore};

use super::table::Table;

#[derive(Debug, Default)]
struct Tables {
    entities: HashMap<EntityKind, Table<CatalogEntity>>,
    associations: Table<AssociationRecord>,
    sales: Table<SaleHeader>,
    last_line_id: i64,
}

impl Tables {
    fn entity(&self, kind: EntityKind, id: EntityId) -> Option<&CatalogEntity> {
        self.entities.get(&kind).and_then(|t| t.get(id.get()))
    }

    /// Referenced entities must exist when a row pointing at them is written.
    fn require_entity(&self, kind: EntityKind, id: EntityId) -> Result<(), StoreError> {
        match self.entity(kind, id) {
            Some(_) => Ok(()),
            None => Err(StoreError::MissingReference(format!("{kind} {id}"))),
        }
    }

    fn require_sale_references(&self, header: &SaleRefs) -> Result<(), StoreError> {
        self.require_entity(EntityKind::User, header.buyer)?;
        self.require_entity(EntityKind::PaymentMethod, header.payment_method)?;
        self.require_entity(EntityKind::ShippingMethod, header.shipping_method)?;
        self.require_entity(EntityKind::SaleStatus, header.status)
    }

    fn find_by_name(&self, kind: EntityKind, name: &str) -> Option<&CatalogEntity> {
        let needle = name.to_lowercase();
        self.entities
            .get(&kind)
            .and_then(|t| t.values().find(|e| e.name.to_lowercase() == needle))
    }

    fn find_pair(&self, relation: RelationKind, left: EntityId, right: EntityId) -> Option<&AssociationRecord> {
        self.associations
            .values()
            .find(|r| r.relation == relation && r.left == left && r.right == right)
    }

    fn sale_references(&self, kind: EntityKind, id: EntityId) -> u64 {
        let count = self.sales.values().map(|sale| match kind {
            EntityKind::User => usize::from(sale.buyer == id),
            EntityKind::PaymentMethod => usize::from(sale.payment_method == id),
            EntityKind::ShippingMethod => usize::from(sale.shipping_method == id),
            EntityKind::SaleStatus => usize::from(sale.status == id),
            EntityKind::Product => sale.lines.iter().filter(|l| l.product == id).count(),
            _ => 0,
        });
        count.sum::<usize>() as u64
    }
}

/// Header references of a sale, checked before insert and update.
struct SaleRefs {
    buyer: EntityId,
    payment_method: EntityId,
    shipping_method: EntityId,
    status: EntityId,
}

/// In-memory implementation of every store trait.
///
/// Intended for tests/dev. Mirrors the relational schema: unique names per
/// kind, unique pairs per relation, references that must exist on write,
/// cascading bridge records, and sales restricting deletes of what they
/// reference.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    inner: RwLock<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait]
impl EntityLookup for InMemoryDatabase {
    async fn find(&self, kind: EntityKind, id: EntityId) -> Result<Option<CatalogEntity>, StoreError> {
        Ok(self.read()?.entity(kind, id).cloned())
    }
}

#[async_trait]
impl CatalogStore for InMemoryDatabase {
    async fn insert(&self, entity: NewEntity) -> Result<CatalogEntity, StoreError> {
        let mut tables = self.write()?;
        if tables.find_by_name(entity.kind, &entity.name).is_some() {
            return Err(StoreError::UniqueViolation(format!(
                "{} name '{}'",
                entity.kind, entity.name
            )));
        }

        let table = tables.entities.entry(entity.kind).or_default();
        let id = table.next_id();
        let created = CatalogEntity {
            id: EntityId::new(id),
            kind: entity.kind,
            name: entity.name,
            active: true,
            price: entity.price,
        };
        table.put(created.clone());
        Ok(created)
    }

    async fn update(&self, entity: &CatalogEntity) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if let Some(other) = tables.find_by_name(entity.kind, &entity.name) {
            if other.id != entity.id {
                return Err(StoreError::UniqueViolation(format!(
                    "{} name '{}'",
                    entity.kind, entity.name
                )));
            }
        }

        if let Some(row) = tables
            .entities
            .get_mut(&entity.kind)
            .and_then(|t| t.get_mut(entity.id.get()))
        {
            *row = entity.clone();
        }
        Ok(())
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<CatalogEntity>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .entities
            .get(&kind)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_by_name(&self, kind: EntityKind, name: &str) -> Result<Option<CatalogEntity>, StoreError> {
        Ok(self.read()?.find_by_name(kind, name).cloned())
    }

    async fn count_sale_references(&self, kind: EntityKind, id: EntityId) -> Result<u64, StoreError> {
        Ok(self.read()?.sale_references(kind, id))
    }

    async fn delete(&self, kind: EntityKind, id: EntityId) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        if tables.sale_references(kind, id) > 0 {
            return Err(StoreError::Restricted(format!("{kind} {id} is referenced by sales")));
        }

        let removed = tables
            .entities
            .get_mut(&kind)
            .and_then(|t| t.remove(id.get()))
            .is_some();
        if removed {
            tables.associations.retain(|r| {
                !((r.relation.left() == kind && r.left == id)
                    || (r.relation.right() == kind && r.right == id))
            });
        }
        Ok(removed)
    }
}

#[async_trait]
impl AssociationStore for InMemoryDatabase {
    async fn find(
        &self,
        relation: RelationKind,
        id: AssociationId,
    ) -> Result<Option<AssociationRecord>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .associations
            .get(id.get())
            .filter(|r| r.relation == relation)
            .cloned())
    }

    async fn find_pair(
        &self,
        relation: RelationKind,
        left: EntityId,
        right: EntityId,
    ) -> Result<Option<AssociationRecord>, StoreError> {
        Ok(self.read()?.find_pair(relation, left, right).cloned())
    }

    async fn find_by_left(
        &self,
        relation: RelationKind,
        left: EntityId,
    ) -> Result<Vec<AssociationRecord>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .associations
            .values()
            .filter(|r| r.relation == relation && r.left == left)
            .cloned()
            .collect())
    }

    async fn find_by_right(
        &self,
        relation: RelationKind,
        right: EntityId,
    ) -> Result<Vec<AssociationRecord>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .associations
            .values()
            .filter(|r| r.relation == relation && r.right == right)
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        relation: RelationKind,
        left: EntityId,
        right: EntityId,
    ) -> Result<AssociationRecord, StoreError> {
        let mut tables = self.write()?;
        tables.require_entity(relation.left(), left)?;
        tables.require_entity(relation.right(), right)?;
        if tables.find_pair(relation, left, right).is_some() {
            return Err(StoreError::UniqueViolation(format!("{relation} ({left}, {right})")));
        }

        let id = tables.associations.next_id();
        let record = AssociationRecord {
            id: AssociationId::new(id),
            relation,
            left,
            right,
        };
        tables.associations.put(record.clone());
        Ok(record)
    }

    async fn update(&self, record: &AssociationRecord) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.require_entity(record.relation.left(), record.left)?;
        tables.require_entity(record.relation.right(), record.right)?;
        if let Some(other) = tables.find_pair(record.relation, record.left, record.right) {
            if other.id != record.id {
                return Err(StoreError::UniqueViolation(format!(
                    "{} ({}, {})",
                    record.relation, record.left, record.right
                )));
            }
        }

        if let Some(row) = tables
            .associations
            .get_mut(record.id.get())
            .filter(|r| r.relation == record.relation)
        {
            row.left = record.left;
            row.right = record.right;
        }
        Ok(())
    }

    async fn delete(&self, relation: RelationKind, id: AssociationId) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        let matches = tables
            .associations
            .get(id.get())
            .is_some_and(|r| r.relation == relation);
        if matches {
            tables.associations.remove(id.get());
        }
        Ok(matches)
    }
}

#[async_trait]
impl SaleStore for InMemoryDatabase {
    async fn find(&self, id: SaleId) -> Result<Option<SaleHeader>, StoreError> {
        Ok(self.read()?.sales.get(id.get()).cloned())
    }

    async fn list(&self) -> Result<Vec<SaleHeader>, StoreError> {
        Ok(self.read()?.sales.values().cloned().collect())
    }

    async fn insert(&self, sale: &NewSale) -> Result<SaleHeader, StoreError> {
        let mut tables = self.write()?;
        tables.require_sale_references(&SaleRefs {
            buyer: sale.buyer_id,
            payment_method: sale.payment_method_id,
            shipping_method: sale.shipping_method_id,
            status: sale.status_id,
        })?;
        for line in &sale.lines {
            tables.require_entity(EntityKind::Product, line.product_id)?;
        }

        let id = SaleId::new(tables.sales.next_id());

        let mut lines = Vec::with_capacity(sale.lines.len());
        for line in &sale.lines {
            tables.last_line_id += 1;
            lines.push(SaleLine {
                id: SaleLineId::new(tables.last_line_id),
                sale: id,
                product: line.product_id,
                quantity: line.quantity,
                unit_price_at_sale: line.unit_price,
            });
        }

        let header = SaleHeader {
            id,
            purchase_date: sale.date,
            purchase_time: sale.time,
            buyer: sale.buyer_id,
            payment_method: sale.payment_method_id,
            shipping_method: sale.shipping_method_id,
            status: sale.status_id,
            lines,
        };
        tables.sales.put(header.clone());
        Ok(header)
    }

    async fn update_header(&self, header: &SaleHeader) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.require_sale_references(&SaleRefs {
            buyer: header.buyer,
            payment_method: header.payment_method,
            shipping_method: header.shipping_method,
            status: header.status,
        })?;
        if let Some(row) = tables.sales.get_mut(header.id.get()) {
            row.purchase_date = header.purchase_date;
            row.purchase_time = header.purchase_time;
            row.buyer = header.buyer;
            row.payment_method = header.payment_method;
            row.shipping_method = header.shipping_method;
            row.status = header.status;
        }
        Ok(())
    }

    async fn delete(&self, id: SaleId) -> Result<bool, StoreError> {
        Ok(self.write()?.sales.remove(id.get()).is_some())
    }
}
