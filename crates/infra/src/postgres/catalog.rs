use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use tracing::instrument;

use gameshop_catalog::{CatalogEntity, CatalogStore, EntityKind, EntityLookup, NewEntity};
use gameshop_core::{EntityId, StoreError};

use super::PostgresDatabase;
use super::error::{map_sqlx_error, money_from_db, money_to_db};

fn entity_from_row(row: &PgRow) -> Result<CatalogEntity, StoreError> {
    let decode = |e: sqlx::Error| map_sqlx_error("decode catalog entity", e);
    let kind: String = row.try_get("kind").map_err(decode)?;
    let kind = kind
        .parse::<EntityKind>()
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    let price: Option<i64> = row.try_get("price").map_err(decode)?;

    Ok(CatalogEntity {
        id: EntityId::new(row.try_get("id").map_err(decode)?),
        kind,
        name: row.try_get("name").map_err(decode)?,
        active: row.try_get("active").map_err(decode)?,
        price: price.map(money_from_db).transpose()?,
    })
}

#[async_trait]
impl EntityLookup for PostgresDatabase {
    #[instrument(skip(self), err)]
    async fn find(&self, kind: EntityKind, id: EntityId) -> Result<Option<CatalogEntity>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, kind, name, active, price
            FROM catalog_entities
            WHERE kind = $1 AND id = $2
            "#,
        )
        .bind(kind.as_str())
        .bind(id.get())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("find_entity", e))?;

        row.as_ref().map(entity_from_row).transpose()
    }
}

#[async_trait]
impl CatalogStore for PostgresDatabase {
    #[instrument(skip(self), err)]
    async fn insert(&self, entity: NewEntity) -> Result<CatalogEntity, StoreError> {
        let price = entity.price.map(money_to_db).transpose()?;
        let row = sqlx::query(
            r#"
            INSERT INTO catalog_entities (kind, name, active, price)
            VALUES ($1, $2, TRUE, $3)
            RETURNING id, kind, name, active, price
            "#,
        )
        .bind(entity.kind.as_str())
        .bind(&entity.name)
        .bind(price)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_sqlx_error("insert_entity", e))?;

        entity_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn update(&self, entity: &CatalogEntity) -> Result<(), StoreError> {
        let price = entity.price.map(money_to_db).transpose()?;
        sqlx::query(
            r#"
            UPDATE catalog_entities
            SET name = $1, active = $2, price = $3
            WHERE kind = $4 AND id = $5
            "#,
        )
        .bind(&entity.name)
        .bind(entity.active)
        .bind(price)
        .bind(entity.kind.as_str())
        .bind(entity.id.get())
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("update_entity", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list(&self, kind: EntityKind) -> Result<Vec<CatalogEntity>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, kind, name, active, price
            FROM catalog_entities
            WHERE kind = $1
            ORDER BY id ASC
            "#,
        )
        .bind(kind.as_str())
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_entities", e))?;

        rows.iter().map(entity_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn find_by_name(&self, kind: EntityKind, name: &str) -> Result<Option<CatalogEntity>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, kind, name, active, price
            FROM catalog_entities
            WHERE kind = $1 AND lower(name) = lower($2)
            "#,
        )
        .bind(kind.as_str())
        .bind(name)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("find_entity_by_name", e))?;

        row.as_ref().map(entity_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn count_sale_references(&self, kind: EntityKind, id: EntityId) -> Result<u64, StoreError> {
        let sql = match kind {
            EntityKind::User => "SELECT COUNT(*) FROM sales WHERE buyer_id = $1",
            EntityKind::PaymentMethod => "SELECT COUNT(*) FROM sales WHERE payment_method_id = $1",
            EntityKind::ShippingMethod => "SELECT COUNT(*) FROM sales WHERE shipping_method_id = $1",
            EntityKind::SaleStatus => "SELECT COUNT(*) FROM sales WHERE status_id = $1",
            EntityKind::Product => "SELECT COUNT(*) FROM sale_lines WHERE product_id = $1",
            _ => return Ok(0),
        };

        let count: i64 = sqlx::query_scalar(sql)
            .bind(id.get())
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_sqlx_error("count_sale_references", e))?;
        Ok(count.max(0) as u64)
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, kind: EntityKind, id: EntityId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM catalog_entities WHERE kind = $1 AND id = $2")
            .bind(kind.as_str())
            .bind(id.get())
            .execute(self.pool())
            .await
            .map_err(|e| map_sqlx_error("delete_entity", e))?;
        Ok(result.rows_affected() > 0)
    }
}
